//! Ungrouped grid placement.

use std::collections::HashSet;

use solarpack_core::{
    AlignmentPolicy, Config, Footprint, GeoPoint, PlacementResult, PlacementUnit, Result,
    TableLayout, Topology,
};

use super::{run_reason, PlacementContext, PlacementStrategy, RunMode};
use crate::containment::{ContainmentEvaluator, ContainmentRule};
use crate::lattice::{self, rect_corners, Lattice};

/// Individually placed units, expanded from the origin in square rings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UngroupedStrategy {
    /// Gap between adjacent units in a row, metres.
    pub adjacent_gap: f64,
    /// Spacing between rows, metres.
    pub row_spacing: f64,
    /// Use the free-form containment rule.
    pub free_form: bool,
}

impl UngroupedStrategy {
    fn topology(&self) -> Topology {
        Topology::Ungrouped {
            adjacent_gap: self.adjacent_gap,
            row_spacing: self.row_spacing,
            free_form: self.free_form,
        }
    }

    /// `(row_pitch, col_pitch)` under `alignment`. Justify tightens both
    /// pitches but never below the footprint itself.
    pub fn pitches(
        &self,
        footprint: &Footprint,
        alignment: AlignmentPolicy,
        config: &Config,
    ) -> (f64, f64) {
        let row = footprint.height + self.row_spacing;
        let col = footprint.width + self.adjacent_gap;
        if alignment == AlignmentPolicy::Justify {
            let f = config.justify_pitch_factor;
            ((row * f).max(footprint.height), (col * f).max(footprint.width))
        } else {
            (row, col)
        }
    }
}

impl PlacementStrategy for UngroupedStrategy {
    fn name(&self) -> &'static str {
        "ungrouped"
    }

    fn max_pitch(&self, footprint: &Footprint) -> f64 {
        (footprint.height + self.row_spacing).max(footprint.width + self.adjacent_gap)
    }

    fn run(
        &self,
        ctx: &PlacementContext<'_>,
        origin: GeoPoint,
        alignment: AlignmentPolicy,
        budget: usize,
        mode: RunMode,
    ) -> Result<PlacementResult> {
        let site = ctx.site;
        let footprint = ctx.footprint;
        let azimuth = site.azimuth();
        let (row_pitch, col_pitch) = self.pitches(&footprint, alignment, ctx.config);
        let lattice = Lattice::new(origin, azimuth, row_pitch, col_pitch);
        let evaluator = ContainmentEvaluator::new(
            ctx.geodesic,
            site.ring(),
            ContainmentRule::select(&self.topology(), alignment),
        );

        let origin_local = site.to_local(origin);
        let margin = footprint.half_diagonal();
        let mut max_ring = lattice.ring_bound(site.diagonal());
        if alignment == AlignmentPolicy::Justify {
            max_ring += ctx.config.justify_extra_rings;
        }

        let mut visited = HashSet::new();
        let mut indices = Vec::new();
        let mut units = Vec::new();
        let mut budget_hit = budget == 0;

        'rings: for k in 0..=max_ring {
            if budget_hit {
                break;
            }
            ctx.check_cancelled()?;
            for index in lattice::ring(k) {
                if !visited.insert(index) {
                    continue;
                }
                let planar = lattice.planar(&origin_local, index);
                if !site.may_contain(&planar, margin) {
                    continue;
                }
                let center = lattice.center(ctx.geodesic, index)?;
                let corners =
                    rect_corners(ctx.geodesic, center, azimuth, footprint.width, footprint.height)?;
                if !evaluator.accepts(center, &corners)? {
                    continue;
                }

                indices.push(index);
                if mode == RunMode::Materialize {
                    units.push(PlacementUnit::new(site.id().clone(), index, center, corners));
                }
                if indices.len() >= budget {
                    budget_hit = true;
                    break 'rings;
                }
            }
        }

        log::debug!(
            "ungrouped '{}' {:?}: {} units, pitch {:.3} x {:.3}",
            site.id(),
            alignment,
            indices.len(),
            row_pitch,
            col_pitch
        );

        let mut result = PlacementResult::new(site.id().clone(), alignment)
            .with_min_spacing(lattice.min_pitch());
        result.unit_count = indices.len();
        result.table_layout = TableLayout::from_indices(indices.iter().copied());
        result.units = units;
        result.reason = run_reason(indices.len(), budget_hit);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::Site;
    use approx::assert_relative_eq;
    use solarpack_core::{Boundary, ReasonCode, SphericalGeodesic};

    fn center() -> GeoPoint {
        GeoPoint::new(-33.87, 151.21)
    }

    fn strategy() -> UngroupedStrategy {
        UngroupedStrategy {
            adjacent_gap: 0.0,
            row_spacing: 0.0,
            free_form: false,
        }
    }

    #[test]
    fn test_pitches() {
        let s = UngroupedStrategy {
            adjacent_gap: 0.5,
            row_spacing: 1.0,
            free_form: false,
        };
        let fp = Footprint::new(2.0, 1.0);
        let config = Config::default();
        let (row, col) = s.pitches(&fp, AlignmentPolicy::Center, &config);
        assert_relative_eq!(row, 2.0);
        assert_relative_eq!(col, 2.5);
        let (row, col) = s.pitches(&fp, AlignmentPolicy::Justify, &config);
        assert_relative_eq!(row, 1.8);
        assert_relative_eq!(col, 2.25);
        // Zero gap: Justify cannot shrink below the footprint.
        let (row, col) = strategy().pitches(&fp, AlignmentPolicy::Justify, &config);
        assert_relative_eq!(row, 1.0);
        assert_relative_eq!(col, 2.0);
        assert_relative_eq!(s.max_pitch(&fp), 2.5);
    }

    #[test]
    fn test_small_square_fills_grid() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let site = Site::prepare(&Boundary::rectangle("sq", center(), 10.0, 10.0, 180.0)).unwrap();
        let ctx = PlacementContext::new(&g, &config, &site, Footprint::new(2.0, 2.0));

        // Origin at the center: units at -4, -2, 0, 2, 4 on each axis.
        let result = strategy()
            .run(&ctx, center(), AlignmentPolicy::Justify, usize::MAX, RunMode::Materialize)
            .unwrap();
        assert_eq!(result.unit_count, 25);
        assert_eq!(result.units.len(), 25);
        assert_eq!(result.table_count, 0);
        assert_eq!(result.table_layout.rows, 5);
        assert_eq!(result.table_layout.columns, 5);
        assert_eq!(result.reason, None);
        assert_relative_eq!(result.min_spacing_m, 2.0);
    }

    #[test]
    fn test_budget_and_count_only() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let site = Site::prepare(&Boundary::rectangle("sq", center(), 10.0, 10.0, 180.0)).unwrap();
        let ctx = PlacementContext::new(&g, &config, &site, Footprint::new(2.0, 2.0));

        let limited = strategy()
            .run(&ctx, center(), AlignmentPolicy::Center, 7, RunMode::Materialize)
            .unwrap();
        assert_eq!(limited.unit_count, 7);
        assert_eq!(limited.reason, Some(ReasonCode::BudgetExhausted));

        let counted = strategy()
            .run(&ctx, center(), AlignmentPolicy::Center, usize::MAX, RunMode::CountOnly)
            .unwrap();
        assert_eq!(counted.unit_count, 25);
        assert!(counted.units.is_empty());

        let none = strategy()
            .run(&ctx, center(), AlignmentPolicy::Center, 0, RunMode::Materialize)
            .unwrap();
        assert_eq!(none.unit_count, 0);
        assert_eq!(none.reason, Some(ReasonCode::BudgetExhausted));
    }

    #[test]
    fn test_footprint_too_large() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let site = Site::prepare(&Boundary::rectangle("sq", center(), 3.0, 3.0, 180.0)).unwrap();
        let ctx = PlacementContext::new(&g, &config, &site, Footprint::new(4.0, 4.0));
        let result = strategy()
            .run(&ctx, center(), AlignmentPolicy::Center, usize::MAX, RunMode::Materialize)
            .unwrap();
        assert_eq!(result.unit_count, 0);
        assert_eq!(result.reason, Some(ReasonCode::NoFit));
    }
}
