//! Carport block placement.

use solarpack_core::{
    AlignmentPolicy, Footprint, GeoPoint, Geodesic, LatticeIndex, MemberIndex, PlacementResult,
    PlacementUnit, ReasonCode, Result, TableLayout, TablePlacement, Topology,
};

use super::group_search::GroupSearch;
use super::{run_reason, PlacementContext, PlacementStrategy, RunMode};
use crate::containment::{ContainmentEvaluator, ContainmentRule};
use crate::lattice::{group_extent, member_offsets, offset_local, rect_corners, Lattice};

/// Carport canopies: a single forced block, or independent carport rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarportStrategy {
    /// Unit rows of a forced block.
    pub rows: u32,
    /// Units per row.
    pub modules_per_row: u32,
    /// Place exactly one `rows × modules_per_row` block.
    pub force_rectangle: bool,
    /// Gap between units inside a row.
    pub module_gap: f64,
}

impl CarportStrategy {
    fn topology(&self) -> Topology {
        Topology::Carport {
            rows: self.rows,
            modules_per_row: self.modules_per_row,
            force_rectangle: self.force_rectangle,
            module_gap: self.module_gap,
        }
    }

    /// Rows per placed group: the whole block when forced, one row otherwise.
    fn group_rows(&self) -> u32 {
        if self.force_rectangle {
            self.rows
        } else {
            1
        }
    }

    /// Group extent `(width, height)`.
    pub fn group_size(&self, footprint: &Footprint) -> (f64, f64) {
        (
            group_extent(self.modules_per_row, footprint.width, self.module_gap),
            self.group_rows() as f64 * footprint.height,
        )
    }

    /// Units of a placed group centred at `center`.
    fn group_units(
        &self,
        geodesic: &dyn Geodesic,
        center: GeoPoint,
        azimuth: f64,
        footprint: &Footprint,
    ) -> Result<Vec<(MemberIndex, GeoPoint, [GeoPoint; 4])>> {
        let offsets = member_offsets(
            self.group_rows(),
            self.modules_per_row,
            footprint.height,
            footprint.width + self.module_gap,
        );
        let mut units = Vec::with_capacity(offsets.len());
        for (row, col, dx, dy) in offsets {
            let c = offset_local(geodesic, center, azimuth, dx, dy)?;
            let corners = rect_corners(geodesic, c, azimuth, footprint.width, footprint.height)?;
            units.push((MemberIndex { row, col }, c, corners));
        }
        Ok(units)
    }

    fn min_spacing(&self, footprint: &Footprint, column_spacing: f64, row_spacing: f64) -> f64 {
        let row_pitch = if self.force_rectangle {
            footprint.height
        } else {
            footprint.height + row_spacing
        };
        let mut spacing = row_pitch.min(footprint.width + column_spacing);
        if self.modules_per_row > 1 {
            spacing = spacing.min(footprint.width + self.module_gap);
        }
        spacing
    }
}

impl PlacementStrategy for CarportStrategy {
    fn name(&self) -> &'static str {
        "carport"
    }

    fn max_pitch(&self, footprint: &Footprint) -> f64 {
        let (w, h) = self.group_size(footprint);
        w.max(h)
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
        let (group_w, group_h) = self.group_size(&footprint);
        let per_group = self.group_rows() as usize * self.modules_per_row as usize;
        let evaluator = ContainmentEvaluator::new(
            ctx.geodesic,
            site.ring(),
            ContainmentRule::select(&self.topology(), alignment),
        );
        let column_spacing = ctx.config.carport_spacing_fraction * group_w;
        let row_spacing = ctx.config.carport_row_spacing_fraction * group_h;
        let mut result = PlacementResult::new(site.id().clone(), alignment)
            .with_min_spacing(self.min_spacing(&footprint, column_spacing, row_spacing));

        let placed: Vec<(LatticeIndex, GeoPoint)> = if self.force_rectangle {
            ctx.check_cancelled()?;
            if budget < per_group {
                result.reason = Some(ReasonCode::BudgetExhausted);
                return Ok(result);
            }
            let outline = rect_corners(ctx.geodesic, origin, azimuth, group_w, group_h)?;
            if !evaluator.accepts(origin, &outline)? {
                log::debug!("carport block rejected for '{}'", site.id());
                result.reason = Some(ReasonCode::BlockRejected);
                return Ok(result);
            }
            vec![(LatticeIndex::default(), origin)]
        } else {
            // Rows are rigid groups: every unit of a row must be inside.
            let lattice = Lattice::new(
                origin,
                azimuth,
                group_h + row_spacing,
                group_w + column_spacing,
            );
            let margin = group_w.hypot(group_h) / 2.0;
            let outcome = GroupSearch::new(ctx, lattice, margin, per_group, budget).run(
                ctx,
                |_, center| {
                    let members: Vec<(GeoPoint, [GeoPoint; 4])> = self
                        .group_units(ctx.geodesic, center, azimuth, &footprint)?
                        .into_iter()
                        .map(|(_, c, corners)| (c, corners))
                        .collect();
                    evaluator.accepts_all(&members)
                },
            )?;
            result.reason = run_reason(outcome.placed.len(), outcome.budget_hit);
            outcome.placed
        };

        result.table_count = placed.len();
        result.unit_count = placed.len() * per_group;
        result.table_layout = TableLayout::from_indices(placed.iter().map(|(i, _)| *i));

        if mode == RunMode::Materialize {
            for (table_id, (index, center)) in placed.iter().enumerate() {
                result.tables.push(TablePlacement {
                    table_id,
                    index: *index,
                    center: *center,
                    unit_count: per_group,
                });
                for (member, c, corners) in self.group_units(ctx.geodesic, *center, azimuth, &footprint)? {
                    result.units.push(
                        PlacementUnit::new(site.id().clone(), *index, c, corners)
                            .with_table(table_id, member),
                    );
                }
            }
        }

        log::debug!(
            "carport '{}' {:?}: {} groups, {} units",
            site.id(),
            alignment,
            result.table_count,
            result.unit_count
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::Site;
    use solarpack_core::{Boundary, Config, SphericalGeodesic};

    fn center() -> GeoPoint {
        GeoPoint::new(45.76, 4.83)
    }

    fn forced() -> CarportStrategy {
        CarportStrategy {
            rows: 6,
            modules_per_row: 10,
            force_rectangle: true,
            module_gap: 0.0,
        }
    }

    #[test]
    fn test_forced_block_fits() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let site = Site::prepare(&Boundary::rectangle("c", center(), 25.0, 10.0, 180.0)).unwrap();
        let ctx = PlacementContext::new(&g, &config, &site, Footprint::new(2.0, 1.0));

        let result = forced()
            .run(&ctx, center(), AlignmentPolicy::Center, usize::MAX, RunMode::Materialize)
            .unwrap();
        assert_eq!(result.unit_count, 60);
        assert_eq!(result.table_count, 1);
        assert_eq!(result.units.len(), 60);
        assert_eq!(result.table_layout.rows, 1);
        assert_eq!(result.reason, None);
    }

    #[test]
    fn test_forced_block_rejected_or_over_budget() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        // Block is 20 x 6 m; the boundary is too short along the azimuth.
        let site = Site::prepare(&Boundary::rectangle("c", center(), 25.0, 3.0, 180.0)).unwrap();
        let ctx = PlacementContext::new(&g, &config, &site, Footprint::new(2.0, 1.0));

        let rejected = forced()
            .run(&ctx, center(), AlignmentPolicy::Center, usize::MAX, RunMode::Materialize)
            .unwrap();
        assert_eq!(rejected.unit_count, 0);
        assert_eq!(rejected.reason, Some(ReasonCode::BlockRejected));

        let short = forced()
            .run(&ctx, center(), AlignmentPolicy::Center, 59, RunMode::Materialize)
            .unwrap();
        assert_eq!(short.reason, Some(ReasonCode::BudgetExhausted));
    }

    #[test]
    fn test_relaxed_rule_for_left_alignment() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        // Block overhangs on the right: only the two left corners are inside.
        let site = Site::prepare(&Boundary::rectangle("c", center(), 30.0, 10.0, 180.0)).unwrap();
        let ctx = PlacementContext::new(&g, &config, &site, Footprint::new(2.0, 1.0));
        let origin = offset_local(&g, center(), 180.0, 12.0, 0.0).unwrap();

        let center_rule = forced()
            .run(&ctx, origin, AlignmentPolicy::Center, usize::MAX, RunMode::CountOnly)
            .unwrap();
        assert_eq!(center_rule.reason, Some(ReasonCode::BlockRejected));

        let left_rule = forced()
            .run(&ctx, origin, AlignmentPolicy::Left, usize::MAX, RunMode::CountOnly)
            .unwrap();
        assert_eq!(left_rule.unit_count, 60);
    }

    #[test]
    fn test_carport_rows() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let site = Site::prepare(&Boundary::rectangle("c", center(), 64.0, 6.0, 180.0)).unwrap();
        let ctx = PlacementContext::new(&g, &config, &site, Footprint::new(2.0, 1.0));
        let rows = CarportStrategy {
            force_rectangle: false,
            ..forced()
        };

        let result = rows
            .run(&ctx, center(), AlignmentPolicy::Center, usize::MAX, RunMode::Materialize)
            .unwrap();
        // 20 m rows at a 21 m column pitch and a 1.2 m row pitch:
        // columns -1..=1, rows -2..=2.
        assert_eq!(result.table_count, 15);
        assert_eq!(result.unit_count, 150);
        assert_eq!(result.units.len(), 150);
        assert_eq!(result.table_layout.rows, 5);
        assert_eq!(result.table_layout.columns, 3);
        assert!(result.units.iter().all(|u| u.member.map_or(false, |m| m.row == 0)));
    }

    #[test]
    fn test_carport_rows_keep_every_unit_inside() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        // Side rows would hang 6 m past the short edges; Left's relaxed
        // quorum must not let them through.
        let site = Site::prepare(&Boundary::rectangle("c", center(), 50.0, 6.0, 163.0)).unwrap();
        let ctx = PlacementContext::new(&g, &config, &site, Footprint::new(2.0, 1.0));
        let rows = CarportStrategy {
            force_rectangle: false,
            ..forced()
        };

        let result = rows
            .run(&ctx, center(), AlignmentPolicy::Left, usize::MAX, RunMode::Materialize)
            .unwrap();
        assert_eq!(result.table_layout.columns, 1);
        assert_eq!(result.table_count, 5);
        for unit in &result.units {
            for corner in &unit.corners {
                assert!(g.contains(site.ring(), *corner).unwrap());
            }
        }
    }

    #[test]
    fn test_row_pitch_follows_config() {
        let g = SphericalGeodesic::new();
        let site = Site::prepare(&Boundary::rectangle("c", center(), 64.0, 6.0, 180.0)).unwrap();
        let rows = CarportStrategy {
            force_rectangle: false,
            ..forced()
        };

        let tight = Config::default().with_carport_spacing(0.05, 0.0);
        let ctx = PlacementContext::new(&g, &tight, &site, Footprint::new(2.0, 1.0));
        let result = rows
            .run(&ctx, center(), AlignmentPolicy::Center, usize::MAX, RunMode::CountOnly)
            .unwrap();
        // Touching rows: -2..=2 still fit, now at a 1 m pitch.
        assert_eq!(result.table_layout.rows, 5);
        assert!((result.min_spacing_m - 1.0).abs() < 1e-9);

        let loose = Config::default();
        let ctx = PlacementContext::new(&g, &loose, &site, Footprint::new(2.0, 1.0));
        let result = rows
            .run(&ctx, center(), AlignmentPolicy::Center, usize::MAX, RunMode::CountOnly)
            .unwrap();
        assert!((result.min_spacing_m - 1.2).abs() < 1e-9);
    }
}
