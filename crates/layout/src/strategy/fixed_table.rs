//! Fixed-table grid placement.

use solarpack_core::{
    AlignmentPolicy, Footprint, GeoPoint, MemberIndex, PlacementResult, PlacementUnit, Result,
    TableLayout, TablePlacement, Topology,
};

use super::group_search::GroupSearch;
use super::{run_reason, PlacementContext, PlacementStrategy, RunMode};
use crate::containment::{ContainmentEvaluator, ContainmentRule};
use crate::lattice::{group_extent, member_offsets, offset_local, rect_corners, Lattice};

/// Rigid `rows_per_table × modules_per_row` tables on a regular lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTableStrategy {
    /// Unit rows per table.
    pub rows_per_table: u32,
    /// Units per table row.
    pub modules_per_row: u32,
    /// Spacing between tables across the azimuth.
    pub spacing_x: f64,
    /// Spacing between tables along the azimuth.
    pub spacing_y: f64,
    /// Gap between units inside a table row.
    pub module_gap: f64,
    /// Gap between unit rows inside a table.
    pub row_gap: f64,
}

impl FixedTableStrategy {
    fn topology(&self) -> Topology {
        Topology::FixedTable {
            rows_per_table: self.rows_per_table,
            modules_per_row: self.modules_per_row,
            inter_table_spacing_x: self.spacing_x,
            inter_table_spacing_y: self.spacing_y,
            module_gap: self.module_gap,
            row_gap: self.row_gap,
        }
    }

    fn units_per_table(&self) -> usize {
        self.rows_per_table as usize * self.modules_per_row as usize
    }

    /// Table extent `(width, height)`.
    pub fn table_size(&self, footprint: &Footprint) -> (f64, f64) {
        (
            group_extent(self.modules_per_row, footprint.width, self.module_gap),
            group_extent(self.rows_per_table, footprint.height, self.row_gap),
        )
    }

    /// Lattice pitch `(row, col)` between table centers.
    pub fn table_pitch(&self, footprint: &Footprint) -> (f64, f64) {
        let (w, h) = self.table_size(footprint);
        (h + self.spacing_y, w + self.spacing_x)
    }

    /// Smallest distance between two unit centers on this layout.
    fn min_spacing(&self, footprint: &Footprint) -> f64 {
        let mut spacing = (footprint.width + self.spacing_x).min(footprint.height + self.spacing_y);
        if self.modules_per_row > 1 {
            spacing = spacing.min(footprint.width + self.module_gap);
        }
        if self.rows_per_table > 1 {
            spacing = spacing.min(footprint.height + self.row_gap);
        }
        spacing
    }
}

impl PlacementStrategy for FixedTableStrategy {
    fn name(&self) -> &'static str {
        "fixed-table"
    }

    fn max_pitch(&self, footprint: &Footprint) -> f64 {
        let (row, col) = self.table_pitch(footprint);
        row.max(col)
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
        let (row_pitch, col_pitch) = self.table_pitch(&footprint);
        let (table_w, table_h) = self.table_size(&footprint);
        let lattice = Lattice::new(origin, azimuth, row_pitch, col_pitch);
        let evaluator = ContainmentEvaluator::new(
            ctx.geodesic,
            site.ring(),
            ContainmentRule::select(&self.topology(), alignment),
        );
        let members = member_offsets(
            self.rows_per_table,
            self.modules_per_row,
            footprint.height + self.row_gap,
            footprint.width + self.module_gap,
        );
        let per_table = self.units_per_table();
        let margin = table_w.hypot(table_h) / 2.0;

        let mut units = Vec::new();
        let search = GroupSearch::new(ctx, lattice, margin, per_table, budget);
        let outcome = search.run(ctx, |_, center| {
            let mut table_units = Vec::with_capacity(members.len());
            for &(_, _, dx, dy) in &members {
                let unit_center = offset_local(ctx.geodesic, center, azimuth, dx, dy)?;
                let corners = rect_corners(
                    ctx.geodesic,
                    unit_center,
                    azimuth,
                    footprint.width,
                    footprint.height,
                )?;
                if !evaluator.accepts(unit_center, &corners)? {
                    return Ok(false);
                }
                table_units.push((unit_center, corners));
            }
            if mode == RunMode::Materialize {
                units.push(table_units);
            }
            Ok(true)
        })?;

        let mut result = PlacementResult::new(site.id().clone(), alignment)
            .with_min_spacing(self.min_spacing(&footprint));
        result.table_count = outcome.placed.len();
        result.unit_count = outcome.placed.len() * per_table;
        result.table_layout = TableLayout::from_indices(outcome.placed.iter().map(|(i, _)| *i));
        result.reason = run_reason(outcome.placed.len(), outcome.budget_hit);

        if mode == RunMode::Materialize {
            for (table_id, ((index, center), table_units)) in
                outcome.placed.iter().zip(units).enumerate()
            {
                result.tables.push(TablePlacement {
                    table_id,
                    index: *index,
                    center: *center,
                    unit_count: per_table,
                });
                for ((row, col, _, _), (unit_center, corners)) in members.iter().zip(table_units) {
                    result.units.push(
                        PlacementUnit::new(site.id().clone(), *index, unit_center, corners)
                            .with_table(table_id, MemberIndex { row: *row, col: *col }),
                    );
                }
            }
        }

        log::debug!(
            "fixed-table '{}' {:?}: {} tables ({}), {} units",
            site.id(),
            alignment,
            result.table_count,
            result.table_layout,
            result.unit_count
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::Site;
    use approx::assert_relative_eq;
    use solarpack_core::{Boundary, Config, ReasonCode, SphericalGeodesic};

    fn center() -> GeoPoint {
        GeoPoint::new(40.4168, -3.7038)
    }

    fn tables_2x5() -> FixedTableStrategy {
        FixedTableStrategy {
            rows_per_table: 2,
            modules_per_row: 5,
            spacing_x: 1.0,
            spacing_y: 1.0,
            module_gap: 0.0,
            row_gap: 0.0,
        }
    }

    #[test]
    fn test_geometry() {
        let fp = Footprint::new(2.0, 1.0);
        let s = tables_2x5();
        assert_eq!(s.table_size(&fp), (10.0, 2.0));
        assert_eq!(s.table_pitch(&fp), (3.0, 11.0));
        assert_relative_eq!(s.max_pitch(&fp), 11.0);
        assert_relative_eq!(s.min_spacing(&fp), 1.0);
    }

    #[test]
    fn test_tables_in_rectangle() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let site = Site::prepare(&Boundary::rectangle("r", center(), 40.0, 20.0, 180.0)).unwrap();
        let ctx = PlacementContext::new(&g, &config, &site, Footprint::new(2.0, 1.0));

        let result = tables_2x5()
            .run(&ctx, center(), AlignmentPolicy::Center, usize::MAX, RunMode::Materialize)
            .unwrap();
        // Columns -1..=1, rows -3..=3.
        assert_eq!(result.table_count, 21);
        assert_eq!(result.unit_count, 210);
        assert_eq!(result.units.len(), 210);
        assert_eq!(result.tables.len(), 21);
        assert_eq!(result.table_layout.rows, 7);
        assert_eq!(result.table_layout.columns, 3);
        assert_eq!(result.table_layout.row_span, Some((-3, 3)));
        assert!(result.units.iter().all(|u| u.table_id.is_some()));
    }

    #[test]
    fn test_budget_never_splits_tables() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let site = Site::prepare(&Boundary::rectangle("r", center(), 40.0, 20.0, 180.0)).unwrap();
        let ctx = PlacementContext::new(&g, &config, &site, Footprint::new(2.0, 1.0));

        let result = tables_2x5()
            .run(&ctx, center(), AlignmentPolicy::Center, 57, RunMode::CountOnly)
            .unwrap();
        assert_eq!(result.table_count, 5);
        assert_eq!(result.unit_count, 50);
        assert_eq!(result.reason, Some(ReasonCode::BudgetExhausted));
        assert!(result.units.is_empty());

        let tiny = tables_2x5()
            .run(&ctx, center(), AlignmentPolicy::Center, 9, RunMode::Materialize)
            .unwrap();
        assert_eq!(tiny.unit_count, 0);
        assert_eq!(tiny.reason, Some(ReasonCode::BudgetExhausted));
    }

    #[test]
    fn test_table_larger_than_boundary() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let site = Site::prepare(&Boundary::rectangle("r", center(), 8.0, 20.0, 180.0)).unwrap();
        let ctx = PlacementContext::new(&g, &config, &site, Footprint::new(2.0, 1.0));
        let result = tables_2x5()
            .run(&ctx, center(), AlignmentPolicy::Center, usize::MAX, RunMode::Materialize)
            .unwrap();
        assert_eq!(result.table_count, 0);
        assert_eq!(result.reason, Some(ReasonCode::NoFit));
    }
}
