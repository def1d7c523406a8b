//! Placement results and summaries.

use std::collections::BTreeSet;
use std::fmt;

use crate::boundary::BoundaryId;
use crate::placement::{LatticeIndex, PlacementUnit, TablePlacement};
use crate::topology::AlignmentPolicy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Machine-readable reason attached to an empty or short result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReasonCode {
    /// The boundary has fewer than 3 vertices.
    TooFewVertices,
    /// The boundary has no area.
    DegenerateBoundary,
    /// The unit budget ran out.
    BudgetExhausted,
    /// The geodesic capability failed.
    GeodesicFailure,
    /// No unit or table fits in the boundary.
    NoFit,
    /// The forced carport block does not fit.
    BlockRejected,
    /// No strictly interior starting point could be found.
    NoInteriorPoint,
    /// Any other failure while processing the boundary.
    ComputationFailed,
}

impl ReasonCode {
    /// Stable identifier used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::TooFewVertices => "too_few_vertices",
            ReasonCode::DegenerateBoundary => "degenerate_boundary",
            ReasonCode::BudgetExhausted => "budget_exhausted",
            ReasonCode::GeodesicFailure => "geodesic_failure",
            ReasonCode::NoFit => "no_fit",
            ReasonCode::BlockRejected => "block_rejected",
            ReasonCode::NoInteriorPoint => "no_interior_point",
            ReasonCode::ComputationFailed => "computation_failed",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows × columns of a grouped layout, derived from occupied lattice indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableLayout {
    /// Number of distinct occupied lattice rows.
    pub rows: usize,
    /// Number of distinct occupied lattice columns.
    pub columns: usize,
    /// Lowest and highest occupied row.
    pub row_span: Option<(i32, i32)>,
    /// Lowest and highest occupied column.
    pub column_span: Option<(i32, i32)>,
}

impl TableLayout {
    /// Counts the distinct rows and columns in a set of indices.
    pub fn from_indices<I>(indices: I) -> Self
    where
        I: IntoIterator<Item = LatticeIndex>,
    {
        let mut rows = BTreeSet::new();
        let mut cols = BTreeSet::new();
        for idx in indices {
            rows.insert(idx.row);
            cols.insert(idx.col);
        }
        let span = |set: &BTreeSet<i32>| Some((*set.iter().next()?, *set.iter().next_back()?));
        Self {
            rows: rows.len(),
            columns: cols.len(),
            row_span: span(&rows),
            column_span: span(&cols),
        }
    }

    /// Returns true when nothing is occupied.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

impl fmt::Display for TableLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.rows, self.columns)
    }
}

/// Placement result for one boundary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementResult {
    /// Boundary the result belongs to.
    pub boundary_id: BoundaryId,
    /// Number of placed units.
    pub unit_count: usize,
    /// Number of placed tables (0 for ungrouped layouts).
    pub table_count: usize,
    /// Occupied rows × columns.
    pub table_layout: TableLayout,
    /// Installed capacity in kW.
    pub capacity_kw: f64,
    /// Placed units. Empty for count-only runs.
    pub units: Vec<PlacementUnit>,
    /// Placed tables. Empty for ungrouped layouts and count-only runs.
    pub tables: Vec<TablePlacement>,
    /// Concrete alignment policy the origin was resolved with.
    pub alignment: AlignmentPolicy,
    /// Minimum center spacing of the lattice used, in metres.
    pub min_spacing_m: f64,
    /// Why the result is empty or short, if known.
    pub reason: Option<ReasonCode>,
}

impl PlacementResult {
    /// Creates an empty result.
    pub fn new(boundary_id: impl Into<BoundaryId>, alignment: AlignmentPolicy) -> Self {
        Self {
            boundary_id: boundary_id.into(),
            unit_count: 0,
            table_count: 0,
            table_layout: TableLayout::default(),
            capacity_kw: 0.0,
            units: Vec::new(),
            tables: Vec::new(),
            alignment,
            min_spacing_m: 0.0,
            reason: None,
        }
    }

    /// Creates an empty result carrying a reason.
    pub fn empty(
        boundary_id: impl Into<BoundaryId>,
        alignment: AlignmentPolicy,
        reason: ReasonCode,
    ) -> Self {
        Self::new(boundary_id, alignment).with_reason(reason)
    }

    /// Sets the reason code.
    pub fn with_reason(mut self, reason: ReasonCode) -> Self {
        self.reason = Some(reason);
        self
    }

    /// Sets the lattice minimum spacing.
    pub fn with_min_spacing(mut self, spacing: f64) -> Self {
        self.min_spacing_m = spacing;
        self
    }

    /// Recomputes capacity from the unit count and per-unit power in watts.
    pub fn apply_unit_power(&mut self, unit_power_w: f64) {
        self.capacity_kw = self.unit_count as f64 * unit_power_w / 1000.0;
    }

    /// Returns true if at least one unit was placed.
    pub fn is_successful(&self) -> bool {
        self.unit_count > 0
    }
}

/// Per-boundary outcome of a layout computation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
pub enum BoundaryOutcome {
    /// The boundary was processed.
    Placed(PlacementResult),
    /// Processing the boundary failed; any previous result should be kept.
    Aborted {
        /// Boundary that failed.
        boundary_id: BoundaryId,
        /// Why it failed.
        reason: ReasonCode,
    },
}

impl BoundaryOutcome {
    /// Returns the boundary id.
    pub fn boundary_id(&self) -> &BoundaryId {
        match self {
            BoundaryOutcome::Placed(result) => &result.boundary_id,
            BoundaryOutcome::Aborted { boundary_id, .. } => boundary_id,
        }
    }

    /// Returns the result if the boundary was processed.
    pub fn placed(&self) -> Option<&PlacementResult> {
        match self {
            BoundaryOutcome::Placed(result) => Some(result),
            BoundaryOutcome::Aborted { .. } => None,
        }
    }

    /// Returns true if processing was aborted.
    pub fn is_aborted(&self) -> bool {
        matches!(self, BoundaryOutcome::Aborted { .. })
    }
}

/// Table count and layout of one boundary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundaryTables {
    /// Boundary id.
    pub boundary_id: BoundaryId,
    /// Number of tables.
    pub table_count: usize,
    /// Occupied rows × columns.
    pub table_layout: TableLayout,
}

/// Aggregate counts for bill-of-materials consumers.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutSummary {
    /// Total placed units over all boundaries.
    pub total_units: usize,
    /// Total capacity in kW.
    pub total_capacity_kw: f64,
    /// Total tables over all boundaries.
    pub total_tables: usize,
    /// Per-boundary table count and layout.
    pub boundaries: Vec<BoundaryTables>,
}

impl LayoutSummary {
    /// Builds a summary from the placed results, skipping aborted boundaries.
    pub fn from_outcomes(outcomes: &[BoundaryOutcome]) -> Self {
        Self::from_results(outcomes.iter().filter_map(BoundaryOutcome::placed))
    }

    /// Builds a summary from a set of results.
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a PlacementResult>,
    {
        let mut summary = Self::default();
        for r in results {
            summary.total_units += r.unit_count;
            summary.total_capacity_kw += r.capacity_kw;
            summary.total_tables += r.table_count;
            summary.boundaries.push(BoundaryTables {
                boundary_id: r.boundary_id.clone(),
                table_count: r.table_count,
                table_layout: r.table_layout,
            });
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn result(id: &str, units: usize, tables: usize) -> PlacementResult {
        let mut r = PlacementResult::new(id, AlignmentPolicy::Center);
        r.unit_count = units;
        r.table_count = tables;
        r.apply_unit_power(400.0);
        r
    }

    #[test]
    fn test_table_layout_from_indices() {
        let layout = TableLayout::from_indices(vec![
            LatticeIndex::new(0, 0),
            LatticeIndex::new(0, 1),
            LatticeIndex::new(-1, 1),
            LatticeIndex::new(2, -3),
        ]);
        assert_eq!(layout.rows, 3);
        assert_eq!(layout.columns, 3);
        assert_eq!(layout.row_span, Some((-1, 2)));
        assert_eq!(layout.column_span, Some((-3, 1)));
        assert_eq!(layout.to_string(), "3 x 3");

        let empty = TableLayout::from_indices(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.row_span, None);
    }

    #[test]
    fn test_capacity() {
        let r = result("a", 25, 0);
        assert_relative_eq!(r.capacity_kw, 10.0);
        assert!(r.is_successful());
        assert!(!PlacementResult::new("b", AlignmentPolicy::Left).is_successful());
    }

    #[test]
    fn test_summary_skips_aborted() {
        let outcomes = vec![
            BoundaryOutcome::Placed(result("a", 10, 1)),
            BoundaryOutcome::Aborted {
                boundary_id: "b".into(),
                reason: ReasonCode::GeodesicFailure,
            },
            BoundaryOutcome::Placed(result("c", 20, 2)),
        ];
        let summary = LayoutSummary::from_outcomes(&outcomes);
        assert_eq!(summary.total_units, 30);
        assert_eq!(summary.total_tables, 3);
        assert_relative_eq!(summary.total_capacity_kw, 12.0);
        assert_eq!(summary.boundaries.len(), 2);
        assert_eq!(outcomes[1].boundary_id(), "b");
        assert!(outcomes[1].is_aborted());
    }

    #[test]
    fn test_empty_result_reason() {
        let r = PlacementResult::empty("x", AlignmentPolicy::Center, ReasonCode::TooFewVertices);
        assert_eq!(r.reason, Some(ReasonCode::TooFewVertices));
        assert_eq!(r.unit_count, 0);
        assert_eq!(ReasonCode::BlockRejected.to_string(), "block_rejected");
    }
}
