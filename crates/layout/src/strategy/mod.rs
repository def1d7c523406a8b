//! Placement strategies, one per [`Topology`] variant.

mod carport;
mod fixed_table;
mod group_search;
mod ungrouped;

pub use carport::CarportStrategy;
pub use fixed_table::FixedTableStrategy;
pub use ungrouped::UngroupedStrategy;

use std::sync::atomic::{AtomicBool, Ordering};

use solarpack_core::{
    AlignmentPolicy, Config, Error, Footprint, GeoPoint, Geodesic, PlacementResult, ReasonCode,
    Result, Topology,
};

use crate::site::Site;

/// Whether a run materialises units or only counts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Build every unit and table.
    Materialize,
    /// Count only; `units` and `tables` stay empty.
    CountOnly,
}

/// Everything a strategy needs for one boundary.
#[derive(Clone, Copy)]
pub struct PlacementContext<'a> {
    /// Geodesic capability.
    pub geodesic: &'a dyn Geodesic,
    /// Engine constants.
    pub config: &'a Config,
    /// Prepared boundary.
    pub site: &'a Site,
    /// Module footprint.
    pub footprint: Footprint,
    cancelled: Option<&'a AtomicBool>,
}

impl<'a> PlacementContext<'a> {
    /// Creates a context.
    pub fn new(
        geodesic: &'a dyn Geodesic,
        config: &'a Config,
        site: &'a Site,
        footprint: Footprint,
    ) -> Self {
        Self {
            geodesic,
            config,
            site,
            footprint,
            cancelled: None,
        }
    }

    /// Observes a cancellation flag.
    pub fn with_cancellation(mut self, flag: &'a AtomicBool) -> Self {
        self.cancelled = Some(flag);
        self
    }

    /// Returns `Error::Cancelled` once the flag is set.
    pub fn check_cancelled(&self) -> Result<()> {
        match self.cancelled {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(Error::Cancelled),
            _ => Ok(()),
        }
    }
}

/// A topology-specific placement algorithm.
pub trait PlacementStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Largest nominal lattice pitch, used to size the `Optimum` sample radii.
    fn max_pitch(&self, footprint: &Footprint) -> f64;

    /// Places units expanding from `origin` under a concrete `alignment`,
    /// stopping once `budget` units are placed.
    fn run(
        &self,
        ctx: &PlacementContext<'_>,
        origin: GeoPoint,
        alignment: AlignmentPolicy,
        budget: usize,
        mode: RunMode,
    ) -> Result<PlacementResult>;
}

/// Reason attached to a finished run.
fn run_reason(placed: usize, budget_hit: bool) -> Option<ReasonCode> {
    if budget_hit {
        Some(ReasonCode::BudgetExhausted)
    } else if placed == 0 {
        Some(ReasonCode::NoFit)
    } else {
        None
    }
}

/// Selects the strategy for a topology.
pub fn for_topology(topology: &Topology) -> Box<dyn PlacementStrategy> {
    match *topology {
        Topology::Ungrouped {
            adjacent_gap,
            row_spacing,
            free_form,
        } => Box::new(UngroupedStrategy {
            adjacent_gap,
            row_spacing,
            free_form,
        }),
        Topology::FixedTable {
            rows_per_table,
            modules_per_row,
            inter_table_spacing_x,
            inter_table_spacing_y,
            module_gap,
            row_gap,
        } => Box::new(FixedTableStrategy {
            rows_per_table,
            modules_per_row,
            spacing_x: inter_table_spacing_x,
            spacing_y: inter_table_spacing_y,
            module_gap,
            row_gap,
        }),
        Topology::Carport {
            rows,
            modules_per_row,
            force_rectangle,
            module_gap,
        } => Box::new(CarportStrategy {
            rows,
            modules_per_row,
            force_rectangle,
            module_gap,
        }),
    }
}
