//! Placement orchestration over a set of boundaries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use solarpack_core::{
    AlignmentPolicy, Boundary, BoundaryOutcome, CancellationToken, Config, Error, Footprint,
    Geodesic, LayoutSummary, PlacementResult, ReasonCode, Result, SphericalGeodesic,
    StructureKind, Topology,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alignment::OriginResolver;
use crate::site::Site;
use crate::strategy::{self, PlacementContext, PlacementStrategy, RunMode};

/// Inputs of one layout computation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutRequest {
    /// Boundaries, processed in order.
    pub boundaries: Vec<Boundary>,
    /// Module footprint in metres.
    pub footprint: Footprint,
    /// How modules are grouped.
    pub topology: Topology,
    /// Requested alignment policy.
    pub alignment: AlignmentPolicy,
    /// Nominal power of one unit in watts.
    pub unit_power_w: f64,
    /// Maximum total units over all boundaries. `None` is unlimited.
    pub unit_budget: Option<i64>,
}

impl LayoutRequest {
    /// Creates an unlimited request with zero unit power.
    pub fn new(boundaries: Vec<Boundary>, footprint: Footprint, topology: Topology) -> Self {
        Self {
            boundaries,
            footprint,
            topology,
            alignment: AlignmentPolicy::default(),
            unit_power_w: 0.0,
            unit_budget: None,
        }
    }

    /// Creates a request from a structure preset. The alignment is resolved
    /// against the policies the structure allows.
    pub fn for_structure(
        kind: StructureKind,
        boundaries: Vec<Boundary>,
        footprint: Footprint,
        alignment: AlignmentPolicy,
    ) -> Self {
        Self::new(boundaries, footprint, kind.topology())
            .with_alignment(kind.resolve_alignment(alignment))
    }

    /// Sets the alignment policy.
    pub fn with_alignment(mut self, alignment: AlignmentPolicy) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the per-unit power in watts.
    pub fn with_unit_power(mut self, watts: f64) -> Self {
        self.unit_power_w = watts;
        self
    }

    /// Limits the total number of units.
    pub fn with_unit_budget(mut self, budget: i64) -> Self {
        self.unit_budget = Some(budget);
        self
    }

    /// Checks the request-wide inputs.
    pub fn validate(&self) -> Result<()> {
        self.footprint.validate()?;
        self.topology.validate()?;
        if !self.unit_power_w.is_finite() || self.unit_power_w < 0.0 {
            return Err(Error::Config(format!(
                "unit power must be a non-negative number of watts, got {}",
                self.unit_power_w
            )));
        }
        Ok(())
    }
}

/// Output of one layout computation.
///
/// Equality ignores `computation_time_ms`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutOutcome {
    /// One outcome per input boundary, in input order.
    pub outcomes: Vec<BoundaryOutcome>,
    /// Aggregate over the placed results.
    pub summary: LayoutSummary,
    /// Wall time in milliseconds.
    pub computation_time_ms: u64,
}

impl PartialEq for LayoutOutcome {
    fn eq(&self, other: &Self) -> bool {
        self.outcomes == other.outcomes && self.summary == other.summary
    }
}

impl LayoutOutcome {
    /// Placed result of a boundary, if any.
    pub fn result(&self, boundary_id: &str) -> Option<&PlacementResult> {
        self.outcomes
            .iter()
            .filter_map(BoundaryOutcome::placed)
            .find(|r| r.boundary_id == boundary_id)
    }

    /// Placed results in boundary order.
    pub fn results(&self) -> impl Iterator<Item = &PlacementResult> {
        self.outcomes.iter().filter_map(BoundaryOutcome::placed)
    }

    /// Returns true if no boundary was aborted.
    pub fn is_complete(&self) -> bool {
        !self.outcomes.iter().any(BoundaryOutcome::is_aborted)
    }
}

/// Runs placement strategies over every boundary of a [`LayoutRequest`].
pub struct LayoutPlanner {
    config: Config,
    geodesic: Arc<dyn Geodesic>,
    cancelled: Arc<AtomicBool>,
}

impl LayoutPlanner {
    /// Creates a planner using the spherical geodesic adapter.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            geodesic: Arc::new(SphericalGeodesic::new()),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a planner with default configuration.
    pub fn default_config() -> Self {
        Self::new(Config::default())
    }

    /// Replaces the geodesic capability.
    pub fn with_geodesic(mut self, geodesic: Arc<dyn Geodesic>) -> Self {
        self.geodesic = geodesic;
        self
    }

    /// Observes an external cancellation token, e.g. a scheduler ticket's.
    pub fn with_cancellation(mut self, token: &CancellationToken) -> Self {
        self.cancelled = token.flag();
        self
    }

    /// Engine constants in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Requests cancellation of the running computation. A cancelled
    /// planner stays cancelled until [`LayoutPlanner::reset`].
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Clears a previous cancellation request.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Computes a layout for every boundary of `request`.
    ///
    /// Request-wide input errors and cancellation fail the whole call.
    /// Boundaries that cannot be placed get an empty result with a reason
    /// code. Any other failure while processing a boundary aborts only that
    /// boundary.
    pub fn plan(&self, request: &LayoutRequest) -> Result<LayoutOutcome> {
        let start = Instant::now();
        self.config.validate()?;
        request.validate()?;

        let alignment = request.alignment;
        let mut outcomes = Vec::with_capacity(request.boundaries.len());

        if matches!(request.unit_budget, Some(b) if b <= 0) {
            log::info!("unit budget is exhausted, nothing to place");
            outcomes.extend(request.boundaries.iter().map(|b| {
                BoundaryOutcome::Placed(PlacementResult::empty(
                    b.id().clone(),
                    alignment,
                    ReasonCode::BudgetExhausted,
                ))
            }));
            return Ok(self.finish(outcomes, start));
        }

        let strategy = strategy::for_topology(&request.topology);
        let mut remaining = request.unit_budget.map(|b| b as usize);

        for boundary in &request.boundaries {
            if self.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let budget = remaining.unwrap_or(usize::MAX);
            let outcome = match self.plan_boundary(request, strategy.as_ref(), boundary, budget) {
                Ok(mut result) => {
                    result.apply_unit_power(request.unit_power_w);
                    if let Some(r) = remaining.as_mut() {
                        *r = r.saturating_sub(result.unit_count);
                    }
                    BoundaryOutcome::Placed(result)
                }
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    log::warn!("boundary '{}' aborted: {}", boundary.id(), e);
                    let reason = if e.is_boundary_local() {
                        ReasonCode::GeodesicFailure
                    } else {
                        ReasonCode::ComputationFailed
                    };
                    BoundaryOutcome::Aborted {
                        boundary_id: boundary.id().clone(),
                        reason,
                    }
                }
            };
            outcomes.push(outcome);
        }

        let outcome = self.finish(outcomes, start);
        log::info!(
            "{} layout: {} units, {} tables, {:.2} kW in {} ms",
            strategy.name(),
            outcome.summary.total_units,
            outcome.summary.total_tables,
            outcome.summary.total_capacity_kw,
            outcome.computation_time_ms
        );
        Ok(outcome)
    }

    fn plan_boundary(
        &self,
        request: &LayoutRequest,
        strategy: &dyn PlacementStrategy,
        boundary: &Boundary,
        budget: usize,
    ) -> Result<PlacementResult> {
        let alignment = request.alignment;
        let site = match Site::prepare(boundary) {
            Ok(site) => site,
            Err(reason) => {
                if reason == ReasonCode::TooFewVertices {
                    log::warn!(
                        "boundary '{}' has {} vertices, skipping",
                        boundary.id(),
                        boundary.vertices().len()
                    );
                } else {
                    log::debug!("boundary '{}' skipped: {}", boundary.id(), reason);
                }
                return Ok(PlacementResult::empty(boundary.id().clone(), alignment, reason));
            }
        };

        let geodesic = self.geodesic.as_ref();
        let ctx = PlacementContext::new(geodesic, &self.config, &site, request.footprint)
            .with_cancellation(&self.cancelled);
        let resolver = OriginResolver::new(geodesic, &self.config);

        let chosen = if alignment == AlignmentPolicy::Optimum {
            let max_pitch = strategy.max_pitch(&request.footprint);
            resolver
                .search(&site, max_pitch, |c| {
                    strategy
                        .run(&ctx, c.origin, c.policy, budget, RunMode::CountOnly)
                        .map(|r| r.unit_count)
                })?
                .map(|c| (c.policy, c.origin))
        } else {
            resolver
                .resolve(&site, alignment)?
                .map(|origin| (alignment, origin))
        };

        let Some((policy, origin)) = chosen else {
            log::debug!("no interior point in boundary '{}'", site.id());
            return Ok(PlacementResult::empty(
                site.id().clone(),
                alignment,
                ReasonCode::NoInteriorPoint,
            ));
        };
        strategy.run(&ctx, origin, policy, budget, RunMode::Materialize)
    }

    fn finish(&self, outcomes: Vec<BoundaryOutcome>, start: Instant) -> LayoutOutcome {
        LayoutOutcome {
            summary: LayoutSummary::from_outcomes(&outcomes),
            outcomes,
            computation_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl Default for LayoutPlanner {
    fn default() -> Self {
        Self::default_config()
    }
}
