//! Displayed layout state across successive computations.

use solarpack_core::{BoundaryOutcome, LayoutSummary, PlacementResult};

use crate::orchestrator::LayoutOutcome;

/// The layout currently shown to the user.
///
/// Successive outcomes replace the stored results boundary by boundary. An
/// aborted boundary keeps its previous result instead of being cleared.
#[derive(Debug, Clone, Default)]
pub struct LayoutSession {
    results: Vec<PlacementResult>,
    summary: LayoutSummary,
}

impl LayoutSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a new outcome. Boundaries absent from `outcome` are dropped.
    /// Returns the number of aborted boundaries whose previous result was kept.
    pub fn apply(&mut self, outcome: &LayoutOutcome) -> usize {
        let mut kept = 0;
        let mut next = Vec::with_capacity(outcome.outcomes.len());
        for item in &outcome.outcomes {
            match item {
                BoundaryOutcome::Placed(result) => next.push(result.clone()),
                BoundaryOutcome::Aborted { boundary_id, reason } => {
                    if let Some(previous) = self.result(boundary_id) {
                        log::debug!("keeping previous result for '{}' ({})", boundary_id, reason);
                        next.push(previous.clone());
                        kept += 1;
                    }
                }
            }
        }
        self.results = next;
        self.summary = LayoutSummary::from_results(&self.results);
        kept
    }

    /// Stored result of a boundary.
    pub fn result(&self, boundary_id: &str) -> Option<&PlacementResult> {
        self.results.iter().find(|r| r.boundary_id == boundary_id)
    }

    /// Stored results in boundary order.
    pub fn results(&self) -> &[PlacementResult] {
        &self.results
    }

    /// Aggregate over the stored results.
    pub fn summary(&self) -> &LayoutSummary {
        &self.summary
    }

    /// Clears every stored result.
    pub fn clear(&mut self) {
        self.results.clear();
        self.summary = LayoutSummary::default();
    }
}
