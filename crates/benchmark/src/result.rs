//! Scenario run results.

use serde::{Deserialize, Serialize};
use solarpack::AlignmentPolicy;
use std::fs;
use std::path::Path;

/// Result of planning one scenario under one alignment policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Scenario name
    pub scenario: String,
    /// Structure preset id
    pub structure: String,
    /// Requested alignment
    pub requested: AlignmentPolicy,
    /// Alignment after structure resolution
    pub resolved: AlignmentPolicy,
    /// Total placed units
    pub total_units: usize,
    /// Total placed tables
    pub total_tables: usize,
    /// Total capacity in kW
    pub capacity_kw: f64,
    /// Boundaries aborted by a geodesic failure
    pub aborted: usize,
    /// Per-boundary unit counts
    pub boundary_units: Vec<(String, usize)>,
    /// Fastest computation time over all runs, in milliseconds
    pub time_ms: u64,
}

/// Collected results of a runner invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Individual results
    pub runs: Vec<RunResult>,
    /// Expected total units under the center policy, if the scenario states one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_units: Option<usize>,
}

impl ScenarioReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a result.
    pub fn add_run(&mut self, run: RunResult) {
        self.runs.push(run);
    }

    /// Result with the most units; ties go to the earliest run.
    pub fn best(&self) -> Option<&RunResult> {
        self.runs
            .iter()
            .fold(None, |best: Option<&RunResult>, r| match best {
                Some(b) if b.total_units >= r.total_units => Some(b),
                _ => Some(r),
            })
    }

    /// Returns false if a center run disagrees with the expected count.
    pub fn matches_expectation(&self) -> bool {
        let Some(expected) = self.expected_units else {
            return true;
        };
        self.runs
            .iter()
            .filter(|r| r.resolved == AlignmentPolicy::Center)
            .all(|r| r.total_units == expected)
    }

    /// Prints a table of the results.
    pub fn print_summary(&self) {
        println!(
            "{:<28} {:<12} {:<10} {:>7} {:>7} {:>10} {:>8}",
            "Scenario", "Requested", "Resolved", "Units", "Tables", "kW", "ms"
        );
        println!("{:-<88}", "");
        for r in &self.runs {
            println!(
                "{:<28} {:<12} {:<10} {:>7} {:>7} {:>10.2} {:>8}",
                r.scenario,
                format!("{:?}", r.requested),
                format!("{:?}", r.resolved),
                r.total_units,
                r.total_tables,
                r.capacity_kw,
                r.time_ms
            );
            if r.aborted > 0 {
                println!("  {} boundaries aborted", r.aborted);
            }
        }
        if let Some(best) = self.best() {
            println!("\nBest: {:?} with {} units", best.resolved, best.total_units);
        }
        if !self.matches_expectation() {
            println!("Center count differs from expected {:?}", self.expected_units);
        }
    }

    /// Writes the report as pretty JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, json)
    }
}
