//! Scenario runner.

use crate::parser::ParseError;
use crate::result::{RunResult, ScenarioReport};
use crate::scenario::Scenario;
use solarpack::{AlignmentPolicy, Config, LayoutPlanner};

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Alignment policies to plan with
    pub alignments: Vec<AlignmentPolicy>,
    /// Repetitions per policy; the fastest time is reported
    pub runs_per_config: usize,
    /// Engine constants
    pub engine: Config,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            alignments: vec![AlignmentPolicy::Center],
            runs_per_config: 1,
            engine: Config::default(),
        }
    }
}

impl RunnerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every alignment policy, including `Optimum`.
    pub fn all_alignments() -> Self {
        let mut alignments = AlignmentPolicy::CONCRETE.to_vec();
        alignments.push(AlignmentPolicy::Optimum);
        Self::new().with_alignments(alignments)
    }

    /// Sets the alignment policies.
    pub fn with_alignments(mut self, alignments: Vec<AlignmentPolicy>) -> Self {
        self.alignments = alignments;
        self
    }

    /// Sets the number of repetitions.
    pub fn with_runs_per_config(mut self, runs: usize) -> Self {
        self.runs_per_config = runs.max(1);
        self
    }
}

/// Plans scenarios and collects the results.
pub struct ScenarioRunner {
    config: RunnerConfig,
}

impl ScenarioRunner {
    /// Creates a runner.
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Plans `scenario` under every configured alignment policy.
    pub fn run_scenario(&self, scenario: &Scenario) -> Result<ScenarioReport, ParseError> {
        let kind = scenario.structure_kind().ok_or_else(|| {
            ParseError::InvalidFormat(format!("unknown structure '{}'", scenario.structure))
        })?;
        let planner = LayoutPlanner::new(self.config.engine.clone());

        let mut report = ScenarioReport::new();
        report.expected_units = scenario.expected_units;

        for &requested in &self.config.alignments {
            let request = scenario.request(kind, requested);
            let mut best_time = u64::MAX;
            let mut last = None;
            for _ in 0..self.config.runs_per_config {
                match planner.plan(&request) {
                    Ok(outcome) => {
                        best_time = best_time.min(outcome.computation_time_ms);
                        last = Some(outcome);
                    }
                    Err(e) => {
                        log::warn!("{} / {:?} failed: {}", scenario.name, requested, e);
                        break;
                    }
                }
            }
            let Some(outcome) = last else {
                continue;
            };

            report.add_run(RunResult {
                scenario: scenario.name.clone(),
                structure: kind.id().to_string(),
                requested,
                resolved: request.alignment,
                total_units: outcome.summary.total_units,
                total_tables: outcome.summary.total_tables,
                capacity_kw: outcome.summary.total_capacity_kw,
                aborted: outcome.outcomes.iter().filter(|o| o.is_aborted()).count(),
                boundary_units: outcome
                    .results()
                    .map(|r| (r.boundary_id.clone(), r.unit_count))
                    .collect(),
                time_ms: best_time,
            });
        }
        Ok(report)
    }
}
