//! Scenario suite for solarpack
//!
//! This crate provides:
//! - A JSON scenario format with boundaries in local metres
//! - A runner that plans a scenario under several alignment policies
//! - Result reporting and expected-count checks

mod parser;
mod result;
mod runner;
mod scenario;

pub use parser::{ParseError, ScenarioParser};
pub use result::{RunResult, ScenarioReport};
pub use runner::{RunnerConfig, ScenarioRunner};
pub use scenario::{ModuleSpec, Scenario, SiteShape};
