//! # Solarpack Layout
//!
//! Module placement for the solarpack packing engine.
//!
//! A [`LayoutPlanner`] takes a [`LayoutRequest`] (boundaries, footprint,
//! topology, alignment, budget), resolves an origin per boundary and runs
//! the strategy selected by the topology:
//!
//! - [`UngroupedStrategy`]: single units expanded in square rings
//! - [`FixedTableStrategy`]: rigid tables on a regular lattice
//! - [`CarportStrategy`]: one forced carport block, or carport rows
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support
//! - `parallel`: Score `Optimum` candidates with rayon

pub mod alignment;
pub mod containment;
pub mod lattice;
pub mod orchestrator;
pub mod session;
pub mod site;
pub mod strategy;

// Re-exports
pub use alignment::{Candidate, OriginResolver};
pub use containment::{ContainmentEvaluator, ContainmentRule};
pub use orchestrator::{LayoutOutcome, LayoutPlanner, LayoutRequest};
pub use session::LayoutSession;
pub use site::Site;
pub use strategy::{
    CarportStrategy, FixedTableStrategy, PlacementContext, PlacementStrategy, RunMode,
    UngroupedStrategy,
};
pub use solarpack_core::{Config, Error, Result};
