//! # Solarpack
//!
//! Packs solar module footprints into user-drawn geographic boundaries.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solarpack::{AlignmentPolicy, Boundary, Footprint, GeoPoint, LayoutPlanner, LayoutRequest, StructureKind};
//!
//! let roof = Boundary::rectangle("roof", GeoPoint::new(48.1, 11.6), 40.0, 20.0, 180.0);
//! let request = LayoutRequest::for_structure(
//!     StructureKind::Ballasted,
//!     vec![roof],
//!     Footprint::new(1.7, 1.1),
//!     AlignmentPolicy::Center,
//! )
//! .with_unit_power(420.0);
//!
//! let outcome = LayoutPlanner::default().plan(&request)?;
//! println!("{} modules, {:.1} kW", outcome.summary.total_units, outcome.summary.total_capacity_kw);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support
//! - `parallel`: Parallel `Optimum` candidate scoring

/// Core types, geodesic adapter and scheduling.
pub use solarpack_core as core;

/// Placement strategies and orchestration.
pub use solarpack_layout as layout;

// Re-export commonly used types at root level
pub use solarpack_core::{
    AlignmentPolicy, Boundary, BoundaryOutcome, CancellationToken, ChangeKind, Config, Error,
    Footprint, GeoPoint, Geodesic, LayoutSummary, Orientation, PlacementResult, PlacementUnit,
    ReasonCode, RecomputeScheduler, Result, SchedulerConfig, SphericalGeodesic, StructureKind,
    Topology,
};
pub use solarpack_layout::{LayoutOutcome, LayoutPlanner, LayoutRequest, LayoutSession};
