//! # Solarpack Core
//!
//! Core types shared by the solarpack module packing engine.
//!
//! This crate provides the geodesic adapter, the local planar frame, the
//! input model (boundaries, footprints, topologies, structure presets) and
//! the result types produced by the placement strategies in
//! `solarpack-layout`.
//!
//! ## Core Components
//!
//! - **Geodesic adapter**: [`Geodesic`] trait and the [`SphericalGeodesic`] implementation
//! - **Local frames**: [`LocalFrame`] and [`LocalBounds`] aligned with an installation azimuth
//! - **Inputs**: [`Boundary`], [`Footprint`], [`Topology`], [`AlignmentPolicy`], [`StructureKind`]
//! - **Results**: [`PlacementResult`], [`BoundaryOutcome`], [`LayoutSummary`]
//! - **Scheduling**: [`RecomputeScheduler`] for interactive hosts
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod boundary;
pub mod config;
pub mod error;
pub mod footprint;
pub mod geodesic;
pub mod placement;
pub mod polygon;
pub mod result;
pub mod scheduler;
pub mod topology;
pub mod transform;

// Re-exports
pub use boundary::{Boundary, BoundaryId, DEFAULT_AZIMUTH};
pub use config::Config;
pub use error::{Error, Result};
pub use footprint::{Footprint, Orientation};
pub use geodesic::{
    normalize_bearing, GeoPoint, Geodesic, SphericalGeodesic, EARTH_RADIUS_M, EDGE_TOLERANCE_M,
};
pub use placement::{LatticeIndex, MemberIndex, PlacementUnit, TablePlacement};
pub use polygon::PointLocation;
pub use result::{
    BoundaryOutcome, BoundaryTables, LayoutSummary, PlacementResult, ReasonCode, TableLayout,
};
pub use scheduler::{
    CancellationToken, ChangeKind, RecomputeScheduler, SchedulerConfig, SchedulerState, Ticket,
};
pub use topology::{
    AlignmentPolicy, CarportConfig, LayoutPreset, StructureKind, TableConfig, Topology,
};
pub use transform::{LocalBounds, LocalFrame, LocalPoint};
