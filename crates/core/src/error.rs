//! Error types for solarpack.

use thiserror::Error;

/// Result type alias for solarpack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while computing a module layout.
#[derive(Debug, Error)]
pub enum Error {
    /// Footprint dimensions are not usable (zero, negative or non-finite).
    #[error("Invalid footprint: {0}")]
    InvalidFootprint(String),

    /// Topology parameters are not usable.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// Boundary cannot be used for placement.
    #[error("Invalid boundary: {0}")]
    InvalidBoundary(String),

    /// The geodesic capability failed or is unavailable.
    #[error("Geodesic operation failed: {0}")]
    Geodesic(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Computation cancelled.
    #[error("Computation cancelled")]
    Cancelled,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true if this error should abort only the affected boundary
    /// rather than the whole computation.
    pub fn is_boundary_local(&self) -> bool {
        matches!(self, Error::Geodesic(_) | Error::InvalidBoundary(_))
    }
}
