//! Module footprints.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Panel orientation on the racking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Orientation {
    /// Long side across the azimuth.
    #[default]
    Landscape,
    /// Long side along the azimuth.
    Portrait,
}

/// Plan rectangle of one module in metres.
///
/// `width` runs along the column axis (azimuth + 90°), `height` along the
/// row axis (the azimuth).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Footprint {
    /// Extent across the azimuth.
    pub width: f64,
    /// Extent along the azimuth.
    pub height: f64,
}

impl Footprint {
    /// Creates a footprint from explicit dimensions.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Creates a footprint from panel dimensions in millimetres.
    pub fn from_panel(length_mm: f64, width_mm: f64, orientation: Orientation) -> Self {
        let (long, short) = (length_mm / 1000.0, width_mm / 1000.0);
        match orientation {
            Orientation::Landscape => Self::new(long, short),
            Orientation::Portrait => Self::new(short, long),
        }
    }

    /// Rejects zero, negative and non-finite dimensions.
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.height.is_finite()) {
            return Err(Error::InvalidFootprint(
                "dimensions must be finite".into(),
            ));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(Error::InvalidFootprint(format!(
                "dimensions must be positive, got {} x {}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Plan area in square metres.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Distance from the center to any corner.
    pub fn half_diagonal(&self) -> f64 {
        (self.width / 2.0).hypot(self.height / 2.0)
    }
}
