//! Engine configuration.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning constants of the packing engine.
///
/// Results are a pure function of the inputs and this configuration, so two
/// computations with equal configs and inputs produce identical layouts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Step length of the Left/Right origin walk, metres.
    pub walk_step_m: f64,

    /// Center walk step as a fraction of the boundary bounding diagonal.
    pub center_step_fraction: f64,

    /// Lower clamp of the Center walk step, metres.
    pub center_step_min_m: f64,

    /// Upper clamp of the Center walk step, metres.
    pub center_step_max_m: f64,

    /// Pitch multiplier applied under Justify (never below the footprint).
    pub justify_pitch_factor: f64,

    /// Extra rings explored under Justify.
    pub justify_extra_rings: u32,

    /// Radii of Optimum candidate samples as fractions of the largest pitch.
    pub optimum_radius_fractions: Vec<f64>,

    /// Number of compass bearings sampled per Optimum radius.
    pub optimum_bearings: u32,

    /// Maximum number of gap-filling sweeps for table layouts.
    pub gap_fill_sweeps: u32,

    /// Resolution of the bounding-box grid used to find an interior seed.
    pub seed_grid_resolution: u32,

    /// Spacing between adjacent carport rows as a fraction of the row width.
    pub carport_spacing_fraction: f64,

    /// Gap between carport rows along the azimuth as a fraction of the row depth.
    pub carport_row_spacing_fraction: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            walk_step_m: 10.0,
            center_step_fraction: 0.25,
            center_step_min_m: 10.0,
            center_step_max_m: 15.0,
            justify_pitch_factor: 0.9,
            justify_extra_rings: 2,
            optimum_radius_fractions: vec![0.25, 0.5, 0.75, 1.0],
            optimum_bearings: 8,
            gap_fill_sweeps: 3,
            seed_grid_resolution: 16,
            carport_spacing_fraction: 0.05,
            carport_row_spacing_fraction: 0.2,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Left/Right walk step.
    pub fn with_walk_step(mut self, meters: f64) -> Self {
        self.walk_step_m = meters;
        self
    }

    /// Sets the Center walk step clamp.
    pub fn with_center_step_range(mut self, min_m: f64, max_m: f64) -> Self {
        self.center_step_min_m = min_m;
        self.center_step_max_m = max_m;
        self
    }

    /// Sets the Justify pitch multiplier.
    pub fn with_justify_pitch_factor(mut self, factor: f64) -> Self {
        self.justify_pitch_factor = factor;
        self
    }

    /// Sets the extra Justify rings.
    pub fn with_justify_extra_rings(mut self, rings: u32) -> Self {
        self.justify_extra_rings = rings;
        self
    }

    /// Sets the Optimum sample radii.
    pub fn with_optimum_radius_fractions(mut self, fractions: Vec<f64>) -> Self {
        self.optimum_radius_fractions = fractions;
        self
    }

    /// Sets the number of gap-filling sweeps.
    pub fn with_gap_fill_sweeps(mut self, sweeps: u32) -> Self {
        self.gap_fill_sweeps = sweeps;
        self
    }

    /// Sets the carport row spacing fractions across and along the azimuth.
    pub fn with_carport_spacing(mut self, column_fraction: f64, row_fraction: f64) -> Self {
        self.carport_spacing_fraction = column_fraction;
        self.carport_row_spacing_fraction = row_fraction;
        self
    }

    /// Center walk step for a boundary with the given bounding diagonal.
    pub fn center_step(&self, diagonal_m: f64) -> f64 {
        (self.center_step_fraction * diagonal_m).clamp(self.center_step_min_m, self.center_step_max_m)
    }

    /// Checks that every constant is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::Config(format!("{} must be positive, got {}", name, v)))
            }
        };
        positive("walk_step_m", self.walk_step_m)?;
        positive("center_step_fraction", self.center_step_fraction)?;
        positive("center_step_min_m", self.center_step_min_m)?;
        positive("center_step_max_m", self.center_step_max_m)?;
        positive("justify_pitch_factor", self.justify_pitch_factor)?;
        if self.center_step_min_m > self.center_step_max_m {
            return Err(Error::Config(
                "center_step_min_m exceeds center_step_max_m".into(),
            ));
        }
        if self.justify_pitch_factor > 1.0 {
            return Err(Error::Config(
                "justify_pitch_factor must not exceed 1.0".into(),
            ));
        }
        if self.seed_grid_resolution == 0 {
            return Err(Error::Config("seed_grid_resolution must be at least 1".into()));
        }
        if self
            .optimum_radius_fractions
            .iter()
            .any(|f| !f.is_finite() || *f <= 0.0)
        {
            return Err(Error::Config(
                "optimum_radius_fractions must be positive".into(),
            ));
        }
        if !(self.carport_spacing_fraction.is_finite() && self.carport_spacing_fraction >= 0.0) {
            return Err(Error::Config(
                "carport_spacing_fraction must be non-negative".into(),
            ));
        }
        if !(self.carport_row_spacing_fraction.is_finite() && self.carport_row_spacing_fraction >= 0.0) {
            return Err(Error::Config(
                "carport_row_spacing_fraction must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gap_fill_sweeps, 3);
        assert_eq!(config.optimum_bearings, 8);
    }

    #[test]
    fn test_center_step_clamp() {
        let config = Config::default();
        assert_relative_eq!(config.center_step(20.0), 10.0);
        assert_relative_eq!(config.center_step(48.0), 12.0);
        assert_relative_eq!(config.center_step(400.0), 15.0);
    }

    #[test]
    fn test_builders_and_validation() {
        let config = Config::new()
            .with_walk_step(5.0)
            .with_justify_pitch_factor(0.8)
            .with_gap_fill_sweeps(1);
        assert_relative_eq!(config.walk_step_m, 5.0);
        assert!(config.validate().is_ok());

        assert!(Config::new().with_walk_step(0.0).validate().is_err());
        assert!(Config::new().with_center_step_range(20.0, 10.0).validate().is_err());
        assert!(Config::new().with_justify_pitch_factor(1.5).validate().is_err());
        assert!(Config::new().with_carport_spacing(0.05, -0.1).validate().is_err());
        assert_relative_eq!(Config::default().carport_row_spacing_fraction, 0.2);
        assert!(Config::new()
            .with_optimum_radius_fractions(vec![0.5, -1.0])
            .validate()
            .is_err());
    }
}
