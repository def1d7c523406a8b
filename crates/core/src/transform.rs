//! Local planar frames aligned with an installation azimuth.
//!
//! A [`LocalFrame`] maps geographic coordinates onto a plane tangent at an
//! origin point. The +Y axis points along the azimuth (the row axis of a
//! module grid) and the +X axis points along azimuth + 90° (the column axis).
//! The projection is equirectangular on a sphere, which is accurate to well
//! below a millimetre over the extents of a single installation boundary.

use nalgebra::{Point2, Rotation2, Vector2};

use crate::geodesic::{GeoPoint, EARTH_RADIUS_M};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in a local planar frame, in metres.
pub type LocalPoint = Point2<f64>;

/// Metres per degree of arc on the reference sphere.
pub fn meters_per_degree() -> f64 {
    EARTH_RADIUS_M * std::f64::consts::PI / 180.0
}

/// Planar frame centred on `origin` with +Y rotated onto `azimuth`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    origin: GeoPoint,
    azimuth: f64,
    rotation: Rotation2<f64>,
    lng_scale: f64,
}

impl LocalFrame {
    /// Creates a frame at `origin` whose +Y axis points along `azimuth` degrees.
    pub fn new(origin: GeoPoint, azimuth: f64) -> Self {
        let lng_scale = meters_per_degree() * origin.lat.to_radians().cos();
        Self {
            origin,
            azimuth,
            rotation: Rotation2::new(azimuth.to_radians()),
            lng_scale,
        }
    }

    /// Returns the frame origin.
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Returns the frame azimuth in degrees.
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    /// Projects a geographic point into the frame.
    pub fn to_local(&self, point: GeoPoint) -> LocalPoint {
        let east = (point.lng - self.origin.lng) * self.lng_scale;
        let north = (point.lat - self.origin.lat) * meters_per_degree();
        Point2::from(self.rotation * Vector2::new(east, north))
    }

    /// Maps a frame point back to geographic coordinates.
    pub fn to_geo(&self, point: LocalPoint) -> GeoPoint {
        let en = self.rotation.inverse() * point.coords;
        GeoPoint::new(
            self.origin.lat + en.y / meters_per_degree(),
            self.origin.lng + en.x / self.lng_scale,
        )
    }

    /// Projects a sequence of geographic points.
    pub fn to_local_all(&self, points: &[GeoPoint]) -> Vec<LocalPoint> {
        points.iter().map(|p| self.to_local(*p)).collect()
    }
}

/// Axis-aligned bounds in a local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalBounds {
    /// Minimum x coordinate.
    pub min_x: f64,
    /// Minimum y coordinate.
    pub min_y: f64,
    /// Maximum x coordinate.
    pub max_x: f64,
    /// Maximum y coordinate.
    pub max_y: f64,
}

impl LocalBounds {
    /// Creates bounds from min/max coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates bounds enclosing a set of points.
    pub fn from_points(points: &[LocalPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self::new(first.x, first.y, first.x, first.y);
        for p in points.iter().skip(1) {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    /// Extent along the column axis.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Extent along the row axis.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Length of the diagonal.
    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    /// Returns the center point.
    pub fn center(&self) -> LocalPoint {
        Point2::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Checks whether the bounds contain a point (inclusive).
    pub fn contains_point(&self, p: &LocalPoint) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    /// Expands the bounds by a margin on all sides.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn origin() -> GeoPoint {
        GeoPoint::new(40.0, -3.7)
    }

    #[test]
    fn test_north_azimuth_axes() {
        let frame = LocalFrame::new(origin(), 0.0);
        let north = GeoPoint::new(40.0 + 10.0 / meters_per_degree(), -3.7);
        let p = frame.to_local(north);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_south_azimuth_flips_axes() {
        // Facing south: +Y is south, +X is west.
        let frame = LocalFrame::new(origin(), 180.0);
        let north = GeoPoint::new(40.0 + 10.0 / meters_per_degree(), -3.7);
        let p = frame.to_local(north);
        assert_relative_eq!(p.y, -10.0, epsilon = 1e-9);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_east_azimuth() {
        let frame = LocalFrame::new(origin(), 90.0);
        let p = frame.to_geo(Point2::new(0.0, 25.0));
        assert!(p.lng > origin().lng);
        assert_relative_eq!(p.lat, origin().lat, epsilon = 1e-12);
    }

    #[test]
    fn test_roundtrip() {
        let frame = LocalFrame::new(origin(), 203.5);
        let local = Point2::new(12.5, -7.25);
        let back = frame.to_local(frame.to_geo(local));
        assert_relative_eq!(back.x, local.x, epsilon = 1e-9);
        assert_relative_eq!(back.y, local.y, epsilon = 1e-9);
    }

    #[test]
    fn test_bounds() {
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(40.0, 5.0),
            Point2::new(3.0, 30.0),
        ];
        let bounds = LocalBounds::from_points(&points).unwrap();
        assert_relative_eq!(bounds.width(), 40.0);
        assert_relative_eq!(bounds.height(), 30.0);
        assert_relative_eq!(bounds.diagonal(), 50.0);
        assert!(bounds.contains_point(&Point2::new(40.0, 30.0)));
        assert!(!bounds.contains_point(&Point2::new(40.1, 30.0)));
        assert!(bounds.expand(0.5).contains_point(&Point2::new(40.1, 30.0)));
        assert!(LocalBounds::from_points(&[]).is_none());
    }
}
