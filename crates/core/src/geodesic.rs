//! Geodesic coordinate adapter.
//!
//! The packing engine never does geometry on raw latitude/longitude pairs
//! itself. Everything goes through the [`Geodesic`] capability, which the
//! host may replace with any spherical or ellipsoidal library.
//! [`SphericalGeodesic`] is the built-in implementation.

use crate::polygon::{self, PointLocation};
use crate::transform::{LocalFrame, LocalPoint};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mean radius used by the spherical model, in metres.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Distance within which a point is considered to touch a boundary edge.
pub const EDGE_TOLERANCE_M: f64 = 1e-3;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a new point.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns true if both coordinates are finite and within range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Normalizes a bearing into `[0, 360)`.
pub fn normalize_bearing(bearing: f64) -> f64 {
    let b = bearing % 360.0;
    if b < 0.0 {
        b + 360.0
    } else {
        b
    }
}

/// Geodesic capability injected into the engine.
///
/// `offset` and `distance` work directly on geographic coordinates;
/// `project`/`unproject` use a local planar approximation and are meant for
/// bounding computations, not for positioning units.
pub trait Geodesic: Send + Sync {
    /// Destination reached from `from` after `distance_m` metres on `bearing` degrees.
    fn offset(&self, from: GeoPoint, distance_m: f64, bearing: f64) -> Result<GeoPoint>;

    /// Great-circle distance between two points in metres.
    fn distance(&self, a: GeoPoint, b: GeoPoint) -> Result<f64>;

    /// Initial bearing from `a` toward `b` in degrees `[0, 360)`.
    fn bearing(&self, a: GeoPoint, b: GeoPoint) -> Result<f64>;

    /// Locates `point` relative to a closed ring.
    fn locate(&self, ring: &[GeoPoint], point: GeoPoint) -> Result<PointLocation>;

    /// Planar area of a ring in square metres.
    fn area(&self, ring: &[GeoPoint]) -> Result<f64>;

    /// Returns true if `point` is inside the ring or touches its edge.
    fn contains(&self, ring: &[GeoPoint], point: GeoPoint) -> Result<bool> {
        Ok(self.locate(ring, point)?.is_contained())
    }

    /// Projects `point` into the frame at `origin` with +Y along `azimuth`.
    fn project(&self, point: GeoPoint, origin: GeoPoint, azimuth: f64) -> Result<LocalPoint> {
        Ok(LocalFrame::new(origin, azimuth).to_local(point))
    }

    /// Inverse of [`Geodesic::project`].
    fn unproject(&self, local: LocalPoint, origin: GeoPoint, azimuth: f64) -> Result<GeoPoint> {
        Ok(LocalFrame::new(origin, azimuth).to_geo(local))
    }
}

/// Spherical-earth implementation of [`Geodesic`].
#[derive(Debug, Clone, Copy)]
pub struct SphericalGeodesic {
    radius_m: f64,
    edge_tolerance_m: f64,
}

impl SphericalGeodesic {
    /// Creates an adapter with the default radius and edge tolerance.
    pub fn new() -> Self {
        Self {
            radius_m: EARTH_RADIUS_M,
            edge_tolerance_m: EDGE_TOLERANCE_M,
        }
    }

    /// Sets the edge tolerance used by [`Geodesic::locate`].
    pub fn with_edge_tolerance(mut self, tolerance_m: f64) -> Self {
        self.edge_tolerance_m = tolerance_m.max(0.0);
        self
    }

    fn check(point: GeoPoint) -> Result<()> {
        if point.is_valid() {
            Ok(())
        } else {
            Err(Error::Geodesic(format!(
                "coordinate out of range: ({}, {})",
                point.lat, point.lng
            )))
        }
    }
}

impl Default for SphericalGeodesic {
    fn default() -> Self {
        Self::new()
    }
}

impl Geodesic for SphericalGeodesic {
    fn offset(&self, from: GeoPoint, distance_m: f64, bearing: f64) -> Result<GeoPoint> {
        Self::check(from)?;
        if !distance_m.is_finite() || !bearing.is_finite() {
            return Err(Error::Geodesic("non-finite offset".into()));
        }
        if distance_m == 0.0 {
            return Ok(from);
        }

        let delta = distance_m / self.radius_m;
        let theta = bearing.to_radians();
        let phi1 = from.lat.to_radians();
        let lambda1 = from.lng.to_radians();

        let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos();
        let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
        let y = theta.sin() * delta.sin() * phi1.cos();
        let x = delta.cos() - phi1.sin() * sin_phi2;
        let lambda2 = lambda1 + y.atan2(x);

        let lng = (lambda2.to_degrees() + 540.0) % 360.0 - 180.0;
        Ok(GeoPoint::new(phi2.to_degrees(), lng))
    }

    fn distance(&self, a: GeoPoint, b: GeoPoint) -> Result<f64> {
        Self::check(a)?;
        Self::check(b)?;
        let phi1 = a.lat.to_radians();
        let phi2 = b.lat.to_radians();
        let d_phi = phi2 - phi1;
        let d_lambda = (b.lng - a.lng).to_radians();

        let h = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        Ok(2.0 * self.radius_m * h.sqrt().clamp(0.0, 1.0).asin())
    }

    fn bearing(&self, a: GeoPoint, b: GeoPoint) -> Result<f64> {
        Self::check(a)?;
        Self::check(b)?;
        let phi1 = a.lat.to_radians();
        let phi2 = b.lat.to_radians();
        let d_lambda = (b.lng - a.lng).to_radians();

        let y = d_lambda.sin() * phi2.cos();
        let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
        Ok(normalize_bearing(y.atan2(x).to_degrees()))
    }

    fn locate(&self, ring: &[GeoPoint], point: GeoPoint) -> Result<PointLocation> {
        Self::check(point)?;
        if ring.len() < 3 {
            return Ok(PointLocation::Outside);
        }
        // Test in a north-up frame centred on the point itself so the
        // tolerance is in metres and distortion is smallest where it matters.
        let frame = LocalFrame::new(point, 0.0);
        let local = frame.to_local_all(ring);
        Ok(polygon::locate(
            &local,
            &LocalPoint::origin(),
            self.edge_tolerance_m,
        ))
    }

    fn area(&self, ring: &[GeoPoint]) -> Result<f64> {
        if ring.len() < 3 {
            return Ok(0.0);
        }
        for p in ring {
            Self::check(*p)?;
        }
        let frame = LocalFrame::new(ring[0], 0.0);
        Ok(polygon::area(&frame.to_local_all(ring)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn madrid() -> GeoPoint {
        GeoPoint::new(40.4168, -3.7038)
    }

    #[test]
    fn test_offset_distance_agree() {
        let g = SphericalGeodesic::new();
        for bearing in [0.0, 45.0, 90.0, 180.0, 271.5] {
            let p = g.offset(madrid(), 125.0, bearing).unwrap();
            assert_relative_eq!(g.distance(madrid(), p).unwrap(), 125.0, epsilon = 1e-6);
            let back = g.bearing(madrid(), p).unwrap();
            assert_relative_eq!(normalize_bearing(back - bearing + 180.0), 180.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_offset_zero_distance() {
        let g = SphericalGeodesic::new();
        assert_eq!(g.offset(madrid(), 0.0, 33.0).unwrap(), madrid());
    }

    #[test]
    fn test_offset_rejects_invalid() {
        let g = SphericalGeodesic::new();
        assert!(g.offset(GeoPoint::new(f64::NAN, 0.0), 1.0, 0.0).is_err());
        assert!(g.offset(madrid(), f64::INFINITY, 0.0).is_err());
        assert!(g.distance(madrid(), GeoPoint::new(95.0, 0.0)).is_err());
    }

    #[test]
    fn test_project_matches_offset() {
        let g = SphericalGeodesic::new();
        let p = g.offset(madrid(), 30.0, 180.0).unwrap();
        let local = g.project(p, madrid(), 180.0).unwrap();
        assert_relative_eq!(local.y, 30.0, epsilon = 1e-4);
        assert_relative_eq!(local.x, 0.0, epsilon = 1e-4);
        let back = g.unproject(local, madrid(), 180.0).unwrap();
        assert_relative_eq!(back.lat, p.lat, epsilon = 1e-10);
    }

    #[test]
    fn test_locate_and_area() {
        let g = SphericalGeodesic::new();
        let c = madrid();
        let n = g.offset(c, 10.0, 0.0).unwrap();
        let s = g.offset(c, 10.0, 180.0).unwrap();
        let ring = vec![
            g.offset(n, 20.0, 270.0).unwrap(),
            g.offset(n, 20.0, 90.0).unwrap(),
            g.offset(s, 20.0, 90.0).unwrap(),
            g.offset(s, 20.0, 270.0).unwrap(),
        ];
        assert_relative_eq!(g.area(&ring).unwrap(), 800.0, epsilon = 1e-2);
        assert_eq!(g.locate(&ring, c).unwrap(), PointLocation::Inside);
        assert_eq!(g.locate(&ring, n).unwrap(), PointLocation::OnEdge);
        let outside = g.offset(c, 10.5, 0.0).unwrap();
        assert_eq!(g.locate(&ring, outside).unwrap(), PointLocation::Outside);
        assert!(g.contains(&ring, n).unwrap());
        assert_eq!(g.locate(&ring[..2], c).unwrap(), PointLocation::Outside);
    }

    #[test]
    fn test_normalize_bearing() {
        assert_relative_eq!(normalize_bearing(-90.0), 270.0);
        assert_relative_eq!(normalize_bearing(450.0), 90.0);
        assert_relative_eq!(normalize_bearing(0.0), 0.0);
    }
}
