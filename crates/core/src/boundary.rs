//! Installation boundaries drawn on the map.

use nalgebra::Point2;

use crate::geodesic::{normalize_bearing, GeoPoint};
use crate::polygon;
use crate::transform::{LocalBounds, LocalFrame, LocalPoint};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a boundary.
pub type BoundaryId = String;

/// Default azimuth: modules facing south.
pub const DEFAULT_AZIMUTH: f64 = 180.0;

/// A user-drawn simple polygon in which modules may be placed.
///
/// The planar area is cached and refreshed on every mutation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Boundary {
    id: BoundaryId,
    vertices: Vec<GeoPoint>,
    azimuth: f64,
    area_m2: f64,
}

impl Boundary {
    /// Creates a boundary facing the default azimuth.
    pub fn new(id: impl Into<BoundaryId>, vertices: Vec<GeoPoint>) -> Self {
        Self::with_azimuth(id, vertices, DEFAULT_AZIMUTH)
    }

    /// Creates a boundary facing `azimuth` degrees.
    pub fn with_azimuth(id: impl Into<BoundaryId>, vertices: Vec<GeoPoint>, azimuth: f64) -> Self {
        let mut boundary = Self {
            id: id.into(),
            vertices,
            azimuth: normalize_bearing(azimuth),
            area_m2: 0.0,
        };
        boundary.refresh_area();
        boundary
    }

    /// Creates a rectangle centred on `center`, `width` metres across the
    /// azimuth and `height` metres along it.
    pub fn rectangle(
        id: impl Into<BoundaryId>,
        center: GeoPoint,
        width: f64,
        height: f64,
        azimuth: f64,
    ) -> Self {
        let frame = LocalFrame::new(center, azimuth);
        let (hw, hh) = (width / 2.0, height / 2.0);
        let vertices = [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)]
            .iter()
            .map(|&(x, y)| frame.to_geo(Point2::new(x, y)))
            .collect();
        Self::with_azimuth(id, vertices, azimuth)
    }

    /// Creates a polygon from local `(x, y)` offsets in metres around `origin`.
    pub fn from_local(
        id: impl Into<BoundaryId>,
        origin: GeoPoint,
        azimuth: f64,
        points: &[(f64, f64)],
    ) -> Self {
        let frame = LocalFrame::new(origin, azimuth);
        let vertices = points
            .iter()
            .map(|&(x, y)| frame.to_geo(Point2::new(x, y)))
            .collect();
        Self::with_azimuth(id, vertices, azimuth)
    }

    /// Returns the boundary id.
    pub fn id(&self) -> &BoundaryId {
        &self.id
    }

    /// Returns the vertex ring.
    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    /// Returns the azimuth in degrees.
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    /// Returns the cached planar area in square metres.
    pub fn area(&self) -> f64 {
        self.area_m2
    }

    /// Replaces the whole vertex ring.
    pub fn set_vertices(&mut self, vertices: Vec<GeoPoint>) {
        self.vertices = vertices;
        self.refresh_area();
    }

    /// Moves a single vertex, as when the user drags it on the map.
    pub fn move_vertex(&mut self, index: usize, to: GeoPoint) -> Result<()> {
        let slot = self.vertices.get_mut(index).ok_or_else(|| {
            Error::InvalidBoundary(format!("vertex {} does not exist", index))
        })?;
        *slot = to;
        self.refresh_area();
        Ok(())
    }

    /// Changes the azimuth.
    pub fn set_azimuth(&mut self, azimuth: f64) {
        self.azimuth = normalize_bearing(azimuth);
        self.refresh_area();
    }

    /// Returns true if the boundary has enough vertices to be placeable.
    pub fn has_enough_vertices(&self) -> bool {
        self.vertices.len() >= 3
    }

    /// Validates vertex count and coordinates.
    pub fn validate(&self) -> Result<()> {
        if !self.has_enough_vertices() {
            return Err(Error::InvalidBoundary(format!(
                "boundary '{}' has {} vertices, at least 3 required",
                self.id,
                self.vertices.len()
            )));
        }
        if let Some(bad) = self.vertices.iter().find(|p| !p.is_valid()) {
            return Err(Error::InvalidBoundary(format!(
                "boundary '{}' has invalid vertex ({}, {})",
                self.id, bad.lat, bad.lng
            )));
        }
        if !self.azimuth.is_finite() {
            return Err(Error::InvalidBoundary(format!(
                "boundary '{}' has a non-finite azimuth",
                self.id
            )));
        }
        Ok(())
    }

    /// Mean of the vertices; used as the origin of local frames.
    pub fn vertex_mean(&self) -> GeoPoint {
        if self.vertices.is_empty() {
            return GeoPoint::default();
        }
        let n = self.vertices.len() as f64;
        let (lat, lng) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |acc, p| (acc.0 + p.lat, acc.1 + p.lng));
        GeoPoint::new(lat / n, lng / n)
    }

    /// Local frame at the vertex mean aligned with the boundary azimuth.
    pub fn frame(&self) -> LocalFrame {
        LocalFrame::new(self.vertex_mean(), self.azimuth)
    }

    /// Vertex ring projected into `frame`.
    pub fn local_ring(&self, frame: &LocalFrame) -> Vec<LocalPoint> {
        frame.to_local_all(&self.vertices)
    }

    /// Bounds of the ring in `frame`.
    pub fn local_bounds(&self, frame: &LocalFrame) -> Option<LocalBounds> {
        LocalBounds::from_points(&self.local_ring(frame))
    }

    fn refresh_area(&mut self) {
        self.area_m2 = if self.vertices.len() < 3 {
            0.0
        } else {
            polygon::area(&self.local_ring(&self.frame()))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn origin() -> GeoPoint {
        GeoPoint::new(-33.87, 151.21)
    }

    #[test]
    fn test_rectangle_area_and_bounds() {
        let b = Boundary::rectangle("r", origin(), 40.0, 20.0, 180.0);
        assert_relative_eq!(b.area(), 800.0, epsilon = 1e-6);
        let bounds = b.local_bounds(&b.frame()).unwrap();
        assert_relative_eq!(bounds.width(), 40.0, epsilon = 1e-6);
        assert_relative_eq!(bounds.height(), 20.0, epsilon = 1e-6);
    }

    #[test]
    fn test_area_refreshes_on_edit() {
        let mut b = Boundary::from_local(
            "tri",
            origin(),
            180.0,
            &[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)],
        );
        assert_relative_eq!(b.area(), 50.0, max_relative = 1e-6);

        // The boundary frame moves with the vertex mean, so use a fixed one.
        let fixed = LocalFrame::new(origin(), 180.0);
        let target = fixed.to_geo(Point2::new(0.0, 20.0));
        b.move_vertex(2, target).unwrap();
        assert_relative_eq!(b.area(), 100.0, max_relative = 1e-6);

        assert!(b.move_vertex(7, target).is_err());

        b.set_vertices(vec![origin()]);
        assert_eq!(b.area(), 0.0);
    }

    #[test]
    fn test_set_azimuth_normalizes() {
        let mut b = Boundary::rectangle("r", origin(), 10.0, 10.0, 180.0);
        b.set_azimuth(-90.0);
        assert_relative_eq!(b.azimuth(), 270.0);
        assert_relative_eq!(b.area(), 100.0, epsilon = 1e-6);
    }

    #[test]
    fn test_validate() {
        let b = Boundary::rectangle("r", origin(), 10.0, 10.0, 180.0);
        assert!(b.validate().is_ok());

        let short = Boundary::new("s", vec![origin(), origin()]);
        assert!(!short.has_enough_vertices());
        assert!(short.validate().is_err());

        let bad = Boundary::new(
            "b",
            vec![origin(), GeoPoint::new(f64::NAN, 0.0), origin()],
        );
        assert!(bad.validate().is_err());
    }
}
