//! Per-boundary geometry prepared once per computation.

use solarpack_core::{
    polygon, Boundary, BoundaryId, GeoPoint, LocalBounds, LocalFrame, LocalPoint, ReasonCode,
};

/// Boundaries with less planar area than this are treated as degenerate.
const MIN_AREA_M2: f64 = 1e-6;

/// A boundary ready for placement: vertex ring, azimuth frame and bounds.
///
/// The planar data is only used to prune candidates cheaply; acceptance is
/// always decided through the geodesic adapter.
#[derive(Debug, Clone)]
pub struct Site {
    id: BoundaryId,
    ring: Vec<GeoPoint>,
    azimuth: f64,
    frame: LocalFrame,
    local_ring: Vec<LocalPoint>,
    bounds: LocalBounds,
}

impl Site {
    /// Prepares a boundary, or returns the reason it cannot hold any unit.
    pub fn prepare(boundary: &Boundary) -> Result<Self, ReasonCode> {
        if !boundary.has_enough_vertices() {
            return Err(ReasonCode::TooFewVertices);
        }
        let frame = boundary.frame();
        let local_ring = boundary.local_ring(&frame);
        let area = polygon::area(&local_ring);
        if !(area > MIN_AREA_M2) {
            return Err(ReasonCode::DegenerateBoundary);
        }
        let bounds = LocalBounds::from_points(&local_ring).ok_or(ReasonCode::TooFewVertices)?;
        Ok(Self {
            id: boundary.id().clone(),
            ring: boundary.vertices().to_vec(),
            azimuth: boundary.azimuth(),
            frame,
            local_ring,
            bounds,
        })
    }

    /// Boundary id.
    pub fn id(&self) -> &BoundaryId {
        &self.id
    }

    /// Geographic vertex ring.
    pub fn ring(&self) -> &[GeoPoint] {
        &self.ring
    }

    /// Installation azimuth in degrees.
    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    /// Planar frame aligned with the azimuth.
    pub fn frame(&self) -> &LocalFrame {
        &self.frame
    }

    /// Vertex ring in the planar frame.
    pub fn local_ring(&self) -> &[LocalPoint] {
        &self.local_ring
    }

    /// Bounds of the ring in the planar frame.
    pub fn bounds(&self) -> &LocalBounds {
        &self.bounds
    }

    /// Diagonal of the planar bounds, metres.
    pub fn diagonal(&self) -> f64 {
        self.bounds.diagonal()
    }

    /// Projects a geographic point into the site frame.
    pub fn to_local(&self, point: GeoPoint) -> LocalPoint {
        self.frame.to_local(point)
    }

    /// Maps a site frame point back to geographic coordinates.
    pub fn to_geo(&self, point: LocalPoint) -> GeoPoint {
        self.frame.to_geo(point)
    }

    /// Cheap planar pre-check: false only if a shape centred at `center`
    /// and reaching `margin` metres cannot touch the boundary.
    pub fn may_contain(&self, center: &LocalPoint, margin: f64) -> bool {
        self.bounds.expand(margin).contains_point(center)
    }
}
