//! Azimuth-aligned placement lattices.
//!
//! Every position is derived from the lattice origin with geodesic offsets:
//! first along the row axis (the azimuth), then along the column axis
//! (azimuth + 90°). Corner points are likewise offsets from the center, so
//! no placement depends on the planar approximation.

use nalgebra::Vector2;
use solarpack_core::{GeoPoint, Geodesic, LatticeIndex, LocalPoint, Result};

/// Geodesic offset of `from` by a planar displacement `(dx, dy)` expressed
/// in the frame of `azimuth` (+Y along the azimuth, +X at azimuth + 90°).
pub fn offset_local(
    geodesic: &dyn Geodesic,
    from: GeoPoint,
    azimuth: f64,
    dx: f64,
    dy: f64,
) -> Result<GeoPoint> {
    let distance = dx.hypot(dy);
    if distance == 0.0 {
        return Ok(from);
    }
    let bearing = azimuth + dx.atan2(dy).to_degrees();
    geodesic.offset(from, distance, bearing)
}

/// Corners of an azimuth-aligned rectangle centred on `center`, in the order
/// back-left, back-right, front-right, front-left.
pub fn rect_corners(
    geodesic: &dyn Geodesic,
    center: GeoPoint,
    azimuth: f64,
    width: f64,
    height: f64,
) -> Result<[GeoPoint; 4]> {
    let (hw, hh) = (width / 2.0, height / 2.0);
    Ok([
        offset_local(geodesic, center, azimuth, -hw, -hh)?,
        offset_local(geodesic, center, azimuth, hw, -hh)?,
        offset_local(geodesic, center, azimuth, hw, hh)?,
        offset_local(geodesic, center, azimuth, -hw, hh)?,
    ])
}

/// Regular grid anchored at a geographic origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    origin: GeoPoint,
    azimuth: f64,
    row_pitch: f64,
    col_pitch: f64,
}

impl Lattice {
    /// Creates a lattice with the given row (along azimuth) and column pitches.
    pub fn new(origin: GeoPoint, azimuth: f64, row_pitch: f64, col_pitch: f64) -> Self {
        Self {
            origin,
            azimuth,
            row_pitch,
            col_pitch,
        }
    }

    /// Lattice origin.
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Pitch between rows.
    pub fn row_pitch(&self) -> f64 {
        self.row_pitch
    }

    /// Pitch between columns.
    pub fn col_pitch(&self) -> f64 {
        self.col_pitch
    }

    /// Smaller of the two pitches.
    pub fn min_pitch(&self) -> f64 {
        self.row_pitch.min(self.col_pitch)
    }

    /// Geographic center of a lattice position.
    pub fn center(&self, geodesic: &dyn Geodesic, index: LatticeIndex) -> Result<GeoPoint> {
        let along = offset_local(
            geodesic,
            self.origin,
            self.azimuth,
            0.0,
            index.row as f64 * self.row_pitch,
        )?;
        offset_local(
            geodesic,
            along,
            self.azimuth,
            index.col as f64 * self.col_pitch,
            0.0,
        )
    }

    /// Approximate planar position of a lattice index, given the origin's
    /// position in an azimuth-aligned frame.
    pub fn planar(&self, origin: &LocalPoint, index: LatticeIndex) -> LocalPoint {
        origin
            + Vector2::new(
                index.col as f64 * self.col_pitch,
                index.row as f64 * self.row_pitch,
            )
    }

    /// Number of rings needed to cover a region of the given diagonal.
    pub fn ring_bound(&self, diagonal: f64) -> u32 {
        (diagonal / self.min_pitch()).ceil().max(0.0) as u32
    }
}

/// Offsets of the members of a rigid `rows × cols` group from its center.
pub fn member_offsets(rows: u32, cols: u32, row_pitch: f64, col_pitch: f64) -> Vec<(u32, u32, f64, f64)> {
    let row_mid = (rows as f64 - 1.0) / 2.0;
    let col_mid = (cols as f64 - 1.0) / 2.0;
    let mut offsets = Vec::with_capacity(rows as usize * cols as usize);
    for r in 0..rows {
        for c in 0..cols {
            offsets.push((
                r,
                c,
                (c as f64 - col_mid) * col_pitch,
                (r as f64 - row_mid) * row_pitch,
            ));
        }
    }
    offsets
}

/// Indices at Chebyshev distance `k` from the origin, ordered by row then
/// column.
pub fn ring(k: u32) -> Vec<LatticeIndex> {
    let k = k as i32;
    if k == 0 {
        return vec![LatticeIndex::new(0, 0)];
    }
    let mut indices = Vec::with_capacity(8 * k as usize);
    for row in -k..=k {
        if row.abs() == k {
            indices.extend((-k..=k).map(|col| LatticeIndex::new(row, col)));
        } else {
            indices.push(LatticeIndex::new(row, -k));
            indices.push(LatticeIndex::new(row, k));
        }
    }
    indices
}

/// Planar footprint extent of a rigid group: `n` items of size `size`
/// separated by `gap`.
pub fn group_extent(n: u32, size: f64, gap: f64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    n as f64 * size + (n as f64 - 1.0) * gap
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point2;
    use solarpack_core::{LocalFrame, SphericalGeodesic};

    fn origin() -> GeoPoint {
        GeoPoint::new(-23.55, -46.63)
    }

    #[test]
    fn test_ring_enumeration() {
        assert_eq!(ring(0), vec![LatticeIndex::new(0, 0)]);
        let r1 = ring(1);
        assert_eq!(r1.len(), 8);
        assert_eq!(r1[0], LatticeIndex::new(-1, -1));
        assert_eq!(r1[7], LatticeIndex::new(1, 1));
        for k in 1..6 {
            let r = ring(k);
            assert_eq!(r.len(), 8 * k as usize);
            assert!(r.iter().all(|i| i.ring() == k));
            let mut sorted = r.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted, r);
        }
    }

    #[test]
    fn test_lattice_center_matches_planar() {
        let g = SphericalGeodesic::new();
        let azimuth = 157.0;
        let lattice = Lattice::new(origin(), azimuth, 1.5, 2.25);
        let frame = LocalFrame::new(origin(), azimuth);
        for index in [
            LatticeIndex::new(0, 0),
            LatticeIndex::new(3, -2),
            LatticeIndex::new(-7, 11),
        ] {
            let center = lattice.center(&g, index).unwrap();
            let local = frame.to_local(center);
            let planar = lattice.planar(&Point2::origin(), index);
            assert_relative_eq!(local.x, planar.x, epsilon = 1e-4);
            assert_relative_eq!(local.y, planar.y, epsilon = 1e-4);
        }
        assert_relative_eq!(lattice.min_pitch(), 1.5);
        assert_eq!(lattice.ring_bound(15.0), 10);
    }

    #[test]
    fn test_rect_corners() {
        let g = SphericalGeodesic::new();
        let azimuth = 200.0;
        let corners = rect_corners(&g, origin(), azimuth, 2.0, 1.0).unwrap();
        let frame = LocalFrame::new(origin(), azimuth);
        let expected = [(-1.0, -0.5), (1.0, -0.5), (1.0, 0.5), (-1.0, 0.5)];
        for (corner, (x, y)) in corners.iter().zip(expected) {
            let p = frame.to_local(*corner);
            assert_relative_eq!(p.x, x, epsilon = 1e-6);
            assert_relative_eq!(p.y, y, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_member_offsets() {
        let offsets = member_offsets(2, 3, 1.0, 2.0);
        assert_eq!(offsets.len(), 6);
        assert_eq!(offsets[0], (0, 0, -2.0, -0.5));
        assert_eq!(offsets[5], (1, 2, 2.0, 0.5));
        assert_relative_eq!(group_extent(5, 2.0, 0.1), 10.4);
        assert_eq!(group_extent(0, 2.0, 0.1), 0.0);
    }
}
