//! Planar polygon helpers operating on local-frame rings.

use nalgebra::Point2;

use crate::transform::LocalPoint;

/// Where a point lies relative to a polygon ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLocation {
    /// Strictly inside, farther than the edge tolerance from every edge.
    Inside,
    /// Within the edge tolerance of an edge or vertex.
    OnEdge,
    /// Strictly outside.
    Outside,
}

impl PointLocation {
    /// Returns true for `Inside` and `OnEdge`.
    pub fn is_contained(self) -> bool {
        !matches!(self, PointLocation::Outside)
    }

    /// Returns true only for `Inside`.
    pub fn is_interior(self) -> bool {
        matches!(self, PointLocation::Inside)
    }
}

/// Signed area of a ring using the shoelace formula (counter-clockwise positive).
pub fn signed_area(ring: &[LocalPoint]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let n = ring.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice / 2.0
}

/// Unsigned area of a ring.
pub fn area(ring: &[LocalPoint]) -> f64 {
    signed_area(ring).abs()
}

/// Area centroid of a ring. Falls back to the vertex mean when the ring has
/// no area.
pub fn centroid(ring: &[LocalPoint]) -> Option<LocalPoint> {
    if ring.is_empty() {
        return None;
    }
    let a = signed_area(ring);
    if a.abs() < 1e-12 {
        return Some(vertex_mean(ring));
    }

    let n = ring.len();
    let (mut cx, mut cy) = (0.0, 0.0);
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    Some(Point2::new(cx / (6.0 * a), cy / (6.0 * a)))
}

/// Arithmetic mean of the ring's vertices.
pub fn vertex_mean(ring: &[LocalPoint]) -> LocalPoint {
    if ring.is_empty() {
        return Point2::origin();
    }
    let sum = ring
        .iter()
        .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
    Point2::from(sum / ring.len() as f64)
}

/// Distance from `p` to the segment `a`–`b`.
pub fn segment_distance(p: &LocalPoint, a: &LocalPoint, b: &LocalPoint) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-18 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Locates `p` relative to `ring` with an edge tolerance in ring units.
pub fn locate(ring: &[LocalPoint], p: &LocalPoint, tolerance: f64) -> PointLocation {
    let n = ring.len();
    if n < 3 {
        return PointLocation::Outside;
    }

    for i in 0..n {
        if segment_distance(p, &ring[i], &ring[(i + 1) % n]) <= tolerance {
            return PointLocation::OnEdge;
        }
    }

    // Even-odd ray casting toward +x.
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pj.x + (p.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    if inside {
        PointLocation::Inside
    } else {
        PointLocation::Outside
    }
}
