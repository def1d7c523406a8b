//! Alignment origin resolution.
//!
//! Strategies expand their lattice outward from a single origin. The
//! resolver turns an [`AlignmentPolicy`] into that origin: an interior seed
//! near the centroid, optionally walked toward the back, left or right edge
//! of the boundary. `Optimum` scores candidate origins with a caller-supplied
//! dry run and keeps the best.

use nalgebra::Point2;
use solarpack_core::{polygon, AlignmentPolicy, Config, GeoPoint, Geodesic, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::site::Site;

/// A candidate origin for the `Optimum` search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Concrete policy the candidate is scored under.
    pub policy: AlignmentPolicy,
    /// Candidate origin.
    pub origin: GeoPoint,
}

/// Computes lattice origins for a boundary.
pub struct OriginResolver<'a> {
    geodesic: &'a dyn Geodesic,
    config: &'a Config,
}

impl<'a> OriginResolver<'a> {
    /// Creates a resolver.
    pub fn new(geodesic: &'a dyn Geodesic, config: &'a Config) -> Self {
        Self { geodesic, config }
    }

    fn is_interior(&self, site: &Site, point: GeoPoint) -> Result<bool> {
        Ok(self.geodesic.locate(site.ring(), point)?.is_interior())
    }

    /// A point strictly inside the boundary, as close to the centroid as
    /// possible. `None` if no interior point can be found.
    pub fn interior_seed(&self, site: &Site) -> Result<Option<GeoPoint>> {
        let centroid = polygon::centroid(site.local_ring()).unwrap_or_else(Point2::origin);
        let centroid_geo = site.to_geo(centroid);
        if self.is_interior(site, centroid_geo)? {
            return Ok(Some(centroid_geo));
        }

        let mean = site.to_geo(polygon::vertex_mean(site.local_ring()));
        if self.is_interior(site, mean)? {
            return Ok(Some(mean));
        }

        // Concave shapes: nearest interior sample of a grid over the bounds.
        let n = self.config.seed_grid_resolution.max(1);
        let bounds = site.bounds();
        let mut best: Option<(f64, GeoPoint)> = None;
        for i in 0..n {
            for j in 0..n {
                let local = Point2::new(
                    bounds.min_x + bounds.width() * (i as f64 + 0.5) / n as f64,
                    bounds.min_y + bounds.height() * (j as f64 + 0.5) / n as f64,
                );
                let distance = (local - centroid).norm();
                if best.map_or(false, |(d, _)| distance >= d) {
                    continue;
                }
                let geo = site.to_geo(local);
                if self.is_interior(site, geo)? {
                    best = Some((distance, geo));
                }
            }
        }
        Ok(best.map(|(_, p)| p))
    }

    /// Steps from `from` toward `bearing` while the next point stays
    /// strictly inside.
    fn walk(&self, site: &Site, from: GeoPoint, bearing: f64, step: f64) -> Result<GeoPoint> {
        let max_steps = (site.diagonal() / step).ceil() as usize + 1;
        let mut current = from;
        for _ in 0..max_steps {
            let next = self.geodesic.offset(current, step, bearing)?;
            if !self.is_interior(site, next)? {
                break;
            }
            current = next;
        }
        Ok(current)
    }

    /// Origin of a concrete policy. `Optimum` is treated as `Center`; use
    /// [`OriginResolver::search`] for the full search.
    pub fn resolve(&self, site: &Site, policy: AlignmentPolicy) -> Result<Option<GeoPoint>> {
        let Some(seed) = self.interior_seed(site)? else {
            return Ok(None);
        };
        self.resolve_from_seed(site, seed, policy).map(Some)
    }

    fn resolve_from_seed(
        &self,
        site: &Site,
        seed: GeoPoint,
        policy: AlignmentPolicy,
    ) -> Result<GeoPoint> {
        let az = site.azimuth();
        let back = az + 180.0;
        match policy {
            AlignmentPolicy::Justify => Ok(seed),
            AlignmentPolicy::Center | AlignmentPolicy::Optimum => {
                let step = self.config.center_step(site.diagonal());
                self.walk(site, seed, back, step)
            }
            AlignmentPolicy::Left | AlignmentPolicy::Right => {
                let step = self.config.walk_step_m;
                let rear = self.walk(site, seed, back, step)?;
                let side = if policy == AlignmentPolicy::Left {
                    az - 90.0
                } else {
                    az + 90.0
                };
                self.walk(site, rear, side, step)
            }
        }
    }

    /// Candidate origins for the `Optimum` search, in scoring order: for each
    /// concrete policy, its own origin followed by radial samples around the
    /// seed.
    pub fn candidates(&self, site: &Site, max_pitch: f64) -> Result<Vec<Candidate>> {
        let Some(seed) = self.interior_seed(site)? else {
            return Ok(Vec::new());
        };

        let bearings = self.config.optimum_bearings.max(1);
        let mut samples = Vec::new();
        for fraction in &self.config.optimum_radius_fractions {
            for k in 0..bearings {
                let bearing = site.azimuth() + k as f64 * 360.0 / bearings as f64;
                let p = self.geodesic.offset(seed, fraction * max_pitch, bearing)?;
                if self.is_interior(site, p)? {
                    samples.push(p);
                }
            }
        }

        let mut candidates = Vec::with_capacity(4 * (samples.len() + 1));
        for policy in AlignmentPolicy::CONCRETE {
            let origin = self.resolve_from_seed(site, seed, policy)?;
            candidates.push(Candidate { policy, origin });
            candidates.extend(samples.iter().map(|&origin| Candidate { policy, origin }));
        }
        Ok(candidates)
    }

    /// Runs the `Optimum` search. `score` is a count-only dry run; the
    /// highest score wins and ties go to the earliest candidate.
    pub fn search<F>(&self, site: &Site, max_pitch: f64, score: F) -> Result<Option<Candidate>>
    where
        F: Fn(&Candidate) -> Result<usize> + Sync,
    {
        let candidates = self.candidates(site, max_pitch)?;

        #[cfg(feature = "parallel")]
        let scores: Vec<usize> = candidates
            .par_iter()
            .map(|c| score(c))
            .collect::<Result<Vec<_>>>()?;

        #[cfg(not(feature = "parallel"))]
        let scores: Vec<usize> = candidates
            .iter()
            .map(|c| score(c))
            .collect::<Result<Vec<_>>>()?;

        let mut best: Option<(usize, usize)> = None;
        for (i, &s) in scores.iter().enumerate() {
            if best.map_or(true, |(_, b)| s > b) {
                best = Some((i, s));
            }
        }
        if let Some((i, s)) = best {
            log::debug!(
                "optimum for '{}': {:?} candidate {} of {} scoring {}",
                site.id(),
                candidates[i].policy,
                i,
                candidates.len(),
                s
            );
        }
        Ok(best.map(|(i, _)| candidates[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use solarpack_core::{Boundary, SphericalGeodesic};

    fn origin() -> GeoPoint {
        GeoPoint::new(52.52, 13.40)
    }

    fn local_offset(site: &Site, origin: GeoPoint) -> (f64, f64) {
        let p = site.to_local(origin);
        (p.x, p.y)
    }

    fn rect(width: f64, height: f64) -> Site {
        Site::prepare(&Boundary::rectangle("r", origin(), width, height, 180.0)).unwrap()
    }

    #[test]
    fn test_seed_is_centroid_for_convex() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let resolver = OriginResolver::new(&g, &config);
        let site = rect(40.0, 20.0);
        let seed = resolver.interior_seed(&site).unwrap().unwrap();
        let (x, y) = local_offset(&site, seed);
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_seed_for_u_shape() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let resolver = OriginResolver::new(&g, &config);
        // U-shape whose centroid falls in the notch.
        let b = Boundary::from_local(
            "u",
            origin(),
            180.0,
            &[
                (0.0, 0.0),
                (30.0, 0.0),
                (30.0, 30.0),
                (20.0, 30.0),
                (20.0, 5.0),
                (10.0, 5.0),
                (10.0, 30.0),
                (0.0, 30.0),
            ],
        );
        let site = Site::prepare(&b).unwrap();
        let seed = resolver.interior_seed(&site).unwrap().unwrap();
        assert!(g.locate(site.ring(), seed).unwrap().is_interior());
    }

    #[test]
    fn test_center_walk() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let resolver = OriginResolver::new(&g, &config);

        // 40 x 20: the 11.18 m step leaves the box, origin stays at the seed.
        let site = rect(40.0, 20.0);
        let o = resolver.resolve(&site, AlignmentPolicy::Center).unwrap().unwrap();
        let (_, y) = local_offset(&site, o);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);

        // 40 x 60: step 15 m toward the back once (back is -y).
        let site = rect(40.0, 60.0);
        let o = resolver.resolve(&site, AlignmentPolicy::Center).unwrap().unwrap();
        let (x, y) = local_offset(&site, o);
        assert_relative_eq!(x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(y, -15.0, epsilon = 1e-3);
    }

    #[test]
    fn test_left_right_walk() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let resolver = OriginResolver::new(&g, &config);
        let site = rect(45.0, 25.0);

        let left = resolver.resolve(&site, AlignmentPolicy::Left).unwrap().unwrap();
        let (x, y) = local_offset(&site, left);
        assert_relative_eq!(x, -20.0, epsilon = 1e-3);
        assert_relative_eq!(y, -10.0, epsilon = 1e-3);

        let right = resolver.resolve(&site, AlignmentPolicy::Right).unwrap().unwrap();
        let (x, _) = local_offset(&site, right);
        assert_relative_eq!(x, 20.0, epsilon = 1e-3);

        let justify = resolver.resolve(&site, AlignmentPolicy::Justify).unwrap().unwrap();
        let (x, y) = local_offset(&site, justify);
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_candidates_and_search() {
        let g = SphericalGeodesic::new();
        let config = Config::default();
        let resolver = OriginResolver::new(&g, &config);
        let site = rect(40.0, 20.0);

        let candidates = resolver.candidates(&site, 2.0).unwrap();
        // 4 radii x 8 bearings, all inside, plus each policy's own origin.
        assert_eq!(candidates.len(), 4 * 33);
        assert_eq!(candidates[0].policy, AlignmentPolicy::Left);
        assert_eq!(candidates[33].policy, AlignmentPolicy::Right);

        // Score by distance to the right edge: the Right origin wins.
        let best = resolver
            .search(&site, 2.0, |c| {
                let (x, _) = local_offset(&site, c.origin);
                Ok((x + 100.0) as usize)
            })
            .unwrap()
            .unwrap();
        assert_eq!(best.policy, AlignmentPolicy::Right);

        // Constant score: the first candidate wins.
        let first = resolver.search(&site, 2.0, |_| Ok(7)).unwrap().unwrap();
        assert_eq!(first, candidates[0]);
    }
}
