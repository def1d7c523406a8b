//! Accept/reject rules for candidate units, tables and blocks.

use solarpack_core::{AlignmentPolicy, GeoPoint, Geodesic, Result, Topology};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Containment rule applied to every candidate of one computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContainmentRule {
    /// Center inside and no corner outside. Touching the edge is allowed.
    FreeForm,
    /// Every member unit has all four corners inside.
    AllMembersInside,
    /// Center inside and at least `n` of the four corners inside.
    CornerQuorum(u8),
}

impl ContainmentRule {
    /// Selects the rule for a topology under a concrete alignment policy.
    pub fn select(topology: &Topology, alignment: AlignmentPolicy) -> Self {
        match topology {
            Topology::Ungrouped { free_form: true, .. } => ContainmentRule::FreeForm,
            Topology::Ungrouped { .. } => match alignment {
                AlignmentPolicy::Justify => ContainmentRule::CornerQuorum(4),
                _ => ContainmentRule::CornerQuorum(3),
            },
            Topology::FixedTable { .. } => ContainmentRule::AllMembersInside,
            Topology::Carport {
                force_rectangle: false,
                ..
            } => ContainmentRule::AllMembersInside,
            Topology::Carport { .. } => match alignment {
                AlignmentPolicy::Left | AlignmentPolicy::Right => ContainmentRule::CornerQuorum(2),
                _ => ContainmentRule::CornerQuorum(3),
            },
        }
    }
}

/// Evaluates a [`ContainmentRule`] against one boundary ring.
pub struct ContainmentEvaluator<'a> {
    geodesic: &'a dyn Geodesic,
    ring: &'a [GeoPoint],
    rule: ContainmentRule,
}

impl<'a> ContainmentEvaluator<'a> {
    /// Creates an evaluator.
    pub fn new(geodesic: &'a dyn Geodesic, ring: &'a [GeoPoint], rule: ContainmentRule) -> Self {
        Self {
            geodesic,
            ring,
            rule,
        }
    }

    /// The rule being applied.
    pub fn rule(&self) -> ContainmentRule {
        self.rule
    }

    /// Accepts a single rectangle (a unit, or a carport block outline).
    pub fn accepts(&self, center: GeoPoint, corners: &[GeoPoint; 4]) -> Result<bool> {
        match self.rule {
            ContainmentRule::AllMembersInside => self.all_corners_inside(corners),
            ContainmentRule::FreeForm => {
                if !self.geodesic.contains(self.ring, center)? {
                    return Ok(false);
                }
                self.all_corners_inside(corners)
            }
            ContainmentRule::CornerQuorum(n) => {
                if !self.geodesic.contains(self.ring, center)? {
                    return Ok(false);
                }
                let needed = n.min(4) as usize;
                let mut inside = 0;
                for (i, corner) in corners.iter().enumerate() {
                    if self.geodesic.contains(self.ring, *corner)? {
                        inside += 1;
                    }
                    // Not enough corners left to reach the quorum.
                    if inside + (3 - i) < needed {
                        return Ok(false);
                    }
                }
                Ok(inside >= needed)
            }
        }
    }

    /// Accepts a rigid group only if every member is accepted.
    pub fn accepts_all(&self, members: &[(GeoPoint, [GeoPoint; 4])]) -> Result<bool> {
        for (center, corners) in members {
            if !self.accepts(*center, corners)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn all_corners_inside(&self, corners: &[GeoPoint; 4]) -> Result<bool> {
        for corner in corners {
            if !self.geodesic.contains(self.ring, *corner)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::{offset_local, rect_corners};
    use solarpack_core::{Boundary, SphericalGeodesic};

    fn origin() -> GeoPoint {
        GeoPoint::new(35.68, 139.69)
    }

    fn ungrouped(free_form: bool) -> Topology {
        Topology::Ungrouped {
            adjacent_gap: 0.0,
            row_spacing: 0.0,
            free_form,
        }
    }

    #[test]
    fn test_rule_selection() {
        use AlignmentPolicy::*;
        assert_eq!(ContainmentRule::select(&ungrouped(true), Justify), ContainmentRule::FreeForm);
        assert_eq!(ContainmentRule::select(&ungrouped(false), Center), ContainmentRule::CornerQuorum(3));
        assert_eq!(ContainmentRule::select(&ungrouped(false), Justify), ContainmentRule::CornerQuorum(4));

        let carport = Topology::Carport {
            rows: 2,
            modules_per_row: 4,
            force_rectangle: true,
            module_gap: 0.0,
        };
        assert_eq!(ContainmentRule::select(&carport, Left), ContainmentRule::CornerQuorum(2));
        assert_eq!(ContainmentRule::select(&carport, Center), ContainmentRule::CornerQuorum(3));

        let carport_rows = Topology::Carport {
            rows: 2,
            modules_per_row: 4,
            force_rectangle: false,
            module_gap: 0.0,
        };
        assert_eq!(ContainmentRule::select(&carport_rows, Left), ContainmentRule::AllMembersInside);
        assert_eq!(ContainmentRule::select(&carport_rows, Center), ContainmentRule::AllMembersInside);

        let table = Topology::FixedTable {
            rows_per_table: 2,
            modules_per_row: 2,
            inter_table_spacing_x: 1.0,
            inter_table_spacing_y: 1.0,
            module_gap: 0.0,
            row_gap: 0.0,
        };
        assert_eq!(ContainmentRule::select(&table, Right), ContainmentRule::AllMembersInside);
    }

    /// Unit of 2 x 1 m whose right edge overhangs a 10 x 10 m square by `overhang` metres.
    fn unit_at_right_edge(g: &SphericalGeodesic, overhang: f64) -> (GeoPoint, [GeoPoint; 4]) {
        let center = offset_local(g, origin(), 180.0, 4.0 + overhang, 0.0).unwrap();
        let corners = rect_corners(g, center, 180.0, 2.0, 1.0).unwrap();
        (center, corners)
    }

    #[test]
    fn test_corner_quorum() {
        let g = SphericalGeodesic::new();
        let square = Boundary::rectangle("sq", origin(), 10.0, 10.0, 180.0);
        let quorum3 = ContainmentEvaluator::new(&g, square.vertices(), ContainmentRule::CornerQuorum(3));
        let quorum2 = ContainmentEvaluator::new(&g, square.vertices(), ContainmentRule::CornerQuorum(2));

        // Flush with the edge: all corners touch or lie inside.
        let (c, corners) = unit_at_right_edge(&g, 0.0);
        assert!(quorum3.accepts(c, &corners).unwrap());

        // Overhanging by half a metre: two corners outside.
        let (c, corners) = unit_at_right_edge(&g, 0.5);
        assert!(!quorum3.accepts(c, &corners).unwrap());
        assert!(quorum2.accepts(c, &corners).unwrap());

        // Center outside always rejects.
        let (c, corners) = unit_at_right_edge(&g, 1.5);
        assert!(!quorum2.accepts(c, &corners).unwrap());
    }

    #[test]
    fn test_free_form_and_members() {
        let g = SphericalGeodesic::new();
        let square = Boundary::rectangle("sq", origin(), 10.0, 10.0, 180.0);
        let free = ContainmentEvaluator::new(&g, square.vertices(), ContainmentRule::FreeForm);
        let strict = ContainmentEvaluator::new(&g, square.vertices(), ContainmentRule::AllMembersInside);

        let flush = unit_at_right_edge(&g, 0.0);
        let over = unit_at_right_edge(&g, 0.01);
        assert!(free.accepts(flush.0, &flush.1).unwrap());
        assert!(!free.accepts(over.0, &over.1).unwrap());

        assert!(strict.accepts_all(&[flush]).unwrap());
        assert!(!strict.accepts_all(&[flush, over]).unwrap());
        assert_eq!(strict.rule(), ContainmentRule::AllMembersInside);
    }
}
