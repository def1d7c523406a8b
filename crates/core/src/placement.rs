//! Placed units and tables.

use std::fmt;

use crate::boundary::BoundaryId;
use crate::geodesic::GeoPoint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer position on a strategy grid. Rows run along the azimuth,
/// columns along azimuth + 90°.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatticeIndex {
    /// Row index; negative rows lie toward azimuth + 180°.
    pub row: i32,
    /// Column index; negative columns lie toward azimuth − 90°.
    pub col: i32,
}

impl LatticeIndex {
    /// Creates a new index.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Chebyshev distance from the lattice origin.
    pub fn ring(&self) -> u32 {
        self.row.unsigned_abs().max(self.col.unsigned_abs())
    }
}

impl fmt::Display for LatticeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Position of a unit inside its rigid group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MemberIndex {
    /// Row inside the group.
    pub row: u32,
    /// Column inside the group.
    pub col: u32,
}

/// A single placed module.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementUnit {
    /// Center of the module.
    pub center: GeoPoint,
    /// Corners in the order back-left, back-right, front-right, front-left
    /// (back is toward azimuth + 180°).
    pub corners: [GeoPoint; 4],
    /// Boundary the unit belongs to.
    pub boundary_id: BoundaryId,
    /// Owning table, if the unit is part of a rigid group.
    pub table_id: Option<usize>,
    /// Lattice index of the unit, or of its table for grouped units.
    pub index: LatticeIndex,
    /// Position inside the owning table.
    pub member: Option<MemberIndex>,
}

impl PlacementUnit {
    /// Creates an ungrouped unit.
    pub fn new(
        boundary_id: BoundaryId,
        index: LatticeIndex,
        center: GeoPoint,
        corners: [GeoPoint; 4],
    ) -> Self {
        Self {
            center,
            corners,
            boundary_id,
            table_id: None,
            index,
            member: None,
        }
    }

    /// Assigns the unit to a table.
    pub fn with_table(mut self, table_id: usize, member: MemberIndex) -> Self {
        self.table_id = Some(table_id);
        self.member = Some(member);
        self
    }

    /// Returns true if the unit belongs to a table.
    pub fn is_grouped(&self) -> bool {
        self.table_id.is_some()
    }
}

/// A placed rigid group of modules.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TablePlacement {
    /// Table id, unique within one boundary result.
    pub table_id: usize,
    /// Lattice index of the table.
    pub index: LatticeIndex,
    /// Center of the table.
    pub center: GeoPoint,
    /// Number of units on the table.
    pub unit_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_ring() {
        assert_eq!(LatticeIndex::new(0, 0).ring(), 0);
        assert_eq!(LatticeIndex::new(-3, 2).ring(), 3);
        assert_eq!(LatticeIndex::new(1, -4).ring(), 4);
        assert_eq!(LatticeIndex::new(-2, 5).to_string(), "(-2, 5)");
    }

    #[test]
    fn test_lattice_ordering() {
        let mut v = vec![
            LatticeIndex::new(1, 0),
            LatticeIndex::new(-1, 2),
            LatticeIndex::new(-1, -1),
        ];
        v.sort();
        assert_eq!(v[0], LatticeIndex::new(-1, -1));
        assert_eq!(v[2], LatticeIndex::new(1, 0));
    }

    #[test]
    fn test_unit_grouping() {
        let p = GeoPoint::new(0.0, 0.0);
        let unit = PlacementUnit::new("b".into(), LatticeIndex::default(), p, [p; 4]);
        assert!(!unit.is_grouped());
        let grouped = unit.with_table(3, MemberIndex { row: 1, col: 0 });
        assert!(grouped.is_grouped());
        assert_eq!(grouped.table_id, Some(3));
    }
}
