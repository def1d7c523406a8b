//! Mounting topologies, alignment policies and structure presets.

use crate::footprint::Orientation;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mounting discipline governing how units are grouped.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Topology {
    /// Individually placed units on a regular grid.
    Ungrouped {
        /// Gap between adjacent units in a row, metres.
        adjacent_gap: f64,
        /// Spacing between rows, metres.
        row_spacing: f64,
        /// Free-form flat structures tolerate corners touching the edge
        /// instead of using the corner-count rule.
        #[cfg_attr(feature = "serde", serde(default))]
        free_form: bool,
    },
    /// Rigid `rows_per_table × modules_per_row` tables.
    FixedTable {
        /// Unit rows per table.
        rows_per_table: u32,
        /// Units per table row.
        modules_per_row: u32,
        /// Spacing between tables across the azimuth, metres.
        inter_table_spacing_x: f64,
        /// Spacing between tables along the azimuth, metres.
        inter_table_spacing_y: f64,
        /// Gap between units inside a table row, metres.
        #[cfg_attr(feature = "serde", serde(default))]
        module_gap: f64,
        /// Gap between unit rows inside a table, metres.
        #[cfg_attr(feature = "serde", serde(default))]
        row_gap: f64,
    },
    /// Carport canopy of `rows × modules_per_row` units.
    Carport {
        /// Unit rows in the canopy.
        rows: u32,
        /// Units per canopy row.
        modules_per_row: u32,
        /// Place exactly one rigid block per boundary.
        force_rectangle: bool,
        /// Gap between units inside a row, metres.
        #[cfg_attr(feature = "serde", serde(default))]
        module_gap: f64,
    },
}

impl Topology {
    /// Number of units moved as one rigid group.
    pub fn units_per_group(&self) -> usize {
        match *self {
            Topology::Ungrouped { .. } => 1,
            Topology::FixedTable {
                rows_per_table,
                modules_per_row,
                ..
            } => rows_per_table as usize * modules_per_row as usize,
            Topology::Carport {
                rows,
                modules_per_row,
                force_rectangle,
                ..
            } => {
                if force_rectangle {
                    rows as usize * modules_per_row as usize
                } else {
                    modules_per_row as usize
                }
            }
        }
    }

    /// Returns true if units are placed in rigid groups.
    pub fn is_grouped(&self) -> bool {
        !matches!(self, Topology::Ungrouped { .. })
    }

    /// Short name used in logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Topology::Ungrouped { .. } => "ungrouped",
            Topology::FixedTable { .. } => "fixed-table",
            Topology::Carport { .. } => "carport",
        }
    }

    /// Checks counts and spacings.
    pub fn validate(&self) -> Result<()> {
        let spacing_ok = |name: &str, v: f64| -> Result<()> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidTopology(format!(
                    "{} must be a non-negative finite number, got {}",
                    name, v
                )))
            }
        };

        match *self {
            Topology::Ungrouped {
                adjacent_gap,
                row_spacing,
                ..
            } => {
                spacing_ok("adjacent_gap", adjacent_gap)?;
                spacing_ok("row_spacing", row_spacing)
            }
            Topology::FixedTable {
                rows_per_table,
                modules_per_row,
                inter_table_spacing_x,
                inter_table_spacing_y,
                module_gap,
                row_gap,
            } => {
                if rows_per_table == 0 || modules_per_row == 0 {
                    return Err(Error::InvalidTopology(
                        "table must have at least one row and one module per row".into(),
                    ));
                }
                spacing_ok("inter_table_spacing_x", inter_table_spacing_x)?;
                spacing_ok("inter_table_spacing_y", inter_table_spacing_y)?;
                spacing_ok("module_gap", module_gap)?;
                spacing_ok("row_gap", row_gap)
            }
            Topology::Carport {
                rows,
                modules_per_row,
                module_gap,
                ..
            } => {
                if rows == 0 || modules_per_row == 0 {
                    return Err(Error::InvalidTopology(
                        "carport must have at least one row and one module per row".into(),
                    ));
                }
                spacing_ok("module_gap", module_gap)
            }
        }
    }
}

/// Where within a boundary grid expansion begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AlignmentPolicy {
    /// Start near the left edge (facing the azimuth).
    Left,
    /// Start near the right edge (facing the azimuth).
    Right,
    /// Start near the back edge, centred across.
    #[default]
    Center,
    /// Start at the centroid with tightened pitches.
    Justify,
    /// Search the other four policies for the highest count.
    Optimum,
}

impl AlignmentPolicy {
    /// The four policies that resolve to a single origin.
    pub const CONCRETE: [AlignmentPolicy; 4] = [
        AlignmentPolicy::Left,
        AlignmentPolicy::Right,
        AlignmentPolicy::Center,
        AlignmentPolicy::Justify,
    ];

    /// Returns true for every policy except `Optimum`.
    pub fn is_concrete(self) -> bool {
        !matches!(self, AlignmentPolicy::Optimum)
    }
}

/// Rigid table parameters of a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableConfig {
    /// Unit rows per table.
    pub rows_per_table: u32,
    /// Units per table row.
    pub modules_per_row: u32,
    /// Spacing between tables across the azimuth, metres.
    pub inter_table_spacing_x: f64,
    /// Spacing between tables along the azimuth, metres.
    pub inter_table_spacing_y: f64,
}

/// Carport parameters of a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CarportConfig {
    /// Unit rows in the canopy.
    pub rows: u32,
    /// Units per canopy row.
    pub modules_per_row: u32,
    /// Place exactly one block per boundary.
    pub force_rectangle: bool,
}

/// Default layout parameters of a mounting structure.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutPreset {
    /// Module tilt in degrees. Informational; the plan footprint is not
    /// foreshortened.
    pub tilt_angle: f64,
    /// Panel orientation.
    pub orientation: Orientation,
    /// Row spacing in metres (between rows inside a table for table presets).
    pub inter_row_spacing: f64,
    /// Gap between adjacent modules in millimetres.
    pub adjacent_gap_mm: f64,
    /// Table parameters for table presets.
    pub table: Option<TableConfig>,
    /// Carport parameters for carport presets.
    pub carport: Option<CarportConfig>,
}

impl LayoutPreset {
    /// Topology described by this preset.
    pub fn topology(&self, free_form: bool) -> Topology {
        let gap = self.adjacent_gap_mm / 1000.0;
        if let Some(table) = self.table {
            Topology::FixedTable {
                rows_per_table: table.rows_per_table,
                modules_per_row: table.modules_per_row,
                inter_table_spacing_x: table.inter_table_spacing_x,
                inter_table_spacing_y: table.inter_table_spacing_y,
                module_gap: gap,
                row_gap: self.inter_row_spacing,
            }
        } else if let Some(carport) = self.carport {
            Topology::Carport {
                rows: carport.rows,
                modules_per_row: carport.modules_per_row,
                force_rectangle: carport.force_rectangle,
                module_gap: gap,
            }
        } else {
            Topology::Ungrouped {
                adjacent_gap: gap,
                row_spacing: self.inter_row_spacing,
                free_form,
            }
        }
    }
}

/// Mounting structures offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StructureKind {
    /// Ballasted flat roof racking.
    Ballasted,
    /// Fixed-tilt ground mount.
    FixedTilt,
    /// Ground mount tables.
    GroundMountTables,
    /// Single-axis tracker rows.
    SingleAxisTracker,
    /// Dual-axis trackers.
    DualAxisTracker,
    /// Carport canopy.
    Carport,
    /// Free-form PV tables.
    PvTableFreeForm,
}

impl StructureKind {
    /// Every structure kind.
    pub const ALL: [StructureKind; 7] = [
        StructureKind::Ballasted,
        StructureKind::FixedTilt,
        StructureKind::GroundMountTables,
        StructureKind::SingleAxisTracker,
        StructureKind::DualAxisTracker,
        StructureKind::Carport,
        StructureKind::PvTableFreeForm,
    ];

    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            StructureKind::Ballasted => "ballasted",
            StructureKind::FixedTilt => "fixed_tilt",
            StructureKind::GroundMountTables => "ground_mount_tables",
            StructureKind::SingleAxisTracker => "single_axis_tracker",
            StructureKind::DualAxisTracker => "dual_axis_tracker",
            StructureKind::Carport => "carport",
            StructureKind::PvTableFreeForm => "pv_table_free_form",
        }
    }

    /// Parses an identifier produced by [`StructureKind::id`].
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            StructureKind::Ballasted => "Ballasted Flat Roof",
            StructureKind::FixedTilt => "Fixed Tilt Ground Mount",
            StructureKind::GroundMountTables => "Ground Mount Tables",
            StructureKind::SingleAxisTracker => "1-Axis Tracker",
            StructureKind::DualAxisTracker => "2-Axis Tracker",
            StructureKind::Carport => "Carport Structure",
            StructureKind::PvTableFreeForm => "PV Table - Free Form",
        }
    }

    /// Typical ground coverage ratio of the structure.
    pub fn ground_coverage_ratio(self) -> f64 {
        match self {
            StructureKind::Ballasted | StructureKind::PvTableFreeForm => 0.5,
            StructureKind::FixedTilt => 0.4,
            StructureKind::GroundMountTables => 0.45,
            StructureKind::SingleAxisTracker | StructureKind::DualAxisTracker => 0.33,
            StructureKind::Carport => 0.7,
        }
    }

    /// Default layout parameters.
    pub fn preset(self) -> LayoutPreset {
        match self {
            StructureKind::Ballasted | StructureKind::PvTableFreeForm => LayoutPreset {
                tilt_angle: 10.0,
                orientation: Orientation::Landscape,
                inter_row_spacing: 1.5,
                adjacent_gap_mm: 20.0,
                table: None,
                carport: None,
            },
            StructureKind::FixedTilt => LayoutPreset {
                tilt_angle: 25.0,
                orientation: Orientation::Portrait,
                inter_row_spacing: 0.0,
                adjacent_gap_mm: 20.0,
                table: Some(TableConfig {
                    rows_per_table: 1,
                    modules_per_row: 8,
                    inter_table_spacing_x: 0.5,
                    inter_table_spacing_y: 2.0,
                }),
                carport: None,
            },
            StructureKind::GroundMountTables => LayoutPreset {
                tilt_angle: 20.0,
                orientation: Orientation::Landscape,
                inter_row_spacing: 0.05,
                adjacent_gap_mm: 20.0,
                table: Some(TableConfig {
                    rows_per_table: 3,
                    modules_per_row: 5,
                    inter_table_spacing_x: 0.5,
                    inter_table_spacing_y: 4.0,
                }),
                carport: None,
            },
            StructureKind::SingleAxisTracker | StructureKind::DualAxisTracker => LayoutPreset {
                tilt_angle: 0.0,
                orientation: Orientation::Landscape,
                inter_row_spacing: 4.0,
                adjacent_gap_mm: 25.0,
                table: None,
                carport: None,
            },
            StructureKind::Carport => LayoutPreset {
                tilt_angle: 5.0,
                orientation: Orientation::Landscape,
                inter_row_spacing: 0.0,
                adjacent_gap_mm: 20.0,
                table: None,
                carport: Some(CarportConfig {
                    rows: 6,
                    modules_per_row: 10,
                    force_rectangle: true,
                }),
            },
        }
    }

    /// Topology of the default preset.
    pub fn topology(self) -> Topology {
        self.preset()
            .topology(matches!(self, StructureKind::PvTableFreeForm))
    }

    /// Alignment policies the structure supports.
    pub fn allowed_alignments(self) -> &'static [AlignmentPolicy] {
        use AlignmentPolicy::*;
        match self {
            StructureKind::Ballasted => &[Left, Center, Right],
            StructureKind::PvTableFreeForm => &[Left, Center, Right, Justify],
            StructureKind::FixedTilt | StructureKind::Carport => &[Center],
            StructureKind::GroundMountTables => &[Center, Optimum],
            StructureKind::SingleAxisTracker | StructureKind::DualAxisTracker => {
                &[Left, Center, Right, Justify, Optimum]
            }
        }
    }

    /// Returns `requested` if the structure supports it, otherwise `Center`.
    pub fn resolve_alignment(self, requested: AlignmentPolicy) -> AlignmentPolicy {
        if self.allowed_alignments().contains(&requested) {
            requested
        } else {
            log::debug!(
                "alignment {:?} is not available for {}, using Center",
                requested,
                self.id()
            );
            AlignmentPolicy::Center
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_per_group() {
        let table = Topology::FixedTable {
            rows_per_table: 2,
            modules_per_row: 5,
            inter_table_spacing_x: 1.0,
            inter_table_spacing_y: 1.0,
            module_gap: 0.0,
            row_gap: 0.0,
        };
        assert_eq!(table.units_per_group(), 10);
        assert!(table.is_grouped());

        let carport = Topology::Carport {
            rows: 6,
            modules_per_row: 10,
            force_rectangle: false,
            module_gap: 0.0,
        };
        assert_eq!(carport.units_per_group(), 10);

        let free = Topology::Ungrouped {
            adjacent_gap: 0.0,
            row_spacing: 0.0,
            free_form: false,
        };
        assert_eq!(free.units_per_group(), 1);
        assert!(!free.is_grouped());
    }

    #[test]
    fn test_validate_topology() {
        let bad_table = Topology::FixedTable {
            rows_per_table: 0,
            modules_per_row: 5,
            inter_table_spacing_x: 1.0,
            inter_table_spacing_y: 1.0,
            module_gap: 0.0,
            row_gap: 0.0,
        };
        assert!(bad_table.validate().is_err());

        let bad_gap = Topology::Ungrouped {
            adjacent_gap: -0.1,
            row_spacing: 0.0,
            free_form: false,
        };
        assert!(bad_gap.validate().is_err());

        for kind in StructureKind::ALL {
            assert!(kind.topology().validate().is_ok(), "{}", kind.id());
        }
    }

    #[test]
    fn test_preset_topologies() {
        assert_eq!(
            StructureKind::GroundMountTables.topology(),
            Topology::FixedTable {
                rows_per_table: 3,
                modules_per_row: 5,
                inter_table_spacing_x: 0.5,
                inter_table_spacing_y: 4.0,
                module_gap: 0.02,
                row_gap: 0.05,
            }
        );
        assert!(matches!(
            StructureKind::PvTableFreeForm.topology(),
            Topology::Ungrouped { free_form: true, .. }
        ));
        assert!(matches!(
            StructureKind::Ballasted.topology(),
            Topology::Ungrouped { free_form: false, .. }
        ));
        assert!(matches!(
            StructureKind::Carport.topology(),
            Topology::Carport {
                rows: 6,
                modules_per_row: 10,
                force_rectangle: true,
                ..
            }
        ));
    }

    #[test]
    fn test_resolve_alignment() {
        use AlignmentPolicy::*;
        assert_eq!(StructureKind::Ballasted.resolve_alignment(Justify), Center);
        assert_eq!(StructureKind::Ballasted.resolve_alignment(Left), Left);
        assert_eq!(StructureKind::Carport.resolve_alignment(Right), Center);
        assert_eq!(StructureKind::GroundMountTables.resolve_alignment(Optimum), Optimum);
        assert_eq!(StructureKind::PvTableFreeForm.resolve_alignment(Optimum), Center);
        assert_eq!(StructureKind::SingleAxisTracker.resolve_alignment(Justify), Justify);
    }

    #[test]
    fn test_ids_roundtrip() {
        for kind in StructureKind::ALL {
            assert_eq!(StructureKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(StructureKind::from_id("tracker"), None);
    }
}
