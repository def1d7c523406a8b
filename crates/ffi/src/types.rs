//! FFI type definitions.

use serde::{Deserialize, Serialize};
use solarpack_core::{
    AlignmentPolicy, BoundaryOutcome, Config, GeoPoint, Orientation, PlacementResult,
    PlacementUnit, Topology, DEFAULT_AZIMUTH,
};

/// API version from Cargo.toml.
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Layout request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    /// API version.
    #[serde(default)]
    pub version: Option<String>,

    /// Boundaries, processed in order.
    pub boundaries: Vec<BoundaryRequest>,

    /// Module definition.
    pub module: ModuleRequest,

    /// Structure preset id (e.g. "ballasted", "carport").
    #[serde(default)]
    pub structure: Option<String>,

    /// Explicit topology. Overrides the structure preset's topology.
    #[serde(default)]
    pub topology: Option<Topology>,

    /// Requested alignment policy. Defaults to center.
    #[serde(default)]
    pub alignment: Option<AlignmentPolicy>,

    /// Maximum total units. Absent means unlimited.
    #[serde(default)]
    pub unit_budget: Option<i64>,

    /// Engine constants.
    #[serde(default)]
    pub config: Option<Config>,
}

/// Boundary request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryRequest {
    /// Unique identifier.
    pub id: String,

    /// Vertex ring as [[lat, lng], ...], not closed.
    pub vertices: Vec<[f64; 2]>,

    /// Installation azimuth in degrees.
    #[serde(default = "default_azimuth")]
    pub azimuth: f64,
}

/// Module request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleRequest {
    /// Long side in millimetres.
    pub length_mm: f64,

    /// Short side in millimetres.
    pub width_mm: f64,

    /// Orientation. Defaults to the structure preset's, else landscape.
    #[serde(default)]
    pub orientation: Option<Orientation>,

    /// Nominal power in watts.
    #[serde(default)]
    pub power_w: f64,
}

/// Response for plan operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    /// API version.
    pub version: String,

    /// Whether the operation succeeded.
    pub success: bool,

    /// Error message if failed.
    pub error: Option<String>,

    /// One entry per input boundary.
    #[serde(default)]
    pub boundaries: Vec<BoundaryResponse>,

    /// Aggregate counts.
    pub summary: SummaryResponse,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,
}

impl PlanResponse {
    /// Creates a failed response.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            version: API_VERSION.to_string(),
            success: false,
            error: Some(error.into()),
            boundaries: Vec::new(),
            summary: SummaryResponse::default(),
            computation_time_ms: 0,
        }
    }
}

/// Aggregate counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Total placed units.
    pub total_units: usize,

    /// Total capacity in kW.
    pub total_capacity_kw: f64,

    /// Total placed tables.
    pub total_tables: usize,

    /// Structure preset id, if one was used.
    pub structure: Option<String>,

    /// Typical ground coverage ratio of the structure.
    pub ground_coverage_ratio: Option<f64>,
}

/// Per-boundary response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryResponse {
    /// Boundary ID.
    pub id: String,

    /// "placed" or "aborted".
    pub status: String,

    /// Placed units.
    pub unit_count: usize,

    /// Placed tables.
    pub table_count: usize,

    /// Occupied lattice rows.
    pub rows: usize,

    /// Occupied lattice columns.
    pub columns: usize,

    /// Capacity in kW.
    pub capacity_kw: f64,

    /// Concrete alignment used.
    pub alignment: Option<AlignmentPolicy>,

    /// Minimum center spacing in metres.
    pub min_spacing_m: f64,

    /// Reason code for empty, short or aborted results.
    pub reason: Option<String>,

    /// Placed units.
    #[serde(default)]
    pub units: Vec<UnitResponse>,
}

/// Unit response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitResponse {
    /// Center [lat, lng].
    pub center: [f64; 2],

    /// Corners [[lat, lng]; 4]: back-left, back-right, front-right, front-left.
    pub corners: [[f64; 2]; 4],

    /// Lattice row.
    pub row: i32,

    /// Lattice column.
    pub col: i32,

    /// Owning table, for grouped layouts.
    pub table_id: Option<usize>,
}

fn default_azimuth() -> f64 {
    DEFAULT_AZIMUTH
}

fn latlng(p: GeoPoint) -> [f64; 2] {
    [p.lat, p.lng]
}

impl From<&PlacementUnit> for UnitResponse {
    fn from(u: &PlacementUnit) -> Self {
        Self {
            center: latlng(u.center),
            corners: u.corners.map(latlng),
            row: u.index.row,
            col: u.index.col,
            table_id: u.table_id,
        }
    }
}

impl From<&PlacementResult> for BoundaryResponse {
    fn from(r: &PlacementResult) -> Self {
        Self {
            id: r.boundary_id.clone(),
            status: "placed".into(),
            unit_count: r.unit_count,
            table_count: r.table_count,
            rows: r.table_layout.rows,
            columns: r.table_layout.columns,
            capacity_kw: r.capacity_kw,
            alignment: Some(r.alignment),
            min_spacing_m: r.min_spacing_m,
            reason: r.reason.map(|c| c.as_str().to_string()),
            units: r.units.iter().map(UnitResponse::from).collect(),
        }
    }
}

impl From<&BoundaryOutcome> for BoundaryResponse {
    fn from(outcome: &BoundaryOutcome) -> Self {
        match outcome {
            BoundaryOutcome::Placed(result) => result.into(),
            BoundaryOutcome::Aborted {
                boundary_id,
                reason,
            } => Self {
                id: boundary_id.clone(),
                status: "aborted".into(),
                unit_count: 0,
                table_count: 0,
                rows: 0,
                columns: 0,
                capacity_kw: 0.0,
                alignment: None,
                min_spacing_m: 0.0,
                reason: Some(reason.as_str().to_string()),
                units: Vec::new(),
            },
        }
    }
}
