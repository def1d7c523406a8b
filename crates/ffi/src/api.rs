//! C FFI API functions.

use crate::types::*;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use solarpack_core::{Boundary, Footprint, GeoPoint, Orientation, StructureKind};
use solarpack_layout::{LayoutPlanner, LayoutRequest};

/// Error codes.
pub const SOLARPACK_OK: i32 = 0;
pub const SOLARPACK_ERR_NULL_PTR: i32 = -1;
pub const SOLARPACK_ERR_INVALID_JSON: i32 = -2;
pub const SOLARPACK_ERR_PLAN_FAILED: i32 = -3;
pub const SOLARPACK_ERR_UNKNOWN: i32 = -99;

/// Computes a module layout from a JSON request.
///
/// A response is written to `result_ptr` for every code except
/// `SOLARPACK_ERR_NULL_PTR` and `SOLARPACK_ERR_UNKNOWN`.
///
/// # Safety
/// - `request_json` must be a valid null-terminated UTF-8 string
/// - `result_ptr` must be a valid pointer to a `*mut c_char`
/// - The caller must free the result string using `solarpack_free_string`
#[no_mangle]
pub unsafe extern "C" fn solarpack_plan(
    request_json: *const c_char,
    result_ptr: *mut *mut c_char,
) -> i32 {
    if request_json.is_null() || result_ptr.is_null() {
        return SOLARPACK_ERR_NULL_PTR;
    }

    let (response, code) = match CStr::from_ptr(request_json).to_str() {
        Ok(json_str) => plan_internal(json_str),
        Err(_) => (
            PlanResponse::failure("Invalid JSON: request is not valid UTF-8"),
            SOLARPACK_ERR_INVALID_JSON,
        ),
    };

    let response_json = match serde_json::to_string(&response) {
        Ok(s) => s,
        Err(_) => return SOLARPACK_ERR_UNKNOWN,
    };

    match CString::new(response_json) {
        Ok(cstr) => {
            *result_ptr = cstr.into_raw();
            code
        }
        Err(_) => SOLARPACK_ERR_UNKNOWN,
    }
}

/// Frees a string allocated by solarpack.
///
/// # Safety
/// - `ptr` must have been allocated by a solarpack function
/// - `ptr` must not be used after this call
#[no_mangle]
pub unsafe extern "C" fn solarpack_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Returns the API version from Cargo.toml.
///
/// # Safety
/// - The returned string is statically allocated and must not be freed
#[no_mangle]
pub extern "C" fn solarpack_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

fn plan_internal(json_str: &str) -> (PlanResponse, i32) {
    let request: PlanRequest = match serde_json::from_str(json_str) {
        Ok(r) => r,
        Err(e) => {
            return (
                PlanResponse::failure(format!("Invalid JSON: {}", e)),
                SOLARPACK_ERR_INVALID_JSON,
            );
        }
    };

    let structure = match request.structure.as_deref() {
        Some(id) => match StructureKind::from_id(id) {
            Some(kind) => Some(kind),
            None => {
                return (
                    PlanResponse::failure(format!("Unknown structure: {}", id)),
                    SOLARPACK_ERR_PLAN_FAILED,
                );
            }
        },
        None => None,
    };

    let layout_request = match build_request(&request, structure) {
        Ok(r) => r,
        Err(message) => return (PlanResponse::failure(message), SOLARPACK_ERR_PLAN_FAILED),
    };

    let planner = LayoutPlanner::new(request.config.clone().unwrap_or_default());
    let outcome = match planner.plan(&layout_request) {
        Ok(o) => o,
        Err(e) => {
            log::warn!("plan failed: {}", e);
            return (PlanResponse::failure(e.to_string()), SOLARPACK_ERR_PLAN_FAILED);
        }
    };

    let response = PlanResponse {
        version: API_VERSION.to_string(),
        success: true,
        error: None,
        boundaries: outcome.outcomes.iter().map(BoundaryResponse::from).collect(),
        summary: SummaryResponse {
            total_units: outcome.summary.total_units,
            total_capacity_kw: outcome.summary.total_capacity_kw,
            total_tables: outcome.summary.total_tables,
            structure: structure.map(|k| k.id().to_string()),
            ground_coverage_ratio: structure.map(StructureKind::ground_coverage_ratio),
        },
        computation_time_ms: outcome.computation_time_ms,
    };
    (response, SOLARPACK_OK)
}

/// Converts the wire request into a [`LayoutRequest`].
fn build_request(
    request: &PlanRequest,
    structure: Option<StructureKind>,
) -> Result<LayoutRequest, String> {
    let topology = match (request.topology, structure) {
        (Some(topology), _) => topology,
        (None, Some(kind)) => kind.topology(),
        (None, None) => return Err("Either a structure or a topology is required".into()),
    };

    let orientation = request
        .module
        .orientation
        .or_else(|| structure.map(|k| k.preset().orientation))
        .unwrap_or(Orientation::Landscape);
    let footprint =
        Footprint::from_panel(request.module.length_mm, request.module.width_mm, orientation);

    let requested = request.alignment.unwrap_or_default();
    let alignment = match structure {
        Some(kind) => kind.resolve_alignment(requested),
        None => requested,
    };

    let boundaries = request
        .boundaries
        .iter()
        .map(|b| {
            let vertices = b.vertices.iter().map(|v| GeoPoint::new(v[0], v[1])).collect();
            Boundary::with_azimuth(b.id.clone(), vertices, b.azimuth)
        })
        .collect();

    let mut layout_request = LayoutRequest::new(boundaries, footprint, topology)
        .with_alignment(alignment)
        .with_unit_power(request.module.power_w);
    layout_request.unit_budget = request.unit_budget;
    Ok(layout_request)
}
