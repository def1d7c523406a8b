//! Scenario definitions.

use serde::{Deserialize, Serialize};
use solarpack::{
    AlignmentPolicy, Boundary, Footprint, GeoPoint, LayoutRequest, Orientation, StructureKind,
};

/// A layout scenario: boundaries drawn in metres around a geographic origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name
    pub name: String,
    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Geographic origin [lat, lng] of the local coordinates
    pub origin: [f64; 2],
    /// Installation azimuth in degrees
    #[serde(default = "default_azimuth")]
    pub azimuth: f64,
    /// Boundaries to fill
    pub boundaries: Vec<SiteShape>,
    /// Structure preset id
    pub structure: String,
    /// Module definition
    pub module: ModuleSpec,
    /// Maximum total units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_budget: Option<i64>,
    /// Expected total units under the center policy, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_units: Option<usize>,
}

/// One boundary: either a rectangle centred on the origin or a polygon in
/// local metres (+x across the azimuth, +y along it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteShape {
    /// Boundary id
    pub id: String,
    /// Rectangle width in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Rectangle height in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Polygon vertices as [[x, y], ...]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<[f64; 2]>>,
}

/// Module definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Long side in millimetres
    pub length_mm: f64,
    /// Short side in millimetres
    pub width_mm: f64,
    /// Orientation; the structure preset's when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    /// Nominal power in watts
    #[serde(default)]
    pub power_w: f64,
}

fn default_azimuth() -> f64 {
    solarpack::core::DEFAULT_AZIMUTH
}

impl Scenario {
    /// Structure preset, if the id is known.
    pub fn structure_kind(&self) -> Option<StructureKind> {
        StructureKind::from_id(&self.structure)
    }

    fn origin_point(&self) -> GeoPoint {
        GeoPoint::new(self.origin[0], self.origin[1])
    }

    /// Geographic boundaries. Shapes with neither dimensions nor a polygon
    /// are skipped.
    pub fn boundaries(&self) -> Vec<Boundary> {
        let origin = self.origin_point();
        self.boundaries
            .iter()
            .filter_map(|shape| match (shape.width, shape.height, &shape.polygon) {
                (Some(w), Some(h), _) => {
                    Some(Boundary::rectangle(shape.id.clone(), origin, w, h, self.azimuth))
                }
                (_, _, Some(polygon)) => {
                    let points: Vec<(f64, f64)> = polygon.iter().map(|p| (p[0], p[1])).collect();
                    Some(Boundary::from_local(shape.id.clone(), origin, self.azimuth, &points))
                }
                _ => None,
            })
            .collect()
    }

    /// Module footprint under `kind`'s default orientation.
    pub fn footprint(&self, kind: StructureKind) -> Footprint {
        let orientation = self.module.orientation.unwrap_or(kind.preset().orientation);
        Footprint::from_panel(self.module.length_mm, self.module.width_mm, orientation)
    }

    /// Builds the layout request for one alignment policy.
    pub fn request(&self, kind: StructureKind, alignment: AlignmentPolicy) -> LayoutRequest {
        let mut request =
            LayoutRequest::for_structure(kind, self.boundaries(), self.footprint(kind), alignment)
                .with_unit_power(self.module.power_w);
        request.unit_budget = self.unit_budget;
        request
    }

    /// A small example scenario for `kind`.
    pub fn sample(kind: StructureKind) -> Self {
        Self {
            name: format!("{} sample", kind.name()),
            description: Some("Rectangular lot next to an L-shaped roof".into()),
            origin: [48.137, 11.575],
            azimuth: 180.0,
            boundaries: vec![
                SiteShape {
                    id: "lot".into(),
                    width: Some(60.0),
                    height: Some(30.0),
                    polygon: None,
                },
                SiteShape {
                    id: "roof".into(),
                    width: None,
                    height: None,
                    polygon: Some(vec![
                        [40.0, 20.0],
                        [80.0, 20.0],
                        [80.0, 35.0],
                        [55.0, 35.0],
                        [55.0, 50.0],
                        [40.0, 50.0],
                    ]),
                },
            ],
            structure: kind.id().into(),
            module: ModuleSpec {
                length_mm: 1722.0,
                width_mm: 1134.0,
                orientation: None,
                power_w: 410.0,
            },
            unit_budget: None,
            expected_units: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_boundaries() {
        let scenario = Scenario::sample(StructureKind::Ballasted);
        let boundaries = scenario.boundaries();
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[1].vertices().len(), 6);
        assert_eq!(scenario.structure_kind(), Some(StructureKind::Ballasted));
    }

    #[test]
    fn test_footprint_follows_preset() {
        let scenario = Scenario::sample(StructureKind::FixedTilt);
        let fp = scenario.footprint(StructureKind::FixedTilt);
        assert!((fp.width - 1.134).abs() < 1e-12);
        assert!((fp.height - 1.722).abs() < 1e-12);
    }
}
