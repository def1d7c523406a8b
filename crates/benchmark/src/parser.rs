//! Scenario file parser.

use crate::scenario::Scenario;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when parsing scenarios.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid scenario format: {0}")]
    InvalidFormat(String),
}

/// Parser for scenario files.
#[derive(Debug, Default)]
pub struct ScenarioParser;

impl ScenarioParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parses a scenario from a JSON file.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Scenario, ParseError> {
        let content = fs::read_to_string(path)?;
        self.parse_json(&content)
    }

    /// Parses a scenario from a JSON string.
    pub fn parse_json(&self, json: &str) -> Result<Scenario, ParseError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        self.validate(&scenario)?;
        Ok(scenario)
    }

    fn validate(&self, scenario: &Scenario) -> Result<(), ParseError> {
        if scenario.structure_kind().is_none() {
            return Err(ParseError::InvalidFormat(format!(
                "unknown structure '{}'",
                scenario.structure
            )));
        }
        if scenario.boundaries.is_empty() {
            return Err(ParseError::InvalidFormat("no boundaries".into()));
        }
        for shape in &scenario.boundaries {
            let rectangle = shape.width.is_some() && shape.height.is_some();
            if !rectangle && shape.polygon.is_none() {
                return Err(ParseError::InvalidFormat(format!(
                    "boundary '{}' needs width/height or polygon",
                    shape.id
                )));
            }
        }
        let module = &scenario.module;
        if !(module.length_mm > 0.0 && module.width_mm > 0.0) {
            return Err(ParseError::InvalidFormat(format!(
                "module dimensions must be positive, got {} x {} mm",
                module.length_mm, module.width_mm
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rectangle_scenario() {
        let json = r#"{
            "name": "scenario-a",
            "origin": [40.4168, -3.7038],
            "boundaries": [{"id": "a", "width": 40, "height": 20}],
            "structure": "single_axis_tracker",
            "module": {"length_mm": 2000, "width_mm": 1000, "power_w": 500},
            "expected_units": 120
        }"#;
        let scenario = ScenarioParser::new().parse_json(json).unwrap();
        assert_eq!(scenario.name, "scenario-a");
        assert_eq!(scenario.azimuth, 180.0);
        assert_eq!(scenario.boundaries.len(), 1);
        assert_eq!(scenario.expected_units, Some(120));
    }

    #[test]
    fn test_invalid_scenarios() {
        let parser = ScenarioParser::new();
        let unknown = r#"{
            "name": "x", "origin": [0, 0],
            "boundaries": [{"id": "a", "width": 10, "height": 10}],
            "structure": "pergola",
            "module": {"length_mm": 2000, "width_mm": 1000}
        }"#;
        assert!(matches!(parser.parse_json(unknown), Err(ParseError::InvalidFormat(_))));

        let shapeless = r#"{
            "name": "x", "origin": [0, 0],
            "boundaries": [{"id": "a", "width": 10}],
            "structure": "ballasted",
            "module": {"length_mm": 2000, "width_mm": 1000}
        }"#;
        assert!(matches!(parser.parse_json(shapeless), Err(ParseError::InvalidFormat(_))));

        assert!(matches!(parser.parse_json("[]"), Err(ParseError::JsonError(_))));
    }
}
