//! Layout configuration.
//!
//! All widths and heights are abstract units; mapping them to points or
//! pixels is left to whatever draws the result.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Options recognized by the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Detect repeated measures and riffs and fold them into markers.
    /// When false every measure is printed in full.
    pub check_repetitions: bool,
    /// Shortest run of repeated measures that gets folded. Below 2, every
    /// repeated measure is folded on its own.
    pub minimum_repetition_length: usize,
    pub max_line_width_units: u32,
    pub max_page_height_units: u32,
    /// Floor for the width of a printed measure
    pub min_unit_width: u32,
    /// Width of the clef/header placed at the start of every line
    pub line_header_width: u32,
    /// Extra header width taken by the key signature glyphs
    pub key_signature_width: u32,
    pub riff_width: u32,
    /// Width of "repeat measure N" and "play N times" markers
    pub repeat_marker_width: u32,
    pub empty_measure_width: u32,
    /// Width of an otherwise empty measure that a held note crosses into
    pub held_empty_measure_width: u32,
    pub time_signature_width: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            check_repetitions: true,
            minimum_repetition_length: 2,
            max_line_width_units: 70,
            max_page_height_units: 74,
            min_unit_width: 3,
            line_header_width: 5,
            key_signature_width: 0,
            riff_width: 5,
            repeat_marker_width: 2,
            empty_measure_width: 2,
            held_empty_measure_width: 5,
            time_signature_width: 1,
        }
    }
}

impl LayoutConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.minimum_repetition_length == 0 {
            return Err(LayoutError::InvalidConfig(
                "minimum_repetition_length must be at least 1".into(),
            ));
        }
        if self.max_line_width_units == 0 {
            return Err(LayoutError::InvalidConfig(
                "max_line_width_units must be positive".into(),
            ));
        }
        if self.max_page_height_units == 0 {
            return Err(LayoutError::InvalidConfig(
                "max_page_height_units must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Full width of the header element that opens each line.
    pub fn header_width(&self) -> u32 {
        self.line_header_width + self.key_signature_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = LayoutConfig::from_json(r#"{ "max_line_width_units": 40 }"#).unwrap();
        assert_eq!(config.max_line_width_units, 40);
        assert_eq!(config.minimum_repetition_length, 2);
        assert!(config.check_repetitions);
    }

    #[test]
    fn zero_repetition_length_is_rejected() {
        let err = LayoutConfig::from_json(r#"{ "minimum_repetition_length": 0 }"#).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfig(_)));
    }

    #[test]
    fn header_includes_key_signature() {
        let config = LayoutConfig {
            key_signature_width: 3,
            ..LayoutConfig::default()
        };
        assert_eq!(config.header_width(), 8);
    }
}
