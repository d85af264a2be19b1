//! Canvas configuration (easel.toml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::path::PathBuilder;

/// Tunables shared by every surface created from this configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CanvasConfig {
    /// Font shorthand applied to fresh contexts
    #[serde(default = "default_font")]
    pub default_font: String,
    /// Largest angle covered by one straight segment when flattening arcs
    #[serde(default = "default_arc_segment_degrees")]
    pub arc_segment_degrees: f32,
    /// Deepest save() nesting a script may build up
    #[serde(default = "default_max_save_depth")]
    pub max_save_depth: usize,
}

fn default_font() -> String {
    "10px sans-serif".to_string()
}

fn default_arc_segment_degrees() -> f32 {
    10.0
}

fn default_max_save_depth() -> usize {
    1024
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_font: default_font(),
            arc_segment_degrees: default_arc_segment_degrees(),
            max_save_depth: default_max_save_depth(),
        }
    }
}

impl CanvasConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CanvasConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Arc flattening step in radians, kept strictly finer than a quarter turn
    pub fn arc_segment_angle(&self) -> f32 {
        let degrees = if self.arc_segment_degrees.is_finite() && self.arc_segment_degrees > 0.0 {
            self.arc_segment_degrees.clamp(
                PathBuilder::MIN_ARC_STEP_DEGREES,
                PathBuilder::MAX_ARC_STEP_DEGREES,
            )
        } else {
            default_arc_segment_degrees()
        };
        degrees.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config = CanvasConfig::from_toml_str("").unwrap();
        assert_eq!(config, CanvasConfig::default());
        assert_eq!(config.default_font, "10px sans-serif");
    }

    #[test]
    fn test_partial_toml() {
        let config = CanvasConfig::from_toml_str(
            r#"
            default_font = "bold 14px serif"
            max_save_depth = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.default_font, "bold 14px serif");
        assert_eq!(config.max_save_depth, 8);
        assert_eq!(config.arc_segment_degrees, 10.0);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(CanvasConfig::from_toml_str("max_save_depth = \"many\"").is_err());
    }

    #[test]
    fn test_arc_segment_angle_is_bounded() {
        let mut config = CanvasConfig::default();
        config.arc_segment_degrees = 400.0;
        assert!(config.arc_segment_angle() < std::f32::consts::FRAC_PI_2);

        config.arc_segment_degrees = -1.0;
        assert!((config.arc_segment_angle() - 10f32.to_radians()).abs() < 1e-6);

        config.arc_segment_degrees = 1e-6;
        assert!((config.arc_segment_angle() - 0.5f32.to_radians()).abs() < 1e-6);
    }
}
