//! Session configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "restrictedColors": ["#CAE4ED", "#000000"],
//!   "exportFilename": "customized.svg",
//!   "collision": "merge",
//!   "shineIntensity": 0.35,
//!   "shadowOpacity": 0.25
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pipeline::{PipelineConfig, ShadowConfig, ShineConfig};
use crate::region::CollisionPolicy;

/// Colors always shown in the restricted panel.
pub const DEFAULT_RESTRICTED_COLORS: &[&str] = &[
    "#CAE4ED", "#252525", "#343434", "#8F8F8F", "#c4c4c4", "#e9f2f4", "#000000",
];

/// Default name of the exported file.
pub const DEFAULT_EXPORT_FILENAME: &str = "customized.svg";

/// Configuration of a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct SessionConfig {
    /// Raw color values segregated into the restricted panel.
    pub restricted_colors: Vec<String>,

    /// File name given to export artifacts.
    pub export_filename: String,

    /// Behavior when a swatch is recolored onto another swatch's color.
    pub collision: CollisionPolicy,

    /// Shine flood opacity when the shine effect is on.
    pub shine_intensity: f32,

    /// Shadow flood opacity when the shadow effect is on.
    pub shadow_opacity: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            restricted_colors: DEFAULT_RESTRICTED_COLORS.iter().map(|c| c.to_string()).collect(),
            export_filename: DEFAULT_EXPORT_FILENAME.to_string(),
            collision: CollisionPolicy::default(),
            shine_intensity: ShineConfig::default().opacity,
            shadow_opacity: ShadowConfig::default().opacity,
        }
    }
}

impl SessionConfig {
    /// Deserializes a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serializes the config to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Returns the stage configurations for newly injected pipelines.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            shine: ShineConfig::new(self.shine_intensity),
            shadow: ShadowConfig::new(self.shadow_opacity),
            ..PipelineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let config = SessionConfig::from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.restricted_colors.len(), 7);
        assert_eq!(config.export_filename, "customized.svg");
        assert_eq!(config.collision, CollisionPolicy::Merge);
    }

    #[test]
    fn partial_config_overrides_fields() {
        let config = SessionConfig::from_json(
            r##"{ "restrictedColors": ["#fff"], "collision": "overwrite", "shineIntensity": 0.5 }"##,
        )
        .unwrap();

        assert_eq!(config.restricted_colors, ["#fff"]);
        assert_eq!(config.collision, CollisionPolicy::Overwrite);
        assert_eq!(config.pipeline_config().shine.opacity, 0.5);
        assert_eq!(config.pipeline_config().shadow.opacity, 0.25);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            SessionConfig::from_json("{ \"collision\": \"sometimes\" }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            SessionConfig::from_file("/nonexistent/svgpaint.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn json_roundtrip() {
        let config = SessionConfig {
            shadow_opacity: 0.4,
            ..SessionConfig::default()
        };
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"shadowOpacity\": 0.4"));
        assert_eq!(SessionConfig::from_json(&json).unwrap(), config);
    }
}
