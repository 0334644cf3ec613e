//! Serializable effect profile.
//!
//! An [`EffectProfile`] captures the effect toggles, the tone sliders and
//! the palette edits of a session in a form that can be saved as JSON and
//! replayed onto another session holding the same image.
//!
//! # Example
//!
//! ```
//! use svg_paint::{EffectProfile, RecolorSettings, ShineSettings, ToneSettings};
//!
//! let profile = EffectProfile::new()
//!     .with_shine(ShineSettings { enabled: true })
//!     .with_tone(ToneSettings { saturation: 1.4, ..ToneSettings::default() })
//!     .with_recolor(RecolorSettings::new("#ff0000", "#00aa00"));
//!
//! let json = profile.to_json().unwrap();
//! let restored = EffectProfile::from_json(&json).unwrap();
//! assert_eq!(restored, profile);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Effect Settings
// ============================================================================

/// Shine toggle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ShineSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Drop shadow toggle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ShadowSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Metallic texture toggle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct MetallicSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Color tuning sliders. `1.0` is neutral for every field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ToneSettings {
    pub saturation: f32,
    pub brightness: f32,
    pub contrast: f32,
}

impl Default for ToneSettings {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            brightness: 1.0,
            contrast: 1.0,
        }
    }
}

/// A palette edit: every region painted `from` is repainted `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct RecolorSettings {
    pub from: String,
    pub to: String,
}

impl RecolorSettings {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

fn default_true() -> bool {
    true
}

// ============================================================================
// EffectProfile
// ============================================================================

/// A serializable profile of all session settings.
///
/// # JSON Format
///
/// ```json
/// {
///   "shine": { "enabled": true },
///   "metallic": { "enabled": false },
///   "tone": { "saturation": 1.4, "brightness": 1.0, "contrast": 1.0 },
///   "recolors": [{ "from": "#ff0000", "to": "#00aa00" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct EffectProfile {
    /// Shine settings. `None` means off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shine: Option<ShineSettings>,

    /// Shadow settings. `None` means off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<ShadowSettings>,

    /// Metallic settings. `None` means off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metallic: Option<MetallicSettings>,

    /// Tone settings. `None` means neutral.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<ToneSettings>,

    /// Palette edits, applied in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recolors: Vec<RecolorSettings>,
}

impl EffectProfile {
    /// Creates an empty profile: every effect off, no edits.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shine(mut self, settings: ShineSettings) -> Self {
        self.shine = Some(settings);
        self
    }

    pub fn with_shadow(mut self, settings: ShadowSettings) -> Self {
        self.shadow = Some(settings);
        self
    }

    pub fn with_metallic(mut self, settings: MetallicSettings) -> Self {
        self.metallic = Some(settings);
        self
    }

    pub fn with_tone(mut self, settings: ToneSettings) -> Self {
        self.tone = Some(settings);
        self
    }

    /// Appends a palette edit.
    pub fn with_recolor(mut self, settings: RecolorSettings) -> Self {
        self.recolors.push(settings);
        self
    }

    /// Serializes the profile to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the profile to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_json_format() {
        let profile = EffectProfile::new()
            .with_metallic(MetallicSettings { enabled: true })
            .with_recolor(RecolorSettings::new("#fff", "#000"));

        let json = profile.to_json_pretty().unwrap();
        assert!(json.contains("\"metallic\""));
        assert!(json.contains("\"recolors\""));
        assert!(!json.contains("\"shine\""));
        assert!(!json.contains("\"tone\""));
    }

    #[test]
    fn empty_profile_deserializes() {
        let profile = EffectProfile::from_json("{}").unwrap();
        assert_eq!(profile, EffectProfile::new());
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let profile =
            EffectProfile::from_json(r#"{ "shadow": {}, "tone": { "contrast": 1.3 } }"#).unwrap();

        assert_eq!(profile.shadow, Some(ShadowSettings { enabled: true }));
        let tone = profile.tone.unwrap();
        assert_eq!(tone.contrast, 1.3);
        assert_eq!(tone.saturation, 1.0);
        assert_eq!(tone.brightness, 1.0);
    }

    #[test]
    fn profile_apply_to_session() {
        use crate::{Configurable, Session, SessionConfig};

        let mut session = Session::with_document(
            SessionConfig::default(),
            crate::Document::parse(r##"<svg><rect fill="#f00"/><rect fill="#0f0"/></svg>"##).unwrap(),
        );
        let profile = EffectProfile::new()
            .with_shadow(ShadowSettings { enabled: true })
            .with_tone(ToneSettings {
                brightness: 1.1,
                ..ToneSettings::default()
            })
            .with_recolor(RecolorSettings::new("#ff0000", "#0000ff"));

        session.apply_profile(&profile);

        assert!(session.controls().shadow);
        assert!(!session.controls().shine);
        assert_eq!(session.controls().brightness, 1.1);
        assert_eq!(session.export_profile(), profile);
    }
}
