//! Shine stage: a soft white highlight screened onto the source.

use super::graph::{element, find};
use super::{StageConfig, StageEffect, fmt_num};
use crate::document::{Document, NodeId};

// ============================================================================
// ShineConfig
// ============================================================================

/// Configuration for the shine highlight.
///
/// The source is blurred, masked by a white flood, shifted towards the top
/// left and blurred again, then screen-blended onto the source.
#[derive(Debug, Clone, PartialEq)]
pub struct ShineConfig {
    /// Flood opacity when enabled (0-1).
    pub opacity: f32,
    /// Blur of the source before masking.
    pub spread: f32,
    /// Blur of the shifted highlight.
    pub softness: f32,
    /// Highlight offset `(dx, dy)`.
    pub offset: (f32, f32),
}

impl Default for ShineConfig {
    fn default() -> Self {
        Self {
            opacity: 0.35,
            spread: 40.0,
            softness: 25.0,
            offset: (-25.0, -25.0),
        }
    }
}

impl ShineConfig {
    /// Creates a config with the given highlight opacity.
    pub fn new(opacity: f32) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
            ..Self::default()
        }
    }
}

/// Primitives mutated by the shine stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShineHandles {
    pub spread: NodeId,
    pub flood: NodeId,
    pub offset: NodeId,
    pub softness: NodeId,
}

impl StageConfig for ShineConfig {
    fn differs_from(&self, other: &Self) -> bool {
        self != other
    }
}

impl StageEffect for ShineConfig {
    type Handles = ShineHandles;

    const NAME: &'static str = "shine";

    fn build(doc: &mut Document, filter: NodeId) {
        element(
            doc,
            filter,
            "feGaussianBlur",
            &[("in", "SourceGraphic"), ("result", "shineBlur")],
        );
        element(
            doc,
            filter,
            "feFlood",
            &[("id", "mf-shine-flood"), ("flood-color", "white"), ("result", "shineColor")],
        );
        element(
            doc,
            filter,
            "feComposite",
            &[("in", "shineColor"), ("in2", "shineBlur"), ("operator", "in"), ("result", "shineGradient")],
        );
        element(
            doc,
            filter,
            "feOffset",
            &[("in", "shineGradient"), ("result", "shineOffset")],
        );
        element(
            doc,
            filter,
            "feGaussianBlur",
            &[("in", "shineOffset"), ("result", "shineBlurred")],
        );
        element(
            doc,
            filter,
            "feComposite",
            &[("in", "shineBlurred"), ("in2", "SourceGraphic"), ("operator", "in"), ("result", "shineMasked")],
        );
        element(
            doc,
            filter,
            "feBlend",
            &[("mode", "screen"), ("in", "SourceGraphic"), ("in2", "shineMasked"), ("result", "afterShine")],
        );
    }

    fn locate(doc: &Document, filter: NodeId) -> Option<ShineHandles> {
        Some(ShineHandles {
            spread: find(doc, filter, "result", "shineBlur")?,
            flood: find(doc, filter, "id", "mf-shine-flood")?,
            offset: find(doc, filter, "result", "shineOffset")?,
            softness: find(doc, filter, "result", "shineBlurred")?,
        })
    }

    fn write(&self, enabled: bool, doc: &mut Document, handles: &ShineHandles) {
        let opacity = if enabled { self.opacity } else { 0.0 };

        doc.set_attribute(handles.spread, "stdDeviation", &fmt_num(self.spread));
        doc.set_attribute(handles.flood, "flood-opacity", &fmt_num(opacity));
        doc.set_attribute(handles.offset, "dx", &fmt_num(self.offset.0));
        doc.set_attribute(handles.offset, "dy", &fmt_num(self.offset.1));
        doc.set_attribute(handles.softness, "stdDeviation", &fmt_num(self.softness));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_is_clamped() {
        assert_eq!(ShineConfig::new(2.0).opacity, 1.0);
        assert_eq!(ShineConfig::new(-1.0).opacity, 0.0);
    }

    #[test]
    fn writes_opacity_only_when_enabled() {
        let mut doc = Document::parse("<svg><filter id=\"f\"/></svg>").unwrap();
        let filter = doc.find_by_id("f").unwrap();
        ShineConfig::build(&mut doc, filter);
        let handles = ShineConfig::locate(&doc, filter).unwrap();
        let config = ShineConfig::new(0.5);

        config.write(true, &mut doc, &handles);
        assert_eq!(doc.attribute(handles.flood, "flood-opacity"), Some("0.5"));
        assert_eq!(doc.attribute(handles.offset, "dx"), Some("-25"));
        assert_eq!(doc.attribute(handles.spread, "stdDeviation"), Some("40"));

        config.write(false, &mut doc, &handles);
        assert_eq!(doc.attribute(handles.flood, "flood-opacity"), Some("0"));
    }
}
