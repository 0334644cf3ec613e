//! Shadow stage: a drop shadow of the metallic output.

use super::graph::{element, find};
use super::{StageConfig, StageEffect, fmt_num};
use crate::document::{Document, NodeId};

/// Configuration for the drop shadow.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowConfig {
    /// Flood opacity when enabled (0-1).
    pub opacity: f32,
    pub dx: f32,
    pub dy: f32,
    /// Blur radius (`stdDeviation`).
    pub blur: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            opacity: 0.25,
            dx: 0.0,
            dy: 4.0,
            blur: 6.0,
        }
    }
}

impl ShadowConfig {
    /// Creates a config with the given shadow opacity.
    pub fn new(opacity: f32) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
            ..Self::default()
        }
    }
}

impl StageConfig for ShadowConfig {
    fn differs_from(&self, other: &Self) -> bool {
        self != other
    }
}

impl StageEffect for ShadowConfig {
    type Handles = NodeId;

    const NAME: &'static str = "shadow";

    fn build(doc: &mut Document, filter: NodeId) {
        element(
            doc,
            filter,
            "feDropShadow",
            &[("id", "mf-shadow"), ("in", "afterMetal"), ("result", "afterShadow")],
        );
    }

    fn locate(doc: &Document, filter: NodeId) -> Option<NodeId> {
        find(doc, filter, "id", "mf-shadow")
    }

    fn write(&self, enabled: bool, doc: &mut Document, shadow: &NodeId) {
        let opacity = if enabled { self.opacity } else { 0.0 };

        doc.set_attribute(*shadow, "dx", &fmt_num(self.dx));
        doc.set_attribute(*shadow, "dy", &fmt_num(self.dy));
        doc.set_attribute(*shadow, "stdDeviation", &fmt_num(self.blur));
        doc.set_attribute(*shadow, "flood-opacity", &fmt_num(opacity));
    }
}
