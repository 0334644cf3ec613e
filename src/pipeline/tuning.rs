//! Color tuning stage: saturation, then contrast and brightness per channel.

use super::graph::{element, find, linear_func, rgb_funcs};
use super::{StageConfig, StageEffect, fmt_num};
use crate::document::{Document, NodeId};

/// Configuration for color tuning. `1.0` is neutral for every field.
#[derive(Debug, Clone, PartialEq)]
pub struct TuningConfig {
    /// `feColorMatrix type="saturate"` value.
    pub saturation: f32,
    /// Written as the linear intercept `brightness - 1`.
    pub brightness: f32,
    /// Written as the linear slope.
    pub contrast: f32,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            brightness: 1.0,
            contrast: 1.0,
        }
    }
}

impl TuningConfig {
    pub fn is_neutral(&self) -> bool {
        !self.differs_from(&Self::default())
    }
}

/// Primitives mutated by the tuning stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuningHandles {
    pub saturation: NodeId,
    pub channels: [NodeId; 3],
}

impl StageConfig for TuningConfig {
    fn differs_from(&self, other: &Self) -> bool {
        (self.saturation - other.saturation).abs() > 0.0001
            || (self.brightness - other.brightness).abs() > 0.0001
            || (self.contrast - other.contrast).abs() > 0.0001
    }
}

impl StageEffect for TuningConfig {
    type Handles = TuningHandles;

    const NAME: &'static str = "tuning";

    fn build(doc: &mut Document, filter: NodeId) {
        element(
            doc,
            filter,
            "feColorMatrix",
            &[("id", "mf-saturation"), ("in", "afterShadow"), ("type", "saturate"), ("result", "afterSaturation")],
        );
        let contrast = element(
            doc,
            filter,
            "feComponentTransfer",
            &[("id", "mf-contrast"), ("in", "afterSaturation")],
        );
        for tag in ["feFuncR", "feFuncG", "feFuncB"] {
            linear_func(doc, contrast, tag, None);
        }
    }

    fn locate(doc: &Document, filter: NodeId) -> Option<TuningHandles> {
        let contrast = find(doc, filter, "id", "mf-contrast")?;
        Some(TuningHandles {
            saturation: find(doc, filter, "id", "mf-saturation")?,
            channels: rgb_funcs(doc, contrast)?,
        })
    }

    fn write(&self, enabled: bool, doc: &mut Document, handles: &TuningHandles) {
        let neutral = TuningConfig::default();
        let config = if enabled { self } else { &neutral };

        doc.set_attribute(handles.saturation, "values", &fmt_num(config.saturation));
        for func in handles.channels {
            doc.set_attribute(func, "slope", &fmt_num(config.contrast));
            doc.set_attribute(func, "intercept", &fmt_num(config.brightness - 1.0));
        }
    }
}
