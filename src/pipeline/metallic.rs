//! Metallic stage: fractal noise grit, faded by a vertical gradient and
//! multiplied onto the shine output.
//!
//! Two switches are driven together by the enabled flag:
//!
//! - the grit alpha transfer (`#mf-metal`): slope 0 produces no grit at all
//! - the R/G/B gate (`#mf-met-gate-*`): slope 1 / intercept 0 lets the
//!   texture through, slope 0 / intercept 1 forces white, which is neutral
//!   for the multiply blend

use super::graph::{MASK_SHAPE_ID, element, find, linear_func, rgb_funcs};
use super::{StageConfig, StageEffect, fmt_num};
use crate::document::{Document, NodeId};

const GATE_IDS: [&str; 3] = ["mf-met-gate-R", "mf-met-gate-G", "mf-met-gate-B"];

/// Configuration for the metallic texture.
#[derive(Debug, Clone, PartialEq)]
pub struct MetallicConfig {
    /// Grit contrast (linear slope on R/G/B).
    pub grit_slope: f32,
    /// Grit brightness (linear intercept on R/G/B).
    pub grit_intercept: f32,
    /// `feTurbulence` base frequency.
    pub base_frequency: f32,
    pub octaves: u32,
    pub seed: u32,
}

impl Default for MetallicConfig {
    fn default() -> Self {
        Self {
            grit_slope: 15.0,
            grit_intercept: -7.0,
            base_frequency: 1.2,
            octaves: 5,
            seed: 1,
        }
    }
}

/// Primitives mutated by the metallic stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetallicHandles {
    pub noise: NodeId,
    pub grit: [NodeId; 3],
    pub grit_alpha: NodeId,
    pub gate: [NodeId; 3],
}

impl StageConfig for MetallicConfig {
    fn differs_from(&self, other: &Self) -> bool {
        self != other
    }
}

impl StageEffect for MetallicConfig {
    type Handles = MetallicHandles;

    const NAME: &'static str = "metallic";

    fn build(doc: &mut Document, filter: NodeId) {
        element(
            doc,
            filter,
            "feTurbulence",
            &[("type", "fractalNoise"), ("result", "rawNoise")],
        );
        element(
            doc,
            filter,
            "feColorMatrix",
            &[("in", "rawNoise"), ("type", "saturate"), ("values", "0"), ("result", "grayNoise")],
        );

        let grit = element(
            doc,
            filter,
            "feComponentTransfer",
            &[("in", "grayNoise"), ("result", "darkGrit")],
        );
        for tag in ["feFuncR", "feFuncG", "feFuncB"] {
            linear_func(doc, grit, tag, None);
        }
        let alpha = linear_func(doc, grit, "feFuncA", Some("mf-metal"));
        doc.set_attribute(alpha, "intercept", "0");

        let href = format!("#{MASK_SHAPE_ID}");
        element(
            doc,
            filter,
            "feImage",
            &[
                ("href", &href),
                ("result", "fadeMask"),
                ("x", "0"),
                ("y", "0"),
                ("width", "100%"),
                ("height", "100%"),
                ("preserveAspectRatio", "none"),
            ],
        );
        element(
            doc,
            filter,
            "feComposite",
            &[
                ("in", "darkGrit"),
                ("in2", "fadeMask"),
                ("operator", "arithmetic"),
                ("k2", "1"),
                ("k3", "1"),
                ("result", "fadedGrit"),
            ],
        );
        element(
            doc,
            filter,
            "feComposite",
            &[("in", "fadedGrit"), ("in2", "SourceGraphic"), ("operator", "in"), ("result", "metalFinalTexture")],
        );

        let gate = element(
            doc,
            filter,
            "feComponentTransfer",
            &[("in", "metalFinalTexture"), ("result", "gatedMetallic")],
        );
        for (tag, id) in ["feFuncR", "feFuncG", "feFuncB"].into_iter().zip(GATE_IDS) {
            linear_func(doc, gate, tag, Some(id));
        }

        element(
            doc,
            filter,
            "feBlend",
            &[("mode", "multiply"), ("in", "gatedMetallic"), ("in2", "afterShine"), ("result", "afterMetal")],
        );
    }

    fn locate(doc: &Document, filter: NodeId) -> Option<MetallicHandles> {
        let grit = find(doc, filter, "result", "darkGrit")?;
        Some(MetallicHandles {
            noise: find(doc, filter, "result", "rawNoise")?,
            grit: rgb_funcs(doc, grit)?,
            grit_alpha: find(doc, filter, "id", "mf-metal")?,
            gate: [
                find(doc, filter, "id", GATE_IDS[0])?,
                find(doc, filter, "id", GATE_IDS[1])?,
                find(doc, filter, "id", GATE_IDS[2])?,
            ],
        })
    }

    fn write(&self, enabled: bool, doc: &mut Document, handles: &MetallicHandles) {
        doc.set_attribute(handles.noise, "baseFrequency", &fmt_num(self.base_frequency));
        doc.set_attribute(handles.noise, "numOctaves", &self.octaves.to_string());
        doc.set_attribute(handles.noise, "seed", &self.seed.to_string());

        for func in handles.grit {
            doc.set_attribute(func, "slope", &fmt_num(self.grit_slope));
            doc.set_attribute(func, "intercept", &fmt_num(self.grit_intercept));
        }

        let (slope, intercept) = if enabled { ("1", "0") } else { ("0", "1") };
        doc.set_attribute(handles.grit_alpha, "slope", slope);
        for func in handles.gate {
            doc.set_attribute(func, "slope", slope);
            doc.set_attribute(func, "intercept", intercept);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Document, MetallicHandles) {
        let mut doc = Document::parse("<svg><filter id=\"f\"/></svg>").unwrap();
        let filter = doc.find_by_id("f").unwrap();
        MetallicConfig::build(&mut doc, filter);
        let handles = MetallicConfig::locate(&doc, filter).unwrap();
        (doc, handles)
    }

    #[test]
    fn closed_gate_is_white() {
        let (mut doc, handles) = setup();
        MetallicConfig::default().write(false, &mut doc, &handles);

        assert_eq!(doc.attribute(handles.grit_alpha, "slope"), Some("0"));
        assert_eq!(doc.attribute(handles.grit_alpha, "intercept"), Some("0"));
        for func in handles.gate {
            assert_eq!(doc.attribute(func, "slope"), Some("0"));
            assert_eq!(doc.attribute(func, "intercept"), Some("1"));
        }
    }

    #[test]
    fn grit_parameters_are_written() {
        let (mut doc, handles) = setup();
        MetallicConfig::default().write(true, &mut doc, &handles);

        assert_eq!(doc.attribute(handles.noise, "baseFrequency"), Some("1.2"));
        assert_eq!(doc.attribute(handles.noise, "numOctaves"), Some("5"));
        assert_eq!(doc.attribute(handles.grit[1], "slope"), Some("15"));
        assert_eq!(doc.attribute(handles.grit[2], "intercept"), Some("-7"));
        assert_eq!(doc.attribute(handles.gate[0], "slope"), Some("1"));
    }

    #[test]
    fn fade_mask_references_shape() {
        let (doc, _) = setup();
        let image = doc
            .elements()
            .find(|n| doc.tag_name(*n) == Some("feImage"))
            .unwrap();
        assert_eq!(doc.attribute(image, "href"), Some("#metal-rect-shape"));
    }
}
