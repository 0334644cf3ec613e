//! Construction and lookup of filter primitives.

use super::{FILTER_ID, MetallicConfig, ShadowConfig, ShineConfig, StageEffect, TuningConfig};
use crate::document::{Document, NodeId};

/// Gradient used as the metallic fade mask.
pub(super) const GRADIENT_ID: &str = "metal-rect-grad";

/// Rectangle painted with [`GRADIENT_ID`], referenced by `feImage`.
pub(super) const MASK_SHAPE_ID: &str = "metal-rect-shape";

/// Appends a `<defs>` holding the fade mask and an empty-parameter filter
/// chain to the root. Returns the `<filter>` element.
pub(super) fn build(doc: &mut Document) -> NodeId {
    let root = doc.root();
    let defs = element(doc, root, "defs", &[]);

    let gradient = element(
        doc,
        defs,
        "linearGradient",
        &[("id", GRADIENT_ID), ("x1", "0"), ("y1", "0"), ("x2", "0"), ("y2", "200%")],
    );
    for (offset, color) in [("0%", "white"), ("20%", "white"), ("45%", "gray"), ("100%", "gray")] {
        element(doc, gradient, "stop", &[("offset", offset), ("stop-color", color)]);
    }

    let fill = format!("url(#{GRADIENT_ID})");
    element(
        doc,
        defs,
        "rect",
        &[("id", MASK_SHAPE_ID), ("width", "100%"), ("height", "100%"), ("fill", &fill)],
    );

    let filter = element(
        doc,
        defs,
        "filter",
        &[("id", FILTER_ID), ("color-interpolation-filters", "sRGB")],
    );

    ShineConfig::build(doc, filter);
    MetallicConfig::build(doc, filter);
    ShadowConfig::build(doc, filter);
    TuningConfig::build(doc, filter);

    filter
}

/// Creates an element under `parent` in the root's namespace prefix.
pub(super) fn element(
    doc: &mut Document,
    parent: NodeId,
    local: &str,
    attributes: &[(&str, &str)],
) -> NodeId {
    let name = match doc.element(doc.root()).and_then(|e| e.name().split_once(':')) {
        Some((prefix, _)) => format!("{prefix}:{local}"),
        None => local.to_string(),
    };

    let id = doc.create_element(&name);
    for (key, value) in attributes {
        doc.set_attribute(id, key, value);
    }
    doc.append_child(parent, id);
    id
}

/// Finds the element under `filter` whose `attribute` equals `value`.
pub(super) fn find(doc: &Document, filter: NodeId, attribute: &str, value: &str) -> Option<NodeId> {
    doc.descendants(filter)
        .find(|n| doc.attribute(*n, attribute) == Some(value))
}

/// Returns the `feFuncR`, `feFuncG` and `feFuncB` children of a
/// component transfer.
pub(super) fn rgb_funcs(doc: &Document, transfer: NodeId) -> Option<[NodeId; 3]> {
    let func = |tag: &str| {
        doc.children(transfer)
            .iter()
            .copied()
            .find(|c| doc.tag_name(*c) == Some(tag))
    };
    Some([func("feFuncR")?, func("feFuncG")?, func("feFuncB")?])
}

/// Appends a linear `feFunc*` with an optional id.
pub(super) fn linear_func(doc: &mut Document, transfer: NodeId, tag: &str, id: Option<&str>) -> NodeId {
    match id {
        Some(id) => element(doc, transfer, tag, &[("id", id), ("type", "linear")]),
        None => element(doc, transfer, tag, &[("type", "linear")]),
    }
}
