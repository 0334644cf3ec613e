//! Mutable SVG document tree.
//!
//! A [`Document`] is an arena of nodes addressed by [`NodeId`]. Handles stay
//! valid for the lifetime of the document, including across moves between
//! parents, and a cloned document shares the same handles as its source.
//! Every mutation bumps [`Document::revision`].

mod parse;
mod serialize;
pub mod style;

pub use style::{ComputedStyle, Paint, StyleMap};

/// The SVG namespace URI.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Element names that paint a fill and can be recolored.
const DRAWABLE: &[&str] = &[
    "path", "rect", "circle", "ellipse", "line", "polyline", "polygon", "text", "tspan",
    "textPath", "use",
];

/// Containers whose content is never rendered directly.
const NON_RENDERED: &[&str] = &[
    "defs",
    "clipPath",
    "mask",
    "pattern",
    "marker",
    "symbol",
    "linearGradient",
    "radialGradient",
    "filter",
    "metadata",
    "title",
    "desc",
    "style",
    "script",
];

// ============================================================================
// Nodes
// ============================================================================

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena index of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

/// An element with its qualified name and ordered attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Returns the qualified name, including any prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> bool {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) if existing == value => false,
            Some((_, existing)) => {
                *existing = value.to_string();
                true
            }
            None => {
                self.attributes.push((name.to_string(), value.to_string()));
                true
            }
        }
    }

    fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(pos).1)
    }
}

/// The content of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// ============================================================================
// Document
// ============================================================================

/// A loaded SVG image as a mutable tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    revision: u64,
}

impl Document {
    /// Creates a document holding only a root element.
    pub fn new(root: Element) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element(root),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            revision: 0,
        }
    }

    /// Returns the root `<svg>` element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns a counter that changes whenever the document is mutated.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the local (unprefixed) tag name of an element node.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::local_name)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attribute(name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Iterates over `id` and all its descendants in document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }

    /// Iterates over every element reachable from the root, in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(self.root)
            .filter(|id| self.element(*id).is_some())
    }

    /// Finds the first attached element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements().find(|n| self.attribute(*n, "id") == Some(id))
    }

    /// Returns the drawable elements that carry a fill, in document order.
    ///
    /// Content of non-rendered containers (`defs`, gradients, masks, ...)
    /// is skipped.
    pub fn regions(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            let Some(name) = self.tag_name(id) else {
                continue;
            };
            if NON_RENDERED.contains(&name) {
                continue;
            }
            if DRAWABLE.contains(&name) {
                out.push(id);
            }
            stack.extend(self.children(id).iter().rev());
        }

        out
    }

    // ---- Mutation ----

    /// Sets an attribute. Returns true if the value changed.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let changed = match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => element.set_attribute(name, value),
            _ => false,
        };
        if changed {
            self.touch();
        }
        changed
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        let removed = match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => element.remove_attribute(name),
            _ => None,
        };
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Returns a property declared in the element's inline `style`.
    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        let style = self.attribute(id, "style")?;
        style::parse_declarations(style)
            .into_iter()
            .rev()
            .find(|d| d.property == property)
            .map(|d| d.value)
    }

    /// Sets a property in the element's inline `style`, replacing any
    /// previous declaration of it. Other declarations are kept in order.
    pub fn set_style_property(&mut self, id: NodeId, property: &str, value: &str) -> bool {
        if self.element(id).is_none() {
            return false;
        }

        let mut declarations: Vec<_> = self
            .attribute(id, "style")
            .map(style::parse_declarations)
            .unwrap_or_default()
            .into_iter()
            .filter(|d| d.property != property)
            .collect();
        declarations.push(style::Declaration::new(property, value));

        let style = style::serialize_declarations(&declarations);
        self.set_attribute(id, "style", &style)
    }

    /// Creates a detached element. Attach it with [`append_child`](Self::append_child).
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create_node(NodeKind::Element(Element::new(name)))
    }

    fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        self.touch();
        id
    }

    /// Moves `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    /// Moves `child` to position `index` among `parent`'s children.
    ///
    /// The index is interpreted after `child` is detached from its current
    /// parent, and is clamped to the number of children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if parent == child || self.descendants(child).any(|n| n == parent) {
            return;
        }
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        self.touch();
    }

    /// Removes `id` from its parent. The node and its subtree stay in the arena.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Pre-order iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.doc.children(id).iter().rev());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10">
  <defs><linearGradient id="g"><stop offset="0" stop-color="red"/></linearGradient></defs>
  <g id="body"><rect id="a" fill="#f00"/><circle id="b"/></g>
  <text id="t">Hi <tspan id="ts">there</tspan></text>
</svg>"##;

    #[test]
    fn regions_skip_non_rendered_content() {
        let doc = Document::parse(SAMPLE).unwrap();
        let ids: Vec<_> = doc
            .regions()
            .into_iter()
            .map(|n| doc.attribute(n, "id").unwrap())
            .collect();
        assert_eq!(ids, ["a", "b", "t", "ts"]);
    }

    #[test]
    fn find_by_id_and_tag_name() {
        let doc = Document::parse(SAMPLE).unwrap();
        let rect = doc.find_by_id("a").unwrap();
        assert_eq!(doc.tag_name(rect), Some("rect"));
        assert_eq!(doc.parent(rect), doc.find_by_id("body"));
        assert!(doc.find_by_id("missing").is_none());
    }

    #[test]
    fn style_properties_are_upserted() {
        let mut doc = Document::parse(r#"<svg><rect style="stroke: blue; fill: red"/></svg>"#).unwrap();
        let rect = doc.children(doc.root())[0];

        assert_eq!(doc.style_property(rect, "fill").as_deref(), Some("red"));
        assert!(doc.set_style_property(rect, "fill", "#00ff00"));
        assert_eq!(doc.attribute(rect, "style"), Some("stroke: blue; fill: #00ff00"));
        assert!(!doc.set_style_property(rect, "fill", "#00ff00"));
    }

    #[test]
    fn moving_nodes_keeps_handles() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        let rect = doc.find_by_id("a").unwrap();
        let root = doc.root();

        doc.append_child(root, rect);
        assert_eq!(doc.parent(rect), Some(root));
        assert_eq!(doc.children(root).last(), Some(&rect));
        assert_eq!(doc.attribute(rect, "fill"), Some("#f00"));
    }

    #[test]
    fn cannot_move_node_into_itself() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        let group = doc.find_by_id("body").unwrap();
        let rect = doc.find_by_id("a").unwrap();

        doc.append_child(rect, group);
        assert_eq!(doc.parent(rect), Some(group));
        assert_eq!(doc.parent(group), Some(doc.root()));
    }

    #[test]
    fn mutations_bump_revision() {
        let mut doc = Document::parse(SAMPLE).unwrap();
        let rect = doc.find_by_id("a").unwrap();
        let before = doc.revision();

        assert!(!doc.set_attribute(rect, "fill", "#f00"));
        assert_eq!(doc.revision(), before);

        doc.set_attribute(rect, "fill", "#0f0");
        assert_ne!(doc.revision(), before);
    }

    #[test]
    fn clone_is_independent() {
        let doc = Document::parse(SAMPLE).unwrap();
        let mut copy = doc.clone();
        let rect = doc.find_by_id("a").unwrap();

        copy.set_attribute(rect, "fill", "#00f");
        assert_eq!(doc.attribute(rect, "fill"), Some("#f00"));
        assert_eq!(copy.attribute(rect, "fill"), Some("#00f"));
    }
}
