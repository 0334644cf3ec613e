//! The wrapper group the shared filter is applied to.

use super::graph::element;
use crate::document::{Document, NodeId};

/// Id of the wrapper group.
pub const GROUP_ID: &str = "filter-group";

/// Root children that stay outside the group.
const UNGROUPED: &[&str] = &["defs", "style", "metadata", "title", "desc", "script"];

/// Returns the filter group, creating it on first use.
///
/// A new group takes every root child except definitions and metadata, in
/// their original order, and sits where the first of them was.
pub fn ensure_filter_group(doc: &mut Document) -> NodeId {
    if let Some(group) = doc.find_by_id(GROUP_ID) {
        return group;
    }

    let root = doc.root();
    let content: Vec<NodeId> = doc
        .children(root)
        .iter()
        .copied()
        .filter(|c| !doc.tag_name(*c).is_some_and(|name| UNGROUPED.contains(&name)))
        .collect();
    let position = content
        .first()
        .and_then(|first| doc.children(root).iter().position(|c| c == first))
        .unwrap_or(doc.children(root).len());

    let group = element(doc, root, "g", &[("id", GROUP_ID)]);
    doc.insert_child(root, position, group);
    for child in content {
        doc.append_child(group, child);
    }

    log::debug!("created #{GROUP_ID}");
    group
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_names(doc: &Document, id: NodeId) -> Vec<String> {
        doc.children(id)
            .iter()
            .filter_map(|c| doc.tag_name(*c).map(str::to_string))
            .collect()
    }

    #[test]
    fn wraps_content_in_order() {
        let mut doc = Document::parse(
            r#"<svg><title>x</title><rect/><defs/><circle/><style/><path/></svg>"#,
        )
        .unwrap();
        let group = ensure_filter_group(&mut doc);

        assert_eq!(child_names(&doc, doc.root()), ["title", "g", "defs", "style"]);
        assert_eq!(child_names(&doc, group), ["rect", "circle", "path"]);
    }

    #[test]
    fn is_idempotent() {
        let mut doc = Document::parse("<svg><rect/></svg>").unwrap();
        let group = ensure_filter_group(&mut doc);
        let revision = doc.revision();

        assert_eq!(ensure_filter_group(&mut doc), group);
        assert_eq!(doc.revision(), revision);
        assert_eq!(doc.children(doc.root()), [group]);
    }

    #[test]
    fn empty_document_gets_empty_group() {
        let mut doc = Document::parse("<svg/>").unwrap();
        let group = ensure_filter_group(&mut doc);
        assert_eq!(doc.parent(group), Some(doc.root()));
        assert!(doc.children(group).is_empty());
    }
}
