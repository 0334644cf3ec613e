//! SVG parsing with quick-xml.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{Document, Element, NodeId, NodeKind};
use crate::error::DocumentError;

impl Document {
    /// Parses SVG markup into a document.
    ///
    /// The root element must be `<svg>` (any prefix). Text, CDATA and
    /// comments inside the root are kept; the prolog is dropped. Entity
    /// references that cannot be expanded are kept verbatim.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(text);
        let mut doc: Option<Document> = None;
        let mut stack: Vec<NodeId> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    let id = open_element(&mut doc, &stack, &start)?;
                    stack.push(id);
                }
                Event::Empty(start) => {
                    open_element(&mut doc, &stack, &start)?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(text) => {
                    let content = text
                        .unescape()
                        .map(Cow::into_owned)
                        .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned());
                    append_leaf(&mut doc, &stack, NodeKind::Text(content));
                }
                Event::CData(data) => {
                    let content = String::from_utf8_lossy(&data).into_owned();
                    append_leaf(&mut doc, &stack, NodeKind::CData(content));
                }
                Event::Comment(comment) => {
                    let content = String::from_utf8_lossy(&comment).into_owned();
                    append_leaf(&mut doc, &stack, NodeKind::Comment(content));
                }
                Event::Eof => break,
                // Declarations, processing instructions and doctypes are dropped.
                _ => {}
            }
        }

        let doc = doc.ok_or(DocumentError::NoRoot)?;
        if let Some(&open) = stack.last() {
            let name = doc.element(open).map(|e| e.name().to_string()).unwrap_or_default();
            return Err(DocumentError::UnclosedElement(name));
        }

        Ok(doc)
    }
}

fn open_element(
    doc: &mut Option<Document>,
    stack: &[NodeId],
    start: &BytesStart<'_>,
) -> Result<NodeId, DocumentError> {
    let element = read_element(start)?;

    match (doc.as_mut(), stack.last()) {
        (Some(doc), Some(&parent)) => {
            let id = doc.create_node(NodeKind::Element(element));
            doc.append_child(parent, id);
            Ok(id)
        }
        (Some(_), None) => Err(DocumentError::MultipleRoots(element.name)),
        (None, _) => {
            if element.local_name() != "svg" {
                return Err(DocumentError::NotSvg(element.name));
            }
            let created = Document::new(element);
            let root = created.root();
            *doc = Some(created);
            Ok(root)
        }
    }
}

fn read_element(start: &BytesStart<'_>) -> Result<Element, DocumentError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));

    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map(Cow::into_owned)
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        element.attributes.push((key, value));
    }

    Ok(element)
}

/// Appends a non-element node to the open element. Content outside the root
/// element is dropped.
fn append_leaf(doc: &mut Option<Document>, stack: &[NodeId], kind: NodeKind) {
    if let (Some(doc), Some(&parent)) = (doc.as_mut(), stack.last()) {
        let id = doc.create_node(kind);
        doc.append_child(parent, id);
    }
}
