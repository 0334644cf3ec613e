//! SVG serialization with quick-xml.

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};

use super::{Document, NodeId, NodeKind};
use crate::error::ExportError;

impl Document {
    /// Serializes the tree under the root element as SVG markup.
    ///
    /// No XML declaration is written. Elements without children are
    /// written in their self-closing form.
    pub fn to_svg_string(&self) -> Result<String, ExportError> {
        let mut writer = Writer::new(Vec::new());
        self.write_node(&mut writer, self.root)?;
        Ok(String::from_utf8(writer.into_inner())?)
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<(), ExportError> {
        match self.kind(id) {
            NodeKind::Element(element) => {
                let mut start = BytesStart::new(element.name());
                for (key, value) in element.attributes() {
                    start.push_attribute((key, value));
                }

                let children = self.children(id);
                if children.is_empty() {
                    emit(writer, Event::Empty(start))?;
                } else {
                    emit(writer, Event::Start(start))?;
                    for child in children {
                        self.write_node(writer, *child)?;
                    }
                    emit(writer, Event::End(BytesEnd::new(element.name())))?;
                }
            }
            NodeKind::Text(text) => emit(writer, Event::Text(BytesText::new(text)))?,
            NodeKind::CData(data) => emit(writer, Event::CData(BytesCData::new(data.as_str())))?,
            NodeKind::Comment(comment) => {
                emit(writer, Event::Comment(BytesText::from_escaped(comment.as_str())))?
            }
        }
        Ok(())
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), ExportError> {
    writer
        .write_event(event)
        .map_err(|e| ExportError::Xml(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_back_to_equivalent_markup() {
        let input = r##"<svg xmlns="http://www.w3.org/2000/svg"><g id="a"><rect fill="#fff"/></g><!-- note --></svg>"##;
        let doc = Document::parse(input).unwrap();
        assert_eq!(doc.to_svg_string().unwrap(), input);
    }

    #[test]
    fn escapes_special_characters() {
        let doc = Document::parse(r#"<svg><text data-x="a &amp; &quot;b&quot;">1 &lt; 2</text></svg>"#).unwrap();
        let out = doc.to_svg_string().unwrap();
        assert!(out.contains("1 &lt; 2"), "{out}");

        let reparsed = Document::parse(&out).unwrap();
        let text = reparsed.children(reparsed.root())[0];
        assert_eq!(reparsed.attribute(text, "data-x"), Some("a & \"b\""));
    }

    #[test]
    fn keeps_cdata_sections() {
        let input = "<svg><style><![CDATA[.a > .b { fill: red }]]></style></svg>";
        let doc = Document::parse(input).unwrap();
        assert_eq!(doc.to_svg_string().unwrap(), input);
    }
}
