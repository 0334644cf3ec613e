//! Standalone SVG export.

use std::fs;
use std::path::{Path, PathBuf};

use resvg::usvg::{Options, Tree};

use crate::document::{Document, Paint, SVG_NAMESPACE, StyleMap};
use crate::error::ExportError;

/// MIME type of export artifacts.
pub const EXPORT_MIME: &str = "image/svg+xml;charset=utf-8";

/// A serialized document ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub mime_type: String,
    pub contents: String,
}

impl Artifact {
    /// Writes the artifact into `dir` under its file name and returns the
    /// written path.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let path = dir.as_ref().join(&self.filename);
        fs::write(&path, &self.contents)?;
        Ok(path)
    }

    /// Checks that the artifact parses as a standalone SVG.
    pub fn validate(&self) -> Result<(), ExportError> {
        Tree::from_str(&self.contents, &Options::default())
            .map(|_| ())
            .map_err(|e| ExportError::Invalid(e.to_string()))
    }
}

/// Serializes a copy of `doc` with its rendered presentation inlined.
///
/// Every element of the copy gets explicit `fill`, `stroke` and `filter`
/// attributes holding its rendered values, except where the value is
/// `none`. The live document is not modified. Returns `Ok(None)` when the
/// root has no child elements.
pub fn export(doc: &Document, filename: &str) -> Result<Option<Artifact>, ExportError> {
    let root = doc.root();
    if !doc.children(root).iter().any(|c| doc.element(*c).is_some()) {
        return Ok(None);
    }

    let styles = StyleMap::compute(doc);
    let mut copy = doc.clone();

    if copy.attribute(root, "xmlns").is_none() {
        copy.set_attribute(root, "xmlns", SVG_NAMESPACE);
    }

    for id in doc.elements() {
        let Some(style) = styles.get(id) else {
            continue;
        };
        if let Some(fill) = paint_attribute(&style.fill) {
            copy.set_attribute(id, "fill", &fill);
        }
        if let Some(stroke) = paint_attribute(&style.stroke) {
            copy.set_attribute(id, "stroke", &stroke);
        }
        if let Some(filter) = &style.filter {
            copy.set_attribute(id, "filter", filter);
        }
    }

    Ok(Some(Artifact {
        filename: filename.to_string(),
        mime_type: EXPORT_MIME.to_string(),
        contents: copy.to_svg_string()?,
    }))
}

fn paint_attribute(paint: &Paint) -> Option<String> {
    match paint {
        Paint::None => None,
        Paint::Url(url) => Some(format!("url({url})")),
        Paint::Color(_) => Some(paint.to_css()),
    }
}
