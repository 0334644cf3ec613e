//! Error types for document, upload, session and export operations.

use thiserror::Error;

/// Errors raised while parsing an SVG document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// XML reader or writer error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute list
    #[error("Invalid attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document has no root element
    #[error("Document has no root element")]
    NoRoot,

    /// The root element is not `<svg>`
    #[error("Root element is <{0}>, expected <svg>")]
    NotSvg(String),

    /// A second top-level element follows the root
    #[error("Unexpected element <{0}> after the root element")]
    MultipleRoots(String),

    /// The input ended with open elements
    #[error("Unexpected end of input: <{0}> is not closed")]
    UnclosedElement(String),
}

/// Reasons an upload is rejected before any state changes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Exactly one file must be provided
    #[error("Expected exactly one file, got {0}")]
    FileCount(usize),

    /// The declared type is not an SVG image
    #[error("Unsupported file type '{mime}' for '{name}'")]
    UnsupportedType {
        /// The file name as provided by the caller
        name: String,
        /// The declared MIME type
        mime: String,
    },
}

/// Errors surfaced by [`Session`](crate::Session) operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The upload was rejected
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// A newer upload started after this one
    #[error("Upload superseded by a newer upload")]
    Superseded,

    /// The new color value could not be normalized
    #[error("Unrecognized color value '{0}'")]
    InvalidColor(String),

    /// No swatch exists at the requested position or with the requested color
    #[error("No swatch matches {0}")]
    UnknownSwatch(String),

    /// The operation requires a document with a palette
    #[error("Session is not ready")]
    NotReady,
}

/// Errors raised while producing or writing an export artifact.
#[derive(Error, Debug)]
pub enum ExportError {
    /// XML serialization error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Serialized output is not UTF-8
    #[error("Serialized document is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// I/O error while writing the artifact
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact does not render as a standalone SVG
    #[error("Exported SVG does not render: {0}")]
    Invalid(String),
}

/// Errors raised while loading a [`SessionConfig`](crate::SessionConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The content is not a valid configuration
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
