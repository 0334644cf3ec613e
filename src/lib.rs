//! svg-paint: interactive recoloring and filter effects for SVG images
//!
//! This crate loads an SVG document, derives a frequency-ranked palette of
//! its fill colors, recolors regions by palette entry, and applies a shared
//! filter chain (shine, metallic texture, drop shadow, color tuning) before
//! exporting a standalone SVG.
//!
//! # Example
//!
//! ```
//! use svg_paint::{Panel, Session, SessionConfig, UploadFile};
//!
//! let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8">
//!     <rect width="8" height="8" fill="#fff"/>
//!     <circle cx="4" cy="4" r="2" fill="rgb(255, 255, 255)"/>
//!     <path d="M0 0 H2 V2 Z" fill="#000"/>
//! </svg>"##;
//!
//! let mut session = Session::new(SessionConfig::default());
//! session.load(UploadFile::new("art.svg", "image/svg+xml", svg)).unwrap();
//!
//! // "#000000" is on the default restricted list
//! assert_eq!(session.find_swatch(Panel::Ordinary, 0).unwrap().count, 2);
//! assert_eq!(session.find_swatch(Panel::Restricted, 0).unwrap().count, 1);
//!
//! session.edit_swatch(Panel::Ordinary, 0, "#cc3300").unwrap();
//! session.set_metallic(true);
//! session.set_contrast(1.2);
//!
//! let artifact = session.export().unwrap().unwrap();
//! assert!(artifact.contents.contains("master-filter"));
//! ```
//!
//! # Serializable Profiles
//!
//! Effect settings and palette edits round-trip through [`EffectProfile`]
//! with the [`Configurable`] trait:
//!
//! ```
//! use svg_paint::{Configurable, Document, EffectProfile, Session, SessionConfig, ShadowSettings};
//!
//! let doc = Document::parse(r##"<svg><rect fill="#f80"/></svg>"##).unwrap();
//! let mut session = Session::with_document(SessionConfig::default(), doc);
//!
//! let profile = EffectProfile::new().with_shadow(ShadowSettings { enabled: true });
//! session.apply_profile(&profile);
//!
//! let json = session.export_profile().to_json().unwrap();
//! assert_eq!(json, r#"{"shadow":{"enabled":true}}"#);
//! ```

pub mod color;
pub mod document;
pub mod pipeline;

mod config;
mod error;
mod export;
mod profile;
mod region;
mod session;

#[cfg(feature = "cli")]
pub mod logging;

pub use color::{CanonicalColor, Palette, ParseColorError, build_palette, normalize};
pub use config::{DEFAULT_EXPORT_FILENAME, DEFAULT_RESTRICTED_COLORS, SessionConfig};
pub use document::{ComputedStyle, Document, Element, NodeId, NodeKind, Paint, StyleMap};
pub use error::{ConfigError, DocumentError, ExportError, SessionError, UploadError};
pub use export::{Artifact, EXPORT_MIME, export};
pub use pipeline::{
    EffectPipeline, MetallicConfig, PipelineConfig, ShadowConfig, ShineConfig, Stage, StageConfig,
    StageEffect, TuningConfig,
};
pub use profile::{
    EffectProfile, MetallicSettings, RecolorSettings, ShadowSettings, ShineSettings, ToneSettings,
};
pub use region::{CollisionPolicy, RegionIndex, scan_fills};
pub use session::{
    Configurable, EffectControls, FileMeta, Panel, SVG_MIME, Session, SessionState, Swatch,
    UploadFile, UploadTicket,
};
