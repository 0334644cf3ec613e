//! Shared effect filter for a document.
//!
//! Every effect is a stage of one `<filter id="master-filter">` chain that is
//! injected once per document and applied to a single wrapper group. After
//! injection, effects are changed by rewriting the attributes of the
//! primitives a stage owns; the chain itself is never rebuilt.
//!
//! # Architecture
//!
//! Each stage config implements [`StageEffect`], which defines:
//! - The primitives it contributes to the chain
//! - How to find those primitives again in an existing filter
//! - How its config and enabled state map onto primitive attributes
//!
//! # Chain
//!
//! ```text
//! SourceGraphic
//!     │
//!     ▼
//! ┌───────────┐
//! │   Shine   │ ◄── flood opacity (0 = off)
//! └─────┬─────┘
//!       ▼
//! ┌───────────┐
//! │ Metallic  │ ◄── grit alpha + R/G/B gate
//! └─────┬─────┘
//!       ▼
//! ┌───────────┐
//! │  Shadow   │ ◄── flood opacity (0 = off)
//! └─────┬─────┘
//!       ▼
//! ┌───────────┐
//! │  Tuning   │ ◄── saturation, contrast slope, brightness intercept
//! └───────────┘
//! ```

mod graph;
mod group;
pub mod metallic;
pub mod shadow;
pub mod shine;
pub mod tuning;

pub use group::{GROUP_ID, ensure_filter_group};
pub use metallic::MetallicConfig;
pub use shadow::ShadowConfig;
pub use shine::ShineConfig;
pub use tuning::TuningConfig;

use crate::document::{Document, NodeId};

/// Id of the shared filter element.
pub const FILTER_ID: &str = "master-filter";

// ============================================================================
// Stage Traits
// ============================================================================

/// Trait for stage configuration types.
pub trait StageConfig: Clone {
    /// Returns true if this config differs from another in a way that
    /// would change any primitive attribute.
    fn differs_from(&self, other: &Self) -> bool;
}

/// Trait for stage configurations that own a part of the filter chain.
pub trait StageEffect: StageConfig {
    /// Typed handles to the primitives this stage mutates.
    type Handles: std::fmt::Debug + Clone;

    /// Stage name used in diagnostics.
    const NAME: &'static str;

    /// Appends this stage's primitives to `filter`.
    ///
    /// Only the structure is written here (ids, inputs, results). Parameters
    /// are written by [`write`](Self::write).
    fn build(doc: &mut Document, filter: NodeId);

    /// Finds this stage's primitives under `filter`.
    ///
    /// Returns `None` if any primitive is missing.
    fn locate(doc: &Document, filter: NodeId) -> Option<Self::Handles>;

    /// Writes the parameters for the given enabled state.
    ///
    /// A disabled stage must leave the chain visually unchanged.
    fn write(&self, enabled: bool, doc: &mut Document, handles: &Self::Handles);
}

// ============================================================================
// Generic Stage
// ============================================================================

/// One stage of the chain with its configuration, enabled state and
/// version.
///
/// The version increments on every change to this stage only, so a change
/// to one effect is observable as leaving every other stage untouched.
#[derive(Debug, Clone)]
pub struct Stage<C: StageEffect> {
    config: C,
    enabled: bool,
    version: u64,
    handles: C::Handles,
}

impl<C: StageEffect> Stage<C> {
    fn locate(doc: &Document, filter: NodeId, config: C, enabled: bool) -> Option<Self> {
        let Some(handles) = C::locate(doc, filter) else {
            log::warn!("{} primitives missing from #{FILTER_ID}", C::NAME);
            return None;
        };
        Some(Self {
            config,
            enabled,
            version: 0,
            handles,
        })
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Returns whether the stage is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the current version number.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn handles(&self) -> &C::Handles {
        &self.handles
    }

    /// Sets whether the stage is enabled.
    ///
    /// Returns true if the enabled state changed.
    pub fn set_enabled(&mut self, doc: &mut Document, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        self.commit(doc);
        true
    }

    /// Sets the configuration. Returns true if it changed.
    pub fn set_config(&mut self, doc: &mut Document, config: C) -> bool {
        if !self.config.differs_from(&config) {
            return false;
        }
        self.config = config;
        self.commit(doc);
        true
    }

    fn commit(&mut self, doc: &mut Document) {
        self.version = self.version.wrapping_add(1);
        self.write(doc);
        log::debug!(
            "{} stage v{} ({})",
            C::NAME,
            self.version,
            if self.enabled { "on" } else { "off" }
        );
    }

    fn write(&self, doc: &mut Document) {
        self.config.write(self.enabled, doc, &self.handles);
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Stage configurations used when a pipeline is injected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    pub shine: ShineConfig,
    pub metallic: MetallicConfig,
    pub shadow: ShadowConfig,
}

/// Snapshot of all stage versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageVersions {
    pub shine: u64,
    pub metallic: u64,
    pub shadow: u64,
    pub tuning: u64,
}

/// The injected filter chain of one document.
///
/// Holds typed handles to every mutable primitive, located once when the
/// pipeline is created. Access stages directly to change effects.
#[derive(Debug, Clone)]
pub struct EffectPipeline {
    /// Soft highlight (first stage).
    pub shine: Stage<ShineConfig>,

    /// Noise texture gated onto the shine output.
    pub metallic: Stage<MetallicConfig>,

    /// Drop shadow of the metallic output.
    pub shadow: Stage<ShadowConfig>,

    /// Saturation, brightness and contrast (last stage).
    pub tuning: Stage<TuningConfig>,

    filter: NodeId,
    adopted: bool,
}

impl EffectPipeline {
    /// Injects the filter chain into `doc`, or adopts the one already there.
    ///
    /// Injection is idempotent: a document that already contains
    /// `#master-filter` keeps its single definition, whose primitives are
    /// located and reset to neutral parameters. Returns `None` if an
    /// existing definition lacks a primitive.
    ///
    /// The returned pipeline is visually a no-op until an effect is enabled.
    pub fn inject(doc: &mut Document, config: &PipelineConfig) -> Option<Self> {
        let (filter, adopted) = match doc.find_by_id(FILTER_ID) {
            Some(filter) => (filter, true),
            None => (graph::build(doc), false),
        };

        let pipeline = Self {
            shine: Stage::locate(doc, filter, config.shine.clone(), false)?,
            metallic: Stage::locate(doc, filter, config.metallic.clone(), false)?,
            shadow: Stage::locate(doc, filter, config.shadow.clone(), false)?,
            tuning: Stage::locate(doc, filter, TuningConfig::default(), true)?,
            filter,
            adopted,
        };
        pipeline.write_all(doc);

        log::info!(
            "{} #{FILTER_ID}",
            if adopted { "adopted existing" } else { "injected" }
        );
        Some(pipeline)
    }

    /// Returns the `<filter>` element.
    pub fn filter(&self) -> NodeId {
        self.filter
    }

    /// Returns true if the filter was already present in the document.
    pub fn is_adopted(&self) -> bool {
        self.adopted
    }

    /// Returns a snapshot of all stage versions.
    pub fn versions(&self) -> StageVersions {
        StageVersions {
            shine: self.shine.version(),
            metallic: self.metallic.version(),
            shadow: self.shadow.version(),
            tuning: self.tuning.version(),
        }
    }

    /// Wraps the document content in the filter group and points the group
    /// at the filter. Safe to call before every effect change.
    pub fn attach(&self, doc: &mut Document) -> NodeId {
        let group = ensure_filter_group(doc);
        doc.set_style_property(group, "filter", &format!("url(#{FILTER_ID})"));
        group
    }

    fn write_all(&self, doc: &mut Document) {
        self.shine.write(doc);
        self.metallic.write(doc);
        self.shadow.write(doc);
        self.tuning.write(doc);
    }
}

/// Formats a filter parameter: shortest decimal form with at most four
/// fractional digits.
pub(crate) fn fmt_num(value: f32) -> String {
    let rounded = (f64::from(value) * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        // Avoids "-0".
        return "0".to_string();
    }
    rounded.to_string()
}

// ============================================================================
// Tests
// ============================================================================
