//! Session controller: upload, palette editing and effect wiring.

use serde::{Deserialize, Serialize};

use crate::color::{CanonicalColor, Palette, build_palette, normalize};
use crate::config::SessionConfig;
use crate::document::{Document, StyleMap};
use crate::error::{ExportError, SessionError, UploadError};
use crate::export::{self, Artifact};
use crate::pipeline::{EffectPipeline, TuningConfig, ensure_filter_group};
use crate::profile::{
    EffectProfile, MetallicSettings, RecolorSettings, ShadowSettings, ShineSettings, ToneSettings,
};
use crate::region::{RegionIndex, scan_fills};

/// MIME type accepted for uploads.
pub const SVG_MIME: &str = "image/svg+xml";

// ============================================================================
// Configurable Trait
// ============================================================================

/// Trait for types that can be configured from an [`EffectProfile`].
pub trait Configurable {
    /// Applies a profile's settings to this instance.
    fn apply_profile(&mut self, profile: &EffectProfile);

    /// Exports the current settings as a profile.
    fn export_profile(&self) -> EffectProfile;
}

// ============================================================================
// Session Types
// ============================================================================

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No document.
    #[default]
    Empty,
    /// A document is loaded (or failed to parse) but has no paint colors.
    Loaded,
    /// The palette, region index and pipeline exist.
    Ready,
}

/// Metadata of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    /// Declared MIME type.
    pub mime: String,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, mime: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
        }
    }

    /// Returns true if the declared type is `image/svg+xml`, ignoring
    /// parameters and case.
    pub fn is_svg(&self) -> bool {
        self.mime
            .split(';')
            .next()
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(SVG_MIME))
    }
}

/// An uploaded file with its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub meta: FileMeta,
    pub contents: String,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            meta: FileMeta::new(name, mime),
            contents: contents.into(),
        }
    }
}

/// Proof of an accepted upload, redeemed by [`Session::complete_upload`].
///
/// Starting another upload invalidates every earlier ticket.
#[derive(Debug, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
}

/// The two swatch panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Ordinary,
    Restricted,
}

/// One editable palette entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swatch {
    pub panel: Panel,
    /// Color found in the document.
    pub original: CanonicalColor,
    /// Color after edits.
    pub current: CanonicalColor,
    /// Number of regions found with the original color.
    pub count: usize,
}

/// State of the effect controls. Defaults are off and neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectControls {
    pub shine: bool,
    pub shadow: bool,
    pub metallic: bool,
    pub saturation: f32,
    pub brightness: f32,
    pub contrast: f32,
}

impl Default for EffectControls {
    fn default() -> Self {
        Self {
            shine: false,
            shadow: false,
            metallic: false,
            saturation: 1.0,
            brightness: 1.0,
            contrast: 1.0,
        }
    }
}

impl EffectControls {
    fn tuning(&self) -> TuningConfig {
        TuningConfig {
            saturation: self.saturation,
            brightness: self.brightness,
            contrast: self.contrast,
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Owns one loaded document and everything derived from it.
///
/// All derived state (palette, swatches, region index, pipeline, controls)
/// is replaced as a whole when a new upload starts.
///
/// # Example
///
/// ```
/// use svg_paint::{Session, SessionConfig, SessionState, UploadFile};
///
/// let mut session = Session::new(SessionConfig::default());
/// let svg = r##"<svg xmlns="http://www.w3.org/2000/svg"><rect fill="#f00"/></svg>"##;
/// session.load(UploadFile::new("art.svg", "image/svg+xml", svg)).unwrap();
/// assert_eq!(session.state(), SessionState::Ready);
///
/// session.recolor("#ff0000", "#336699").unwrap();
/// session.set_shine(true);
///
/// let artifact = session.export().unwrap().unwrap();
/// assert_eq!(artifact.filename, "customized.svg");
/// ```
#[derive(Debug, Default)]
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    generation: u64,
    pending: Option<u64>,
    document: Option<Document>,
    palette: Palette,
    swatches: Vec<Swatch>,
    index: RegionIndex,
    pipeline: Option<EffectPipeline>,
    controls: EffectControls,
    last_export: Option<(u64, Artifact)>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Starts a session from a document that is already present.
    pub fn with_document(config: SessionConfig, document: Document) -> Self {
        let mut session = Self::new(config);
        session.initialize(document);
        session
    }

    // ---- Uploads ----

    /// Validates an upload and resets the session for it.
    ///
    /// On rejection nothing changes. On success every earlier ticket is
    /// superseded and the session is `Empty` until
    /// [`complete_upload`](Self::complete_upload).
    pub fn begin_upload(&mut self, files: &[FileMeta]) -> Result<UploadTicket, SessionError> {
        let file = match files {
            [file] => file,
            _ => {
                log::warn!("rejected upload of {} files", files.len());
                return Err(UploadError::FileCount(files.len()).into());
            }
        };
        if !file.is_svg() {
            log::warn!("rejected upload '{}' of type '{}'", file.name, file.mime);
            return Err(UploadError::UnsupportedType {
                name: file.name.clone(),
                mime: file.mime.clone(),
            }
            .into());
        }

        self.reset();
        self.pending = Some(self.generation);
        log::info!("upload '{}' started", file.name);

        Ok(UploadTicket {
            generation: self.generation,
        })
    }

    /// Finishes an upload with the file's content.
    ///
    /// Content that does not parse leaves the session `Loaded` without a
    /// document.
    pub fn complete_upload(
        &mut self,
        ticket: UploadTicket,
        contents: &str,
    ) -> Result<SessionState, SessionError> {
        if self.pending != Some(ticket.generation) {
            log::debug!("discarding superseded upload");
            return Err(SessionError::Superseded);
        }
        self.pending = None;

        match Document::parse(contents) {
            Ok(document) => self.initialize(document),
            Err(e) => {
                log::warn!("uploaded file is not a usable SVG: {e}");
                self.state = SessionState::Loaded;
            }
        }
        Ok(self.state)
    }

    /// Validates and loads a file in one step.
    pub fn load(&mut self, file: UploadFile) -> Result<SessionState, SessionError> {
        let ticket = self.begin_upload(std::slice::from_ref(&file.meta))?;
        self.complete_upload(ticket, &file.contents)
    }

    /// Discards the document and all derived state. Pending uploads are
    /// superseded.
    pub fn reset(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pending = None;
        self.state = SessionState::Empty;
        self.document = None;
        self.palette = Palette::default();
        self.swatches.clear();
        self.index = RegionIndex::default();
        self.pipeline = None;
        self.controls = EffectControls::default();
        self.last_export = None;
    }

    fn initialize(&mut self, mut document: Document) {
        self.state = SessionState::Loaded;

        let styles = StyleMap::compute(&document);
        let fills = scan_fills(&document, &styles);
        let palette = build_palette(&fills, &self.config.restricted_colors);
        if palette.is_empty() {
            log::info!("document has no paint colors");
            self.document = Some(document);
            return;
        }

        self.palette = palette;
        self.index = RegionIndex::build(&document, &styles, self.config.collision);
        self.swatches = self.build_swatches();

        // The group only points at the filter once an effect changes.
        ensure_filter_group(&mut document);
        self.pipeline = EffectPipeline::inject(&mut document, &self.config.pipeline_config());

        self.document = Some(document);
        self.state = SessionState::Ready;
        log::info!(
            "session ready: {} ordinary, {} restricted colors",
            self.palette.ordinary.len(),
            self.palette.restricted.len()
        );
    }

    fn build_swatches(&self) -> Vec<Swatch> {
        let entries = |colors: &[CanonicalColor], panel: Panel| {
            colors
                .iter()
                .map(|color| Swatch {
                    panel,
                    original: *color,
                    current: *color,
                    count: self.palette.count(color),
                })
                .collect::<Vec<_>>()
        };

        let mut swatches = entries(&self.palette.ordinary, Panel::Ordinary);
        swatches.extend(entries(&self.palette.restricted, Panel::Restricted));
        swatches
    }

    // ---- Accessors ----

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Returns all swatches: the ordinary panel, then the restricted panel.
    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    /// Returns the swatch at `position` within `panel`.
    pub fn find_swatch(&self, panel: Panel, position: usize) -> Option<&Swatch> {
        self.swatches.iter().filter(|s| s.panel == panel).nth(position)
    }

    pub fn regions(&self) -> &RegionIndex {
        &self.index
    }

    pub fn pipeline(&self) -> Option<&EffectPipeline> {
        self.pipeline.as_ref()
    }

    pub fn controls(&self) -> &EffectControls {
        &self.controls
    }

    // ---- Palette ----

    /// Repaints every region of a swatch. Returns the number of regions.
    pub fn edit_swatch(
        &mut self,
        panel: Panel,
        position: usize,
        color: &str,
    ) -> Result<usize, SessionError> {
        if self.state != SessionState::Ready {
            return Err(SessionError::NotReady);
        }
        let new = normalize(color).ok_or_else(|| SessionError::InvalidColor(color.to_string()))?;
        let slot = self
            .swatches
            .iter()
            .enumerate()
            .filter(|(_, s)| s.panel == panel)
            .nth(position)
            .map(|(i, _)| i)
            .ok_or_else(|| SessionError::UnknownSwatch(format!("{panel:?} #{position}")))?;

        Ok(self.repaint(slot, new))
    }

    /// Repaints the swatch whose current color is `from`.
    pub fn recolor(&mut self, from: &str, to: &str) -> Result<usize, SessionError> {
        if self.state != SessionState::Ready {
            return Err(SessionError::NotReady);
        }
        let old = normalize(from).ok_or_else(|| SessionError::InvalidColor(from.to_string()))?;
        let new = normalize(to).ok_or_else(|| SessionError::InvalidColor(to.to_string()))?;
        let slot = self
            .swatches
            .iter()
            .position(|s| s.current == old)
            .ok_or_else(|| SessionError::UnknownSwatch(from.to_string()))?;

        Ok(self.repaint(slot, new))
    }

    fn repaint(&mut self, slot: usize, new: CanonicalColor) -> usize {
        let Some(document) = self.document.as_mut() else {
            return 0;
        };
        let swatch = &mut self.swatches[slot];
        let count = self.index.recolor(document, swatch.current, new);
        swatch.current = new;
        count
    }

    // ---- Effects ----

    /// Turns the shine highlight on or off. Returns true if anything changed.
    pub fn set_shine(&mut self, enabled: bool) -> bool {
        if !self.accepts_effects() {
            return false;
        }
        self.controls.shine = enabled;
        self.with_pipeline(|pipeline, doc| pipeline.shine.set_enabled(doc, enabled))
    }

    /// Turns the drop shadow on or off. Returns true if anything changed.
    pub fn set_shadow(&mut self, enabled: bool) -> bool {
        if !self.accepts_effects() {
            return false;
        }
        self.controls.shadow = enabled;
        self.with_pipeline(|pipeline, doc| pipeline.shadow.set_enabled(doc, enabled))
    }

    /// Turns the metallic texture on or off. Returns true if anything changed.
    pub fn set_metallic(&mut self, enabled: bool) -> bool {
        if !self.accepts_effects() {
            return false;
        }
        self.controls.metallic = enabled;
        self.with_pipeline(|pipeline, doc| pipeline.metallic.set_enabled(doc, enabled))
    }

    pub fn set_saturation(&mut self, value: f32) -> bool {
        if !self.accepts_effects() {
            return false;
        }
        self.controls.saturation = value;
        self.apply_tuning()
    }

    pub fn set_brightness(&mut self, value: f32) -> bool {
        if !self.accepts_effects() {
            return false;
        }
        self.controls.brightness = value;
        self.apply_tuning()
    }

    pub fn set_contrast(&mut self, value: f32) -> bool {
        if !self.accepts_effects() {
            return false;
        }
        self.controls.contrast = value;
        self.apply_tuning()
    }

    fn accepts_effects(&self) -> bool {
        if self.state != SessionState::Ready {
            log::debug!("effect change ignored: session is {:?}", self.state);
            return false;
        }
        true
    }

    fn apply_tuning(&mut self) -> bool {
        let tuning = self.controls.tuning();
        self.with_pipeline(|pipeline, doc| pipeline.tuning.set_config(doc, tuning))
    }

    /// Runs an effect change against the pipeline, injecting it and
    /// attaching the filter group first.
    fn with_pipeline<F>(&mut self, change: F) -> bool
    where
        F: FnOnce(&mut EffectPipeline, &mut Document) -> bool,
    {
        let Some(document) = self.document.as_mut() else {
            return false;
        };

        if self.pipeline.is_none() {
            self.pipeline = EffectPipeline::inject(document, &self.config.pipeline_config());
        }
        let Some(pipeline) = self.pipeline.as_mut() else {
            log::warn!("effect change skipped: filter is unavailable");
            return false;
        };

        pipeline.attach(document);
        change(pipeline, document)
    }

    // ---- Export ----

    /// Produces the export artifact for the current document.
    ///
    /// Returns `Ok(None)` if there is nothing to export. Repeated exports of
    /// an unchanged document reuse the previous artifact.
    pub fn export(&mut self) -> Result<Option<Artifact>, ExportError> {
        let Some(document) = &self.document else {
            return Ok(None);
        };

        if let Some((revision, artifact)) = &self.last_export {
            if *revision == document.revision() {
                return Ok(Some(artifact.clone()));
            }
        }

        let artifact = export::export(document, &self.config.export_filename)?;
        if let Some(artifact) = &artifact {
            self.last_export = Some((document.revision(), artifact.clone()));
            log::info!("exported {} ({} bytes)", artifact.filename, artifact.contents.len());
        }
        Ok(artifact)
    }
}

impl Configurable for Session {
    /// Applies effect toggles, tone and palette edits.
    ///
    /// Palette edits that match no swatch are logged and skipped.
    fn apply_profile(&mut self, profile: &EffectProfile) {
        self.set_shine(profile.shine.is_some_and(|s| s.enabled));
        self.set_shadow(profile.shadow.is_some_and(|s| s.enabled));
        self.set_metallic(profile.metallic.is_some_and(|s| s.enabled));

        let tone = profile.tone.unwrap_or_default();
        self.set_saturation(tone.saturation);
        self.set_brightness(tone.brightness);
        self.set_contrast(tone.contrast);

        for edit in &profile.recolors {
            if let Err(e) = self.recolor(&edit.from, &edit.to) {
                log::warn!("skipping recolor {} -> {}: {e}", edit.from, edit.to);
            }
        }
    }

    fn export_profile(&self) -> EffectProfile {
        let controls = &self.controls;
        let tone = ToneSettings {
            saturation: controls.saturation,
            brightness: controls.brightness,
            contrast: controls.contrast,
        };

        EffectProfile {
            shine: controls.shine.then_some(ShineSettings { enabled: true }),
            shadow: controls.shadow.then_some(ShadowSettings { enabled: true }),
            metallic: controls.metallic.then_some(MetallicSettings { enabled: true }),
            tone: (!controls.tuning().is_neutral()).then_some(tone),
            recolors: self
                .swatches
                .iter()
                .filter(|s| s.current != s.original)
                .map(|s| RecolorSettings::new(s.original.to_hex(), s.current.to_hex()))
                .collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{FILTER_ID, GROUP_ID};

    const ART: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="64" viewBox="0 0 64 64">
  <rect width="64" height="64" fill="#000"/>
  <circle cx="32" cy="32" r="20" fill="#ff0000"/>
  <path d="M0 0 L10 10 Z" style="fill: rgb(255, 0, 0)"/>
  <rect x="4" y="4" width="8" height="8" fill="#00f"/>
</svg>"##;

    fn svg_file(contents: &str) -> UploadFile {
        UploadFile::new("art.svg", "image/svg+xml", contents)
    }

    fn ready() -> Session {
        let mut session = Session::default();
        session.load(svg_file(ART)).unwrap();
        session
    }

    fn attr(session: &Session, id: &str, name: &str) -> String {
        let doc = session.document().unwrap();
        doc.attribute(doc.find_by_id(id).unwrap(), name)
            .unwrap()
            .to_string()
    }

    #[test]
    fn load_builds_palette_and_pipeline() {
        let session = ready();

        assert_eq!(session.state(), SessionState::Ready);
        let hex: Vec<_> = session.swatches().iter().map(|s| s.current.to_hex()).collect();
        assert_eq!(hex, ["#ff0000", "#0000ff", "#000000"]);
        assert_eq!(session.find_swatch(Panel::Restricted, 0).unwrap().count, 1);
        assert_eq!(session.find_swatch(Panel::Ordinary, 0).unwrap().count, 2);
        assert!(session.pipeline().is_some());
    }

    #[test]
    fn colorless_document_stays_loaded() {
        let mut session = Session::default();
        let state = session
            .load(svg_file(r#"<svg><rect fill="none"/><g/></svg>"#))
            .unwrap();

        assert_eq!(state, SessionState::Loaded);
        assert!(session.palette().is_empty());
        assert!(session.swatches().is_empty());
        assert!(session.pipeline().is_none());
        let doc = session.document().unwrap();
        assert!(doc.find_by_id(FILTER_ID).is_none());
        assert!(!session.set_shine(true));
    }

    #[test]
    fn unparseable_document_is_loaded_without_document() {
        let mut session = ready();
        let state = session.load(svg_file("<svg><g></svg>")).unwrap();

        assert_eq!(state, SessionState::Loaded);
        assert!(session.document().is_none());
        assert!(session.export().unwrap().is_none());
    }

    #[test]
    fn invalid_upload_changes_nothing() {
        let mut session = ready();
        let before = session.swatches().to_vec();

        let err = session
            .load(UploadFile::new("photo.png", "image/png", "..."))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Upload(UploadError::UnsupportedType { .. })
        ));

        let err = session
            .begin_upload(&[FileMeta::new("a.svg", SVG_MIME), FileMeta::new("b.svg", SVG_MIME)])
            .unwrap_err();
        assert!(matches!(err, SessionError::Upload(UploadError::FileCount(2))));

        assert_eq!(session.state(), SessionState::Ready);
        assert_eq!(session.swatches(), before);
    }

    #[test]
    fn mime_parameters_are_accepted() {
        assert!(FileMeta::new("a.svg", "Image/SVG+XML; charset=utf-8").is_svg());
        assert!(!FileMeta::new("a.svg", "image/svg").is_svg());
    }

    #[test]
    fn superseded_upload_is_rejected() {
        let mut session = Session::default();
        let first = session.begin_upload(&[FileMeta::new("a.svg", SVG_MIME)]).unwrap();
        let second = session.begin_upload(&[FileMeta::new("b.svg", SVG_MIME)]).unwrap();

        assert!(matches!(
            session.complete_upload(first, ART),
            Err(SessionError::Superseded)
        ));
        assert_eq!(session.state(), SessionState::Empty);

        assert_eq!(session.complete_upload(second, ART).unwrap(), SessionState::Ready);
    }

    #[test]
    fn new_upload_resets_controls() {
        let mut session = ready();
        session.set_metallic(true);
        session.set_contrast(1.4);

        session.load(svg_file(ART)).unwrap();
        assert_eq!(*session.controls(), EffectControls::default());
        assert!(!session.pipeline().unwrap().metallic.is_enabled());
    }

    #[test]
    fn edit_swatch_recolors_regions() {
        let mut session = ready();

        assert_eq!(session.edit_swatch(Panel::Ordinary, 0, "#0c0").unwrap(), 2);
        let swatch = session.find_swatch(Panel::Ordinary, 0).unwrap();
        assert_eq!(swatch.current, CanonicalColor::new(0, 204, 0));
        assert_eq!(swatch.original, CanonicalColor::new(255, 0, 0));

        let doc = session.document().unwrap();
        let styles = StyleMap::compute(doc);
        let fills = scan_fills(doc, &styles);
        assert!(!fills.contains(&"rgb(255, 0, 0)".to_string()));
        assert_eq!(fills.iter().filter(|f| *f == "rgb(0, 204, 0)").count(), 2);
    }

    #[test]
    fn edit_errors() {
        let mut session = ready();
        assert!(matches!(
            session.edit_swatch(Panel::Ordinary, 0, "red"),
            Err(SessionError::InvalidColor(_))
        ));
        assert!(matches!(
            session.edit_swatch(Panel::Restricted, 5, "#fff"),
            Err(SessionError::UnknownSwatch(_))
        ));
        assert!(matches!(
            session.recolor("#123456", "#fff"),
            Err(SessionError::UnknownSwatch(_))
        ));
        assert!(matches!(
            Session::default().recolor("#fff", "#000"),
            Err(SessionError::NotReady)
        ));
    }

    #[test]
    fn recolor_follows_current_color() {
        let mut session = ready();
        session.recolor("#f00", "#111111").unwrap();
        assert_eq!(session.recolor("#111", "#222222").unwrap(), 2);
        assert!(session.recolor("#f00", "#333").is_err());
    }

    #[test]
    fn shine_then_saturation_keeps_both() {
        let mut session = ready();

        assert!(session.set_shine(true));
        assert!(session.set_saturation(1.8));
        assert!(!session.set_saturation(1.8));

        assert_eq!(attr(&session, "mf-shine-flood", "flood-opacity"), "0.35");
        assert_eq!(attr(&session, "mf-saturation", "values"), "1.8");
        assert_eq!(session.controls().saturation, 1.8);
    }

    #[test]
    fn effects_attach_filter_to_group() {
        let mut session = ready();
        session.set_shadow(true);

        let doc = session.document().unwrap();
        let group = doc.find_by_id(GROUP_ID).unwrap();
        assert_eq!(
            doc.style_property(group, "filter").as_deref(),
            Some("url(#master-filter)")
        );
        assert_eq!(attr(&session, "mf-shadow", "flood-opacity"), "0.25");
    }

    #[test]
    fn brightness_and_contrast_map_to_transfer() {
        let mut session = ready();
        session.set_brightness(0.8);
        session.set_contrast(1.25);

        let doc = session.document().unwrap();
        let contrast = doc.find_by_id("mf-contrast").unwrap();
        for func in doc.children(contrast).iter().filter(|c| doc.element(**c).is_some()) {
            assert_eq!(doc.attribute(*func, "slope"), Some("1.25"));
            assert_eq!(doc.attribute(*func, "intercept"), Some("-0.2"));
        }
    }

    #[test]
    fn configured_intensities_are_used() {
        let config = SessionConfig {
            shine_intensity: 0.6,
            ..SessionConfig::default()
        };
        let mut session =
            Session::with_document(config, Document::parse(ART).unwrap());
        session.set_shine(true);
        assert_eq!(attr(&session, "mf-shine-flood", "flood-opacity"), "0.6");
    }

    #[test]
    fn export_is_cached_per_revision() {
        let mut session = ready();
        let first = session.export().unwrap().unwrap();
        let again = session.export().unwrap().unwrap();
        assert_eq!(first, again);

        session.set_metallic(true);
        let changed = session.export().unwrap().unwrap();
        assert_ne!(first.contents, changed.contents);
    }

    #[test]
    fn exported_artifact_renders_effects_standalone() {
        let mut session = ready();
        session.set_metallic(true);
        session.set_shadow(true);

        let artifact = session.export().unwrap().unwrap();
        assert_eq!(artifact.mime_type, "image/svg+xml;charset=utf-8");

        let exported = Document::parse(&artifact.contents).unwrap();
        for region in exported.regions() {
            assert!(exported.attribute(region, "fill").is_some());
        }
        let group = exported.find_by_id(GROUP_ID).unwrap();
        assert_eq!(exported.attribute(group, "filter"), Some("url(#master-filter)"));

        let shadow = exported.find_by_id("mf-shadow").unwrap();
        assert_eq!(exported.attribute(shadow, "flood-opacity"), Some("0.25"));
        let gate = exported.find_by_id("mf-met-gate-R").unwrap();
        assert_eq!(exported.attribute(gate, "slope"), Some("1"));

        artifact.validate().unwrap();
    }

    #[test]
    fn reloading_an_export_adopts_its_filter() {
        let mut session = ready();
        session.set_shine(true);
        let artifact = session.export().unwrap().unwrap();

        let mut reloaded = Session::default();
        reloaded.load(svg_file(&artifact.contents)).unwrap();

        let pipeline = reloaded.pipeline().unwrap();
        assert!(pipeline.is_adopted());
        assert!(!pipeline.shine.is_enabled());
        assert_eq!(attr(&reloaded, "mf-shine-flood", "flood-opacity"), "0");
    }

    #[test]
    fn gradient_only_document_stays_loaded() {
        let mut session = Session::default();
        let state = session
            .load(svg_file(
                r##"<svg><defs><linearGradient id="g"><stop offset="0" stop-color="red"/></linearGradient></defs><rect fill="url(#g)"/></svg>"##,
            ))
            .unwrap();

        assert_eq!(state, SessionState::Loaded);
        assert!(session.swatches().is_empty());
        assert!(session.pipeline().is_none());
        assert!(session.document().unwrap().find_by_id(FILTER_ID).is_none());
        assert!(!session.set_metallic(true));
    }

    #[test]
    fn filter_is_applied_on_first_effect_change() {
        let mut session = ready();
        let doc = session.document().unwrap();
        let group = doc.find_by_id(GROUP_ID).unwrap();
        assert_eq!(doc.style_property(group, "filter"), None);

        let artifact = session.export().unwrap().unwrap();
        assert!(!artifact.contents.contains("url(#master-filter)"));

        session.set_saturation(1.5);
        let doc = session.document().unwrap();
        assert_eq!(
            doc.style_property(group, "filter").as_deref(),
            Some("url(#master-filter)")
        );
    }

    #[test]
    fn incomplete_existing_filter_skips_effects() {
        let mut session = Session::default();
        let state = session
            .load(svg_file(
                r##"<svg><defs><filter id="master-filter"><feFlood id="mf-shine-flood"/></filter></defs><rect fill="#f00"/></svg>"##,
            ))
            .unwrap();
        assert_eq!(state, SessionState::Ready);
        assert!(session.pipeline().is_none());

        let before = session.document().unwrap().to_svg_string().unwrap();
        assert!(!session.set_shine(true));
        assert!(!session.set_contrast(1.3));
        assert_eq!(session.document().unwrap().to_svg_string().unwrap(), before);
    }
}
