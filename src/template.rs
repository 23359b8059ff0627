//! Persistence-boundary helpers.
//!
//! Templates are stored elsewhere as a `configJSON` string plus an optional background image
//! reference. These functions turn that pair into a [`SceneDocument`], produce what a save
//! stores, and run single or bulk generation.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use base64::Engine as _;

use crate::assets::store::AssetStore;
use crate::batch::pipeline::{
    BatchOpts, BatchRenderer, BatchReport, DEFAULT_TEMPLATE_ID, RenderedRow,
};
use crate::batch::sink::OutputSink;
use crate::batch::verify::VerificationSeed;
use crate::binding::BindingRecord;
use crate::codec;
use crate::foundation::error::CertResult;
use crate::render::backend::{RenderBackend, RenderOpts};
use crate::render::cpu::CpuRenderer;
use crate::scene::document::{Background, SceneDocument};

/// Load a stored template.
///
/// `background`, when present and non-blank, replaces the document's background source while
/// keeping its fit mode.
pub fn load(config_json: Option<&str>, background: Option<&str>) -> CertResult<SceneDocument> {
    let mut doc = codec::decode_stored(config_json)?;
    if let Some(source) = background.map(str::trim).filter(|s| !s.is_empty()) {
        let fit = doc.background().map(|b| b.fit).unwrap_or_default();
        doc.set_background(Background {
            source: source.to_string(),
            fit,
        });
    }
    Ok(doc)
}

/// What a template save stores.
#[derive(Clone, Debug)]
pub struct SavedTemplate {
    /// Encoded document.
    pub config_json: String,
    /// PNG preview of the unbound template.
    pub preview_png: Vec<u8>,
}

impl SavedTemplate {
    /// Preview as a `data:image/png;base64,...` URL.
    pub fn preview_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.preview_png)
        )
    }
}

/// Encode `doc` and render its preview. Placeholders are drawn literally.
///
/// Failures surface directly; nothing is returned unless both parts succeed.
pub fn save(
    doc: &SceneDocument,
    store: &AssetStore,
    renderer: &mut CpuRenderer,
    opts: RenderOpts,
) -> CertResult<SavedTemplate> {
    doc.check_invariants()?;
    let config_json = codec::encode(doc)?;
    let assets = store.prepare_scene(doc)?;
    let preview_png = renderer.render(doc, &assets, opts)?.to_png()?;
    Ok(SavedTemplate {
        config_json,
        preview_png,
    })
}

/// Options shared by single and bulk generation.
#[derive(Clone, Debug)]
pub struct GenerateOpts {
    /// Id recorded in metadata and mixed into verification codes.
    pub template_id: String,
    /// Issue verification codes from this seed.
    pub verification: Option<VerificationSeed>,
    /// Threading and render options.
    pub batch: BatchOpts,
}

impl Default for GenerateOpts {
    fn default() -> Self {
        Self {
            template_id: DEFAULT_TEMPLATE_ID.to_string(),
            verification: None,
            batch: BatchOpts::default(),
        }
    }
}

fn batch_renderer(
    doc: &SceneDocument,
    store: Arc<AssetStore>,
    opts: &GenerateOpts,
) -> BatchRenderer {
    let batch = BatchRenderer::new(doc.clone(), store)
        .with_template_id(opts.template_id.clone())
        .with_opts(opts.batch.clone());
    match &opts.verification {
        Some(seed) => batch.with_verification(seed.clone()),
        None => batch,
    }
}

/// Generate one certificate from a manually entered record.
pub fn generate_one(
    doc: &SceneDocument,
    record: &BindingRecord,
    store: Arc<AssetStore>,
    opts: &GenerateOpts,
) -> CertResult<RenderedRow> {
    batch_renderer(doc, store, opts).render_row(0, record)
}

/// Generate one certificate per record, delivering outputs to `sink`.
pub fn generate_batch(
    doc: &SceneDocument,
    records: &[BindingRecord],
    store: Arc<AssetStore>,
    opts: &GenerateOpts,
    sink: &mut dyn OutputSink,
    cancel: &AtomicBool,
) -> CertResult<BatchReport> {
    batch_renderer(doc, store, opts).run(records, sink, cancel)
}
