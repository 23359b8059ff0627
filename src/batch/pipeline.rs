use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use crate::assets::store::AssetStore;
use crate::batch::sink::OutputSink;
use crate::batch::verify::{GenerationMetadata, VerificationSeed, verification_code};
use crate::binding::{BindWarning, BindingRecord, bind};
use crate::foundation::error::{CertError, CertResult};
use crate::render::backend::{RenderBackend, RenderOpts};
use crate::render::cpu::CpuRenderer;
use crate::scene::document::SceneDocument;
use crate::scene::element::ElementKind;

/// Template id used when the caller does not supply one.
pub const DEFAULT_TEMPLATE_ID: &str = "template";

#[derive(Clone, Debug, PartialEq)]
/// Threading, chunking and reporting controls for batch generation.
pub struct BatchOpts {
    /// Render rows on a worker pool when `true`.
    pub parallel: bool,
    /// Rows scheduled per chunk; cancellation is observed between rows.
    pub chunk_size: usize,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
    /// Number of failures kept verbatim in the summary.
    pub error_sample_limit: usize,
    /// Per-row render options.
    pub render: RenderOpts,
}

impl Default for BatchOpts {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: 64,
            threads: None,
            error_sample_limit: 5,
            render: RenderOpts::default(),
        }
    }
}

impl BatchOpts {
    /// Defaults with `CERTIFORGE_THREADS` applied when set to a positive integer.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(n) = std::env::var("CERTIFORGE_THREADS")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            opts.threads = Some(n);
        }
        opts
    }
}

/// One successfully generated certificate.
#[derive(Clone, Debug)]
pub struct RenderedRow {
    /// Zero-based row index.
    pub index: usize,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// PNG bytes.
    pub png: Vec<u8>,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
    /// Binding warnings for this row.
    pub warnings: Vec<BindWarning>,
}

/// Outcome of one row in a batch run.
#[derive(Debug)]
pub enum RowStatus {
    /// The row was rendered and handed to the sink.
    Rendered {
        /// Generation metadata.
        metadata: GenerationMetadata,
        /// Binding warnings.
        warnings: Vec<BindWarning>,
    },
    /// The row failed; other rows are unaffected.
    Failed(CertError),
    /// The batch was cancelled before this row started.
    Cancelled,
}

/// Per-row outcome, in input order.
#[derive(Debug)]
pub struct RowOutcome {
    /// Zero-based row index.
    pub index: usize,
    /// What happened to the row.
    pub status: RowStatus,
}

/// A failure kept verbatim in a [`BatchSummary`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorSample {
    /// Zero-based row index.
    pub index: usize,
    /// Error kind label, see [`CertError::kind`].
    pub kind: String,
    /// Error message.
    pub message: String,
}

/// Aggregate counters for a batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchSummary {
    /// Rows submitted.
    pub total: usize,
    /// Rows rendered.
    pub succeeded: usize,
    /// Rows that failed.
    pub failed: usize,
    /// Rows skipped because the batch was cancelled.
    pub cancelled: usize,
    /// The first few failures, in row order.
    pub error_samples: Vec<ErrorSample>,
}

/// Per-row outcomes plus the summary.
#[derive(Debug)]
pub struct BatchReport {
    /// One entry per input row, in input order.
    pub rows: Vec<RowOutcome>,
    /// Aggregate counters.
    pub summary: BatchSummary,
}

/// Binds and renders rows of a fixed template.
///
/// Each row is independent: rendering row `k` has no effect on any other row, so a failed row can
/// be re-rendered in isolation with [`BatchRenderer::render_row`].
#[derive(Debug)]
pub struct BatchRenderer {
    template: SceneDocument,
    template_id: String,
    store: Arc<AssetStore>,
    opts: BatchOpts,
    seed: Option<VerificationSeed>,
}

impl BatchRenderer {
    /// Renderer for `template`, resolving assets and fonts through `store`.
    pub fn new(template: SceneDocument, store: Arc<AssetStore>) -> Self {
        Self {
            template,
            template_id: DEFAULT_TEMPLATE_ID.to_string(),
            store,
            opts: BatchOpts::default(),
            seed: None,
        }
    }

    /// Set the template id recorded in metadata and mixed into verification codes.
    pub fn with_template_id(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = template_id.into();
        self
    }

    /// Replace the batch options.
    pub fn with_opts(mut self, opts: BatchOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Issue a verification code per row derived from `seed`.
    pub fn with_verification(mut self, seed: VerificationSeed) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The template being rendered.
    pub fn template(&self) -> &SceneDocument {
        &self.template
    }

    /// Template id.
    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    /// Options in effect.
    pub fn opts(&self) -> &BatchOpts {
        &self.opts
    }

    fn new_renderer(&self) -> CpuRenderer {
        CpuRenderer::new(Arc::clone(self.store.fonts()))
    }

    /// Bind and render one row.
    ///
    /// Errors of any kind are reported as [`CertError::Render`] scoped to this row.
    pub fn render_row(&self, index: usize, record: &BindingRecord) -> CertResult<RenderedRow> {
        let mut renderer = self.new_renderer();
        self.render_row_with(&mut renderer, index, record)
    }

    #[tracing::instrument(level = "debug", skip(self, renderer, record), fields(template = %self.template_id))]
    fn render_row_with(
        &self,
        renderer: &mut CpuRenderer,
        index: usize,
        record: &BindingRecord,
    ) -> CertResult<RenderedRow> {
        let bound = bind(&self.template, record);
        let mut doc = bound.document;

        let code = self
            .seed
            .as_ref()
            .map(|seed| verification_code(&self.template_id, index, seed));
        if let Some(code) = &code {
            attach_verification_payload(&mut doc, code);
        }

        let assets = self
            .store
            .prepare_scene_for(&doc, &self.template)
            .map_err(CertError::into_render)?;
        let image = renderer
            .render(&doc, &assets, self.opts.render)
            .map_err(CertError::into_render)?;
        let png = image.to_png().map_err(CertError::into_render)?;

        Ok(RenderedRow {
            index,
            width: image.width,
            height: image.height,
            png,
            metadata: GenerationMetadata::now(&self.template_id, index, code),
            warnings: bound.warnings,
        })
    }

    /// Lazily render `records` one at a time, in order.
    ///
    /// The iterator is finite and may be dropped at any point; nothing is rendered ahead of
    /// demand.
    pub fn rows<'a>(&'a self, records: &'a [BindingRecord]) -> BatchRows<'a> {
        BatchRows {
            batch: self,
            records,
            next: 0,
            renderer: None,
        }
    }

    /// Render every record, delivering successes to `sink` in row order.
    ///
    /// Row failures (including sink write failures) are recorded and the batch continues. When
    /// `cancel` becomes `true`, rows that have not started are reported as cancelled; rows already
    /// in flight run to completion.
    #[tracing::instrument(level = "info", skip_all, fields(template = %self.template_id, rows = records.len()))]
    pub fn run(
        &self,
        records: &[BindingRecord],
        sink: &mut dyn OutputSink,
        cancel: &AtomicBool,
    ) -> CertResult<BatchReport> {
        sink.begin(records.len())?;

        let chunk_size = self.opts.chunk_size.max(1);
        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };
        let mut sequential_renderer = None;

        let mut rows = Vec::with_capacity(records.len());
        let mut chunk_start = 0;
        while chunk_start < records.len() {
            let chunk_end = (chunk_start + chunk_size).min(records.len());
            let chunk = &records[chunk_start..chunk_end];

            let results: Vec<Option<CertResult<RenderedRow>>> = match &pool {
                Some(pool) => pool.install(|| {
                    chunk
                        .par_iter()
                        .enumerate()
                        .map_init(
                            || self.new_renderer(),
                            |renderer, (offset, record)| {
                                if cancel.load(Ordering::Relaxed) {
                                    return None;
                                }
                                Some(self.render_row_with(renderer, chunk_start + offset, record))
                            },
                        )
                        .collect()
                }),
                None => {
                    let renderer = sequential_renderer.get_or_insert_with(|| self.new_renderer());
                    let mut out = Vec::with_capacity(chunk.len());
                    for (offset, record) in chunk.iter().enumerate() {
                        if cancel.load(Ordering::Relaxed) {
                            out.push(None);
                            continue;
                        }
                        out.push(Some(self.render_row_with(
                            renderer,
                            chunk_start + offset,
                            record,
                        )));
                    }
                    out
                }
            };

            for (offset, result) in results.into_iter().enumerate() {
                let index = chunk_start + offset;
                let status = match result {
                    None => RowStatus::Cancelled,
                    Some(Ok(row)) => {
                        let metadata = row.metadata.clone();
                        let warnings = row.warnings.clone();
                        match sink.push(row) {
                            Ok(()) => RowStatus::Rendered { metadata, warnings },
                            Err(e) => RowStatus::Failed(e),
                        }
                    }
                    Some(Err(e)) => RowStatus::Failed(e),
                };
                if let RowStatus::Failed(e) = &status {
                    tracing::warn!(row = index, error = %e, "row failed");
                }
                rows.push(RowOutcome { index, status });
            }
            chunk_start = chunk_end;
        }

        let summary = summarize(&rows, self.opts.error_sample_limit);
        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "batch finished"
        );
        sink.end(&summary)?;
        Ok(BatchReport { rows, summary })
    }
}

/// Lazy, in-order row iterator returned by [`BatchRenderer::rows`].
pub struct BatchRows<'a> {
    batch: &'a BatchRenderer,
    records: &'a [BindingRecord],
    next: usize,
    renderer: Option<CpuRenderer>,
}

impl std::fmt::Debug for BatchRows<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchRows")
            .field("next", &self.next)
            .field("total", &self.records.len())
            .finish()
    }
}

impl Iterator for BatchRows<'_> {
    type Item = (usize, CertResult<RenderedRow>);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next;
        let record = self.records.get(index)?;
        self.next += 1;
        let batch = self.batch;
        let renderer = self.renderer.get_or_insert_with(|| batch.new_renderer());
        Some((index, batch.render_row_with(renderer, index, record)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.records.len().saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for BatchRows<'_> {}

/// Fill every verification slot of `doc` with `prefix + code`.
///
/// Returns the number of slots filled; a template without slots is left untouched.
pub fn attach_verification_payload(doc: &mut SceneDocument, code: &str) -> usize {
    let ids = doc.z_order().to_vec();
    let mut filled = 0;
    for id in ids {
        if let Some(el) = doc.get_mut(id)
            && let ElementKind::VerificationCode(slot) = &mut el.kind
        {
            slot.payload = Some(format!("{}{code}", slot.prefix));
            filled += 1;
        }
    }
    filled
}

fn summarize(rows: &[RowOutcome], sample_limit: usize) -> BatchSummary {
    let mut summary = BatchSummary {
        total: rows.len(),
        ..BatchSummary::default()
    };
    for row in rows {
        match &row.status {
            RowStatus::Rendered { .. } => summary.succeeded += 1,
            RowStatus::Cancelled => summary.cancelled += 1,
            RowStatus::Failed(e) => {
                summary.failed += 1;
                if summary.error_samples.len() < sample_limit {
                    summary.error_samples.push(ErrorSample {
                        index: row.index,
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }
    summary
}

fn build_thread_pool(threads: Option<usize>) -> CertResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(CertError::validation(
            "batch threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CertError::from(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/pipeline.rs"]
mod tests;
