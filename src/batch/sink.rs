use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::batch::pipeline::{BatchSummary, RenderedRow};
use crate::batch::verify::GenerationMetadata;
use crate::foundation::error::{CertError, CertResult};

/// Consumer of rendered certificates.
///
/// Ordering contract: `push` is called in strictly increasing row order. Failed and cancelled
/// rows are skipped, so indices may have gaps.
pub trait OutputSink: Send {
    /// Called once before any rows are pushed.
    fn begin(&mut self, total: usize) -> CertResult<()> {
        let _ = total;
        Ok(())
    }
    /// Take ownership of one rendered row.
    fn push(&mut self, row: RenderedRow) -> CertResult<()>;
    /// Called once after the last row, with the final counters.
    fn end(&mut self, summary: &BatchSummary) -> CertResult<()> {
        let _ = summary;
        Ok(())
    }
}

/// In-memory sink for tests and embedding callers.
#[derive(Debug, Default)]
pub struct InMemorySink {
    rows: Vec<RenderedRow>,
    summary: Option<BatchSummary>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows received, in row order.
    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    /// Consume the sink, returning its rows.
    pub fn into_rows(self) -> Vec<RenderedRow> {
        self.rows
    }

    /// Summary passed to `end`, if the batch has finished.
    pub fn summary(&self) -> Option<&BatchSummary> {
        self.summary.as_ref()
    }
}

impl OutputSink for InMemorySink {
    fn begin(&mut self, total: usize) -> CertResult<()> {
        self.rows.clear();
        self.rows.reserve(total);
        self.summary = None;
        Ok(())
    }

    fn push(&mut self, row: RenderedRow) -> CertResult<()> {
        self.rows.push(row);
        Ok(())
    }

    fn end(&mut self, summary: &BatchSummary) -> CertResult<()> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}

/// One written file in a [`Manifest`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ManifestEntry {
    /// File name relative to the output directory.
    pub file: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
    /// Binding warnings, rendered as text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Contents of `manifest.json` written by [`DirectorySink`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Manifest {
    /// Batch counters.
    pub summary: BatchSummary,
    /// Written outputs, in row order.
    pub outputs: Vec<ManifestEntry>,
}

/// Writes `<stem>-<index>.png` per row and a `manifest.json` at the end.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    stem: String,
    entries: Vec<ManifestEntry>,
}

/// Manifest file name inside the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

impl DirectorySink {
    /// Sink writing into `dir` with file names starting with `stem`.
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            entries: Vec::new(),
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name used for row `index`.
    pub fn file_name(&self, index: usize) -> String {
        format!("{}-{index}.png", self.stem)
    }
}

impl OutputSink for DirectorySink {
    fn begin(&mut self, _total: usize) -> CertResult<()> {
        if self.stem.is_empty() || self.stem.contains(['/', '\\']) {
            return Err(CertError::validation(
                "output stem must be a non-empty file name prefix",
            ));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output directory '{}'", self.dir.display()))?;
        self.entries.clear();
        Ok(())
    }

    fn push(&mut self, row: RenderedRow) -> CertResult<()> {
        let file = self.file_name(row.index);
        let path = self.dir.join(&file);
        std::fs::write(&path, &row.png)
            .with_context(|| format!("write '{}'", path.display()))?;
        self.entries.push(ManifestEntry {
            file,
            width: row.width,
            height: row.height,
            metadata: row.metadata,
            warnings: row.warnings.iter().map(ToString::to_string).collect(),
        });
        Ok(())
    }

    fn end(&mut self, summary: &BatchSummary) -> CertResult<()> {
        let manifest = Manifest {
            summary: summary.clone(),
            outputs: std::mem::take(&mut self.entries),
        };
        let json = serde_json::to_string_pretty(&manifest).context("serialize manifest")?;
        let path = self.dir.join(MANIFEST_FILE);
        std::fs::write(&path, json).with_context(|| format!("write '{}'", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/sink.rs"]
mod tests;
