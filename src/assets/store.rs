use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use anyhow::Context;

use crate::assets::decode;
use crate::assets::fonts::FontBook;
use crate::foundation::error::{CertError, CertResult};
use crate::scene::document::SceneDocument;
use crate::scene::element::ElementKind;

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
/// Prepared SVG asset represented as a parsed `usvg` tree.
pub struct PreparedSvg {
    /// Parsed SVG tree.
    pub tree: Arc<usvg::Tree>,
}

impl PreparedSvg {
    /// Intrinsic size in SVG user units.
    pub fn size(&self) -> (f64, f64) {
        let s = self.tree.size();
        (f64::from(s.width()), f64::from(s.height()))
    }
}

#[derive(Clone, Debug)]
/// A decoded asset ready for rasterization.
pub enum PreparedAsset {
    /// Bitmap image.
    Image(PreparedImage),
    /// SVG vector tree.
    Svg(PreparedSvg),
}

impl PreparedAsset {
    /// Intrinsic size.
    pub fn size(&self) -> (f64, f64) {
        match self {
            Self::Image(i) => (f64::from(i.width), f64::from(i.height)),
            Self::Svg(s) => s.size(),
        }
    }
}

/// Source of raw asset bytes.
///
/// Resolvers perform the only I/O in the pipeline. They are called before rasterization starts.
pub trait AssetResolver: Send + Sync {
    /// Read the bytes behind `source`.
    fn read(&self, source: &str) -> CertResult<Vec<u8>>;

    /// Directory used to resolve references nested inside SVG files, if any.
    fn resources_dir(&self, source: &str) -> Option<PathBuf> {
        let _ = source;
        None
    }
}

/// Resolves relative paths under a root directory.
#[derive(Clone, Debug)]
pub struct FsAssetResolver {
    root: PathBuf,
}

impl FsAssetResolver {
    /// Resolver rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetResolver for FsAssetResolver {
    fn read(&self, source: &str) -> CertResult<Vec<u8>> {
        let norm = normalize_rel_path(source)?;
        let path = self.root.join(Path::new(&norm));
        std::fs::read(&path)
            .with_context(|| format!("read asset bytes from '{}'", path.display()))
            .map_err(CertError::from)
    }

    fn resources_dir(&self, source: &str) -> Option<PathBuf> {
        let norm = normalize_rel_path(source).ok()?;
        self.root
            .join(Path::new(&norm))
            .parent()
            .map(Path::to_path_buf)
    }
}

/// In-memory resolver keyed by exact source string.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetResolver {
    entries: HashMap<String, Arc<Vec<u8>>>,
}

impl MemoryAssetResolver {
    /// Empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes under `source`.
    pub fn insert(&mut self, source: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(source.into(), Arc::new(bytes));
    }

    /// Builder-style [`MemoryAssetResolver::insert`].
    pub fn with(mut self, source: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(source, bytes);
        self
    }
}

impl AssetResolver for MemoryAssetResolver {
    fn read(&self, source: &str) -> CertResult<Vec<u8>> {
        self.entries
            .get(source)
            .map(|b| b.as_ref().clone())
            .ok_or_else(|| CertError::not_found(format!("asset '{source}'")))
    }
}

/// Shared, thread-safe cache of decoded assets in front of an [`AssetResolver`].
///
/// `data:` URIs are decoded inline and never reach the resolver. Failures are not cached, so a
/// retried row re-reads its sources. Batch rendering caches only the sources a template names;
/// per-record sources are decoded for their row and then released.
pub struct AssetStore {
    resolver: Arc<dyn AssetResolver>,
    fonts: Arc<FontBook>,
    cache: RwLock<HashMap<String, PreparedAsset>>,
}

impl std::fmt::Debug for AssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self.cache.read().map(|c| c.len()).unwrap_or(0);
        f.debug_struct("AssetStore")
            .field("cached", &cached)
            .field("font_faces", &self.fonts.face_count())
            .finish()
    }
}

impl AssetStore {
    /// Store over `resolver`, parsing SVG text with `fonts`.
    pub fn new(resolver: Arc<dyn AssetResolver>, fonts: Arc<FontBook>) -> Self {
        Self {
            resolver,
            fonts,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Store rooted at a directory.
    pub fn from_dir(root: impl Into<PathBuf>, fonts: Arc<FontBook>) -> Self {
        Self::new(Arc::new(FsAssetResolver::new(root)), fonts)
    }

    /// Fonts used by this store.
    pub fn fonts(&self) -> &Arc<FontBook> {
        &self.fonts
    }

    /// Number of cached decoded assets.
    pub fn cached_len(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Decode `source`, reusing a cached result.
    pub fn prepare(&self, source: &str) -> CertResult<PreparedAsset> {
        if let Some(hit) = self.cached(source) {
            tracing::debug!(source = short(source), "asset cache hit");
            return Ok(hit);
        }
        tracing::debug!(source = short(source), "asset cache miss");
        let prepared = self.load(source)?;
        self.cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(source.to_string(), prepared.clone());
        Ok(prepared)
    }

    /// Decode `source` without adding it to the cache.
    ///
    /// A cached result is still reused, but a fresh decode is not retained.
    pub fn prepare_uncached(&self, source: &str) -> CertResult<PreparedAsset> {
        match self.cached(source) {
            Some(hit) => Ok(hit),
            None => self.load(source),
        }
    }

    fn load(&self, source: &str) -> CertResult<PreparedAsset> {
        let bytes = if source.starts_with("data:") {
            decode::decode_data_uri(source)?
        } else {
            self.resolver.read(source)?
        };
        if decode::looks_like_svg(source, &bytes) {
            Ok(PreparedAsset::Svg(decode::parse_svg(
                &bytes,
                self.fonts.database(),
                self.resolver.resources_dir(source),
            )?))
        } else {
            Ok(PreparedAsset::Image(decode::decode_image(&bytes)?))
        }
    }

    fn cached(&self, source: &str) -> Option<PreparedAsset> {
        self.cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(source)
            .cloned()
    }

    /// Resolve every asset a document draws: the background and visible image elements.
    ///
    /// Every source is cached. Any failure is reported as a render failure naming the source.
    pub fn prepare_scene(&self, doc: &SceneDocument) -> CertResult<SceneAssets> {
        self.prepare_scene_for(doc, doc)
    }

    /// Resolve the assets of `bound`, a copy of `template` with placeholders filled in.
    ///
    /// Only sources `template` itself draws are cached; sources that came from record values live
    /// in the returned [`SceneAssets`] alone, so a long batch does not grow the cache.
    pub fn prepare_scene_for(
        &self,
        bound: &SceneDocument,
        template: &SceneDocument,
    ) -> CertResult<SceneAssets> {
        let fixed: HashSet<&str> = scene_sources(template).into_iter().collect();
        let mut out = SceneAssets::default();
        for source in scene_sources(bound) {
            if out.by_source.contains_key(source) {
                continue;
            }
            if source.trim().is_empty() {
                return Err(CertError::render("image source is empty"));
            }
            let asset = if fixed.contains(source) {
                self.prepare(source)
            } else {
                self.prepare_uncached(source)
            }
            .map_err(|e| CertError::render(format!("asset '{}': {e}", short(source))))?;
            out.by_source.insert(source.to_string(), asset);
        }
        Ok(out)
    }
}

fn scene_sources(doc: &SceneDocument) -> Vec<&str> {
    let mut sources = Vec::new();
    if let Some(bg) = doc.background() {
        sources.push(bg.source.as_str());
    }
    for el in doc.elements().filter(|e| e.visible) {
        if let ElementKind::Image(img) = &el.kind {
            sources.push(img.source.as_str());
        }
    }
    sources
}

/// Decoded assets for one document, keyed by source string.
#[derive(Clone, Debug, Default)]
pub struct SceneAssets {
    by_source: HashMap<String, PreparedAsset>,
}

impl SceneAssets {
    /// Asset for `source`.
    pub fn get(&self, source: &str) -> Option<&PreparedAsset> {
        self.by_source.get(source)
    }

    /// Number of distinct assets.
    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    /// Return `true` when no assets were needed.
    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }
}

fn short(source: &str) -> &str {
    if source.starts_with("data:") {
        let end = source
            .char_indices()
            .nth(32)
            .map(|(i, _)| i)
            .unwrap_or(source.len());
        &source[..end]
    } else {
        source
    }
}

/// Normalize and validate relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> CertResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(CertError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(CertError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CertError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CertError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
