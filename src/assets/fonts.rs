use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::foundation::error::{CertError, CertResult};

/// Font sources used to build a [`FontBook`].
#[derive(Clone, Debug)]
pub struct FontBookOpts {
    /// Scan the platform font directories.
    pub system_fonts: bool,
    /// Extra directories scanned for `.ttf`/`.otf`/`.ttc` files (non-recursive).
    pub font_dirs: Vec<PathBuf>,
}

impl Default for FontBookOpts {
    fn default() -> Self {
        Self {
            system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

impl FontBookOpts {
    /// Defaults overridden by `CERTIFORGE_FONT_DIRS` and `CERTIFORGE_NO_SYSTEM_FONTS`.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(dirs) = std::env::var_os("CERTIFORGE_FONT_DIRS") {
            opts.font_dirs.extend(std::env::split_paths(&dirs));
        }
        if std::env::var("CERTIFORGE_NO_SYSTEM_FONTS")
            .map(|v| !v.is_empty() && v != "0")
            .unwrap_or(false)
        {
            opts.system_fonts = false;
        }
        opts
    }

    /// No system fonts and no directories: only explicitly registered bytes.
    pub fn isolated() -> Self {
        Self {
            system_fonts: false,
            font_dirs: Vec::new(),
        }
    }
}

/// A concrete font face chosen for a text field.
#[derive(Clone, Debug)]
pub struct ResolvedFace {
    /// Raw font file bytes (shared).
    pub data: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
    /// Family name reported by the face.
    pub family: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FaceQuery {
    family: String,
    weight: u16,
    italic: bool,
}

/// Font database shared by text layout and SVG parsing.
///
/// Lookups go requested family, then generic sans-serif, then any face at all. A book with no
/// faces resolves nothing; text is then skipped by the renderer.
#[derive(Debug)]
pub struct FontBook {
    db: Arc<usvg::fontdb::Database>,
    resolved: RwLock<HashMap<FaceQuery, Option<ResolvedFace>>>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::from_database(usvg::fontdb::Database::new())
    }
}

impl FontBook {
    /// Build a book from configured sources.
    pub fn new(opts: &FontBookOpts) -> Self {
        let mut db = usvg::fontdb::Database::new();
        if opts.system_fonts {
            db.load_system_fonts();
        }
        for dir in &opts.font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font book loaded");
        Self::from_database(db)
    }

    /// Wrap an existing database.
    pub fn from_database(db: usvg::fontdb::Database) -> Self {
        Self {
            db: Arc::new(db),
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Add a font file from memory.
    pub fn register_font_data(&mut self, bytes: Vec<u8>) -> CertResult<()> {
        let db = Arc::make_mut(&mut self.db);
        let before = db.len();
        db.load_font_data(bytes);
        if db.len() == before {
            return Err(CertError::validation("font data contains no usable faces"));
        }
        self.resolved
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        Ok(())
    }

    /// Number of faces available.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Shared database handle (used for SVG text).
    pub fn database(&self) -> Arc<usvg::fontdb::Database> {
        Arc::clone(&self.db)
    }

    /// Pick a face for a family/weight/style, with fallbacks.
    pub fn resolve(&self, family: &str, weight: u16, italic: bool) -> Option<ResolvedFace> {
        let key = FaceQuery {
            family: family.to_string(),
            weight,
            italic,
        };
        if let Some(hit) = self
            .resolved
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return hit.clone();
        }

        let found = self.lookup(&key);
        if found.is_none() {
            tracing::warn!(family, "no font face available; text will not be drawn");
        } else if let Some(face) = &found {
            if !face.family.eq_ignore_ascii_case(family) {
                tracing::debug!(requested = family, used = %face.family, "font fallback");
            }
        }
        self.resolved
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, found.clone());
        found
    }

    fn lookup(&self, key: &FaceQuery) -> Option<ResolvedFace> {
        use usvg::fontdb::{Family, Query, Style, Weight};

        let families = [generic_or_named(&key.family), Family::SansSerif];
        let query = Query {
            families: &families,
            weight: Weight(key.weight),
            stretch: usvg::fontdb::Stretch::Normal,
            style: if key.italic {
                Style::Italic
            } else {
                Style::Normal
            },
        };
        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))?;

        let family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| key.family.clone());
        let (data, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))?;
        Some(ResolvedFace {
            data: Arc::new(data),
            index,
            family,
        })
    }
}

fn generic_or_named(name: &str) -> usvg::fontdb::Family<'_> {
    use usvg::fontdb::Family;
    match name.trim().to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" | "sans" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name.trim()),
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::debug!(dir = %dir.display(), "font directory not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color carried through Parley layouts.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Text shaping options for one text field.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TextStyle {
    pub(crate) size_px: f32,
    pub(crate) weight: u16,
    pub(crate) italic: bool,
    pub(crate) brush: TextBrushRgba8,
}

/// Stateful helper for building Parley text layouts from resolved faces.
///
/// Each distinct font file is registered with Parley once per engine.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<(usize, u32), String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, face: &ResolvedFace) -> CertResult<String> {
        let key = (Arc::as_ptr(&face.data) as usize, face.index);
        if let Some(name) = self.families.get(&key) {
            return Ok(name.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(face.data.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| CertError::render("no font families registered from font bytes"))?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CertError::render("registered font family has no name"))?
            .to_string();
        self.families.insert(key, name.clone());
        Ok(name)
    }

    /// Shape `text` without wrapping; explicit newlines start new lines.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        face: &ResolvedFace,
        style: TextStyle,
    ) -> CertResult<parley::Layout<TextBrushRgba8>> {
        if !style.size_px.is_finite() || style.size_px <= 0.0 {
            return Err(CertError::validation("text size must be finite and > 0"));
        }
        let family_name = self.family_for(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(style.weight)),
        ));
        if style.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(style.brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
