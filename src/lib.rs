//! Certiforge composes certificate templates and renders them in bulk.
//!
//! A template is a [`SceneDocument`]: a fixed-size canvas, an optional background image and a
//! z-ordered list of text, shape, image and verification-code elements. The crate covers the
//! whole template lifecycle:
//!
//! - Author it through an [`EditSession`] (selection state machine plus edit operations)
//! - Store and reload it with the versioned JSON [`codec`]
//! - Substitute per-recipient data into `{{placeholder}}` fields with [`bind`]
//! - Rasterize bound copies, one at a time or as a parallel batch, with [`BatchRenderer`]
//!
//! All asset and font I/O happens before rasterization, through an [`AssetStore`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Asset resolution, decoding and fonts.
pub mod assets;
/// Batch generation, sinks and verification codes.
pub mod batch;
/// Placeholder binding.
pub mod binding;
/// Stored-document codec.
pub mod codec;
/// Edit session and presets.
pub mod edit;
/// Rasterization.
pub mod render;
/// Scene document and element model.
pub mod scene;
/// Template load/save/generate helpers.
pub mod template;

pub use crate::foundation::core::{
    Affine, BezPath, CanvasSize, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, Point, Rect, Rgba8,
    Vec2,
};
pub use crate::foundation::error::{CertError, CertResult};
pub use crate::foundation::ids::ElementId;

pub use crate::assets::fonts::{FontBook, FontBookOpts};
pub use crate::assets::store::{
    AssetResolver, AssetStore, FsAssetResolver, MemoryAssetResolver, SceneAssets,
};
pub use crate::batch::pipeline::{
    BatchOpts, BatchRenderer, BatchReport, BatchSummary, RenderedRow, RowOutcome, RowStatus,
};
pub use crate::batch::sink::{DirectorySink, InMemorySink, OutputSink};
pub use crate::batch::verify::{GenerationMetadata, VerificationSeed, verification_code};
pub use crate::binding::{BindWarning, BindingRecord, BoundScene, bind, placeholders};
pub use crate::edit::presets::FieldPreset;
pub use crate::edit::session::{EditSession, Selection};
pub use crate::render::backend::{RenderBackend, RenderOpts, RenderedImage};
pub use crate::render::cpu::CpuRenderer;
pub use crate::scene::color::Paint;
pub use crate::scene::document::{Background, BackgroundFit, SceneDocument};
pub use crate::scene::element::{
    Element, ElementKind, FontWeight, ImageElement, OriginX, OriginY, Placement, Shape,
    ShapeKind, TextAlign, TextField, VerificationSlot,
};
pub use crate::scene::update::PropertyUpdate;
