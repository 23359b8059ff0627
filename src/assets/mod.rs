//! Asset resolution and decoding.
//!
//! All I/O happens here, ahead of rasterization: sources are read through an
//! [`store::AssetResolver`], decoded once into a shared cache, and handed to the renderer as
//! in-memory pixels or SVG trees.

/// Image and SVG decoding.
pub mod decode;
/// Font lookup and text shaping.
pub mod fonts;
/// Resolvers and the decoded-asset cache.
pub mod store;
/// SVG rasterization helpers.
pub mod svg_raster;
