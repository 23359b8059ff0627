//! Rasterization of bound scene documents.
//!
//! [`cpu::CpuRenderer`] draws the background first, then every visible element in z-order, each
//! under its own placement transform. Output pixels are premultiplied RGBA8 and can be encoded to
//! PNG via [`backend::RenderedImage::to_png`].

/// Render options, output images and the backend trait.
pub mod backend;
/// `vello_cpu` rasterizer.
pub mod cpu;
/// QR symbol encoding for verification slots.
pub mod qr;
