use std::io::Cursor;

use anyhow::Context;

use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::assets::store::SceneAssets;
use crate::foundation::error::{CertError, CertResult};
use crate::scene::document::SceneDocument;

/// Options for one render call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOpts {
    /// Output multiplier applied to the canvas size (`2.0` doubles both axes).
    pub scale: f64,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl RenderOpts {
    /// Options with the given output multiplier.
    pub fn with_scale(scale: f64) -> Self {
        Self { scale }
    }
}

/// A rendered certificate as RGBA8 pixels.
///
/// Pixels are **premultiplied alpha**; [`RenderedImage::to_png`] converts back to straight alpha.
#[derive(Clone, Debug)]
pub struct RenderedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl RenderedImage {
    /// Premultiplied pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Straight-alpha RGBA8 copy of the pixels.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> CertResult<Vec<u8>> {
        let expected = (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4);
        if self.data.len() != expected {
            return Err(CertError::render("rendered buffer size does not match dimensions"));
        }
        let img = image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba8())
            .ok_or_else(|| CertError::render("rendered buffer size does not match dimensions"))?;
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(png)
    }
}

/// A rasterizer for bound scene documents.
///
/// Implementations perform no I/O: every asset a document draws is already decoded in the
/// [`SceneAssets`] passed alongside it.
pub trait RenderBackend {
    /// Rasterize `doc` at `opts.scale` times its canvas size.
    fn render(
        &mut self,
        doc: &SceneDocument,
        assets: &SceneAssets,
        opts: RenderOpts,
    ) -> CertResult<RenderedImage>;
}
