use crate::foundation::error::{CertError, CertResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Default design width of a certificate canvas (A4 landscape ratio).
pub const DEFAULT_CANVAS_WIDTH: u32 = 1200;
/// Default design height of a certificate canvas.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 849;

const MAX_CANVAS_DIM: u32 = 16_384;

/// Logical canvas dimensions in design-resolution pixels.
///
/// All element coordinates live in this space; it never changes for a given template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CanvasSize {
    /// Create a validated canvas size.
    pub fn new(width: u32, height: u32) -> CertResult<Self> {
        if width == 0 || height == 0 {
            return Err(CertError::validation("canvas width and height must be > 0"));
        }
        if width > MAX_CANVAS_DIM || height > MAX_CANVAS_DIM {
            return Err(CertError::validation(format!(
                "canvas size {width}x{height} exceeds {MAX_CANVAS_DIM}x{MAX_CANVAS_DIM}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Canvas bounds as a rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Output pixel dimensions for a render multiplier, rounded and at least 1x1.
    pub fn scaled(self, scale: f64) -> CertResult<(u32, u32)> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CertError::validation("render scale must be finite and > 0"));
        }
        let w = (f64::from(self.width) * scale).round().max(1.0);
        let h = (f64::from(self.height) * scale).round().max(1.0);
        if w > f64::from(MAX_CANVAS_DIM) || h > f64::from(MAX_CANVAS_DIM) {
            return Err(CertError::validation(format!(
                "scaled output {w}x{h} exceeds {MAX_CANVAS_DIM}x{MAX_CANVAS_DIM}"
            )));
        }
        Ok((w as u32, h as u32))
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    /// Build an opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Convert to premultiplied RGBA8 bytes.
    pub fn to_premul(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
