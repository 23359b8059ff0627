use qrcode::{EcLevel, QrCode};

use crate::foundation::core::{BezPath, Rect};
use crate::foundation::error::{CertError, CertResult};

/// Light modules added around the symbol on every side.
pub const QUIET_ZONE: usize = 4;

/// Module grid of an encoded QR symbol, quiet zone excluded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Encode `payload` at medium error correction.
    pub fn encode(payload: &str) -> CertResult<Self> {
        if payload.is_empty() {
            return Err(CertError::validation("verification payload is empty"));
        }
        let code = QrCode::with_error_correction_level(payload, EcLevel::M)
            .map_err(|e| CertError::render(format!("QR code generation failed: {e}")))?;
        let width = code.width();
        let mut dark = Vec::with_capacity(width * width);
        for y in 0..width {
            for x in 0..width {
                dark.push(code[(x, y)] == qrcode::Color::Dark);
            }
        }
        Ok(Self { width, dark })
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Modules per side including the quiet zone.
    pub fn total_width(&self) -> usize {
        self.width + 2 * QUIET_ZONE
    }

    /// Whether the module at column `x`, row `y` is dark.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    /// Dark modules as one path of squares inside a `size × size` box at the origin.
    ///
    /// Horizontal runs of dark modules are merged into a single rectangle.
    pub fn dark_path(&self, size: f64) -> BezPath {
        let module = size / self.total_width() as f64;
        let offset = QUIET_ZONE as f64 * module;
        let mut path = BezPath::new();
        for y in 0..self.width {
            let mut x = 0;
            while x < self.width {
                if !self.is_dark(x, y) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < self.width && self.is_dark(x, y) {
                    x += 1;
                }
                let r = Rect::new(
                    offset + start as f64 * module,
                    offset + y as f64 * module,
                    offset + x as f64 * module,
                    offset + (y + 1) as f64 * module,
                );
                push_rect(&mut path, r);
            }
        }
        path
    }
}

fn push_rect(path: &mut BezPath, r: Rect) {
    path.move_to((r.x0, r.y0));
    path.line_to((r.x1, r.y0));
    path.line_to((r.x1, r.y1));
    path.line_to((r.x0, r.y1));
    path.close_path();
}

#[cfg(test)]
#[path = "../../tests/unit/render/qr.rs"]
mod tests;
