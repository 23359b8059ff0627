use crate::foundation::core::Affine;
use crate::foundation::error::{CertError, CertResult};

const MAX_DIM: u32 = 16_384;

/// Compute a raster size for an SVG drawn into a `box_w × box_h` box under `transform`.
///
/// Returns `(width, height, transform_adjust)`: rasterize the SVG into a pixmap of
/// `(width, height)` and draw it with `transform_adjust` in place of `transform` so scaled-up
/// SVGs stay sharp.
pub fn svg_raster_params(
    box_w: f64,
    box_h: f64,
    transform: Affine,
) -> CertResult<(u32, u32, Affine)> {
    if !box_w.is_finite() || !box_h.is_finite() || box_w <= 0.0 || box_h <= 0.0 {
        return Err(CertError::render("svg target box must be finite and > 0"));
    }

    let [a, b, c, d, _e, _f] = transform.as_coeffs();
    let sx = (a * a + b * b).sqrt().max(1e-6);
    let sy = (c * c + d * d).sqrt().max(1e-6);

    let w = (box_w * sx).ceil().max(1.0);
    let h = (box_h * sy).ceil().max(1.0);
    if w > f64::from(MAX_DIM) || h > f64::from(MAX_DIM) {
        return Err(CertError::render(format!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    let (w, h) = (w as u32, h as u32);

    // Pixel-space coordinates of the raster map back onto the box before `transform`.
    let adjust = Affine::scale_non_uniform(box_w / f64::from(w), box_h / f64::from(h));
    Ok((w, h, transform * adjust))
}

/// Rasterize an SVG tree stretched to `width × height` into premultiplied RGBA8.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> CertResult<Vec<u8>> {
    let size = tree.size();
    if !(size.width() > 0.0 && size.height() > 0.0) {
        return Err(CertError::render("svg has invalid width/height"));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| CertError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
