use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape as _;

use crate::assets::fonts::{FontBook, ResolvedFace, TextBrushRgba8, TextLayoutEngine, TextStyle};
use crate::assets::store::{PreparedAsset, PreparedImage, PreparedSvg, SceneAssets};
use crate::assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_params};
use crate::foundation::core::{Affine, BezPath, Rect, Rgba8};
use crate::foundation::error::{CertError, CertResult};
use crate::render::backend::{RenderBackend, RenderOpts, RenderedImage};
use crate::render::qr::QrMatrix;
use crate::scene::document::{BackgroundFit, SceneDocument};
use crate::scene::element::{
    Element, ElementKind, Placement, Shape, ShapeKind, TextAlign, TextField, VerificationSlot,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct SvgRasterKey {
    tree: usize,
    w: u32,
    h: u32,
}

/// CPU renderer powered by `vello_cpu`.
///
/// One renderer serves many documents: registered fonts are cached across calls, and pixmaps or
/// SVG rasters are kept for as long as something else still holds their source asset. The raster
/// surface itself lives only for a single render.
pub struct CpuRenderer {
    fonts: Arc<FontBook>,
    text_engine: TextLayoutEngine,
    font_data: HashMap<(usize, u32), (Arc<Vec<u8>>, vello_cpu::peniko::FontData)>,
    image_cache: HashMap<usize, (Arc<Vec<u8>>, vello_cpu::Image)>,
    svg_raster_cache: HashMap<SvgRasterKey, (Arc<usvg::Tree>, vello_cpu::Image)>,
}

impl std::fmt::Debug for CpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer")
            .field("font_faces", &self.fonts.face_count())
            .field("cached_images", &self.image_cache.len())
            .field("cached_svg_rasters", &self.svg_raster_cache.len())
            .finish()
    }
}

impl CpuRenderer {
    /// Renderer drawing text with faces from `fonts`.
    pub fn new(fonts: Arc<FontBook>) -> Self {
        Self {
            fonts,
            text_engine: TextLayoutEngine::new(),
            font_data: HashMap::new(),
            image_cache: HashMap::new(),
            svg_raster_cache: HashMap::new(),
        }
    }

    /// Font book used for text.
    pub fn fonts(&self) -> &Arc<FontBook> {
        &self.fonts
    }

    fn font_data_for(&mut self, face: &ResolvedFace) -> vello_cpu::peniko::FontData {
        let key = (Arc::as_ptr(&face.data) as usize, face.index);
        self.font_data
            .entry(key)
            .or_insert_with(|| {
                let blob = vello_cpu::peniko::Blob::from(face.data.as_ref().clone());
                (
                    Arc::clone(&face.data),
                    vello_cpu::peniko::FontData::new(blob, face.index),
                )
            })
            .1
            .clone()
    }

    /// Drop rasters whose source assets are no longer held by any store or scene.
    fn evict_released(&mut self) {
        self.image_cache
            .retain(|_, (bytes, _)| Arc::strong_count(bytes) > 1);
        self.svg_raster_cache
            .retain(|_, (tree, _)| Arc::strong_count(tree) > 1);
    }

    fn image_paint_for(&mut self, img: &PreparedImage) -> CertResult<vello_cpu::Image> {
        let key = Arc::as_ptr(&img.rgba8_premul) as usize;
        if let Some((_, paint)) = self.image_cache.get(&key) {
            return Ok(paint.clone());
        }
        let paint = rgba_premul_to_image(&img.rgba8_premul, img.width, img.height)?;
        self.image_cache
            .insert(key, (Arc::clone(&img.rgba8_premul), paint.clone()));
        Ok(paint)
    }

    fn svg_paint_for(
        &mut self,
        svg: &PreparedSvg,
        box_w: f64,
        box_h: f64,
        transform: Affine,
    ) -> CertResult<(vello_cpu::Image, f64, f64, Affine)> {
        let (w, h, transform_adjust) = svg_raster_params(box_w, box_h, transform)?;
        let key = SvgRasterKey {
            tree: Arc::as_ptr(&svg.tree) as usize,
            w,
            h,
        };
        if let Some((_, img)) = self.svg_raster_cache.get(&key) {
            return Ok((img.clone(), f64::from(w), f64::from(h), transform_adjust));
        }
        let rgba = rasterize_svg_to_premul_rgba8(&svg.tree, w, h)?;
        let img = rgba_premul_to_image(&rgba, w, h)?;
        self.svg_raster_cache
            .insert(key, (Arc::clone(&svg.tree), img.clone()));
        Ok((img, f64::from(w), f64::from(h), transform_adjust))
    }

    /// Draw `asset` stretched into a `box_w × box_h` box mapped by `transform`.
    fn draw_asset(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        asset: &PreparedAsset,
        box_w: f64,
        box_h: f64,
        transform: Affine,
    ) -> CertResult<()> {
        if !(box_w > 0.0 && box_h > 0.0) {
            return Ok(());
        }
        match asset {
            PreparedAsset::Image(img) => {
                if img.width == 0 || img.height == 0 {
                    return Ok(());
                }
                let paint = self.image_paint_for(img)?;
                let (iw, ih) = (f64::from(img.width), f64::from(img.height));
                let fit = Affine::scale_non_uniform(box_w / iw, box_h / ih);
                ctx.set_transform(affine_to_cpu(transform * fit));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
            }
            PreparedAsset::Svg(svg) => {
                let (img, w, h, transform_adjust) =
                    self.svg_paint_for(svg, box_w, box_h, transform)?;
                ctx.set_transform(affine_to_cpu(transform_adjust));
                ctx.set_paint(img);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            }
        }
        Ok(())
    }

    fn draw_background(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        doc: &SceneDocument,
        assets: &SceneAssets,
        base: Affine,
    ) -> CertResult<()> {
        let Some(bg) = doc.background() else {
            return Ok(());
        };
        let asset = assets.get(&bg.source).ok_or_else(|| {
            CertError::render(format!("background '{}' was not prepared", bg.source))
        })?;
        let (iw, ih) = asset.size();
        if !(iw > 0.0 && ih > 0.0) {
            return Err(CertError::render("background has no intrinsic size"));
        }
        let canvas = doc.canvas();
        let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
        let (box_w, box_h) = match bg.fit {
            BackgroundFit::ScaleToWidth => (cw, ih * cw / iw),
            BackgroundFit::Stretch => (cw, ch),
            BackgroundFit::None => (iw, ih),
        };
        self.draw_asset(ctx, asset, box_w, box_h, base)
    }

    fn draw_element(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        el: &Element,
        assets: &SceneAssets,
        base: Affine,
    ) -> CertResult<()> {
        match &el.kind {
            ElementKind::Text(text) => self.draw_text(ctx, &el.placement, text, base),
            ElementKind::Shape(shape) => {
                let tr = base * el.placement.box_transform(shape.width, shape.height);
                draw_shape(ctx, shape, tr);
                Ok(())
            }
            ElementKind::Image(img) => {
                let asset = assets.get(&img.source).ok_or_else(|| {
                    CertError::render(format!("image '{}' was not prepared", img.source))
                })?;
                let tr = base * el.placement.box_transform(img.width, img.height);
                self.draw_asset(ctx, asset, img.width, img.height, tr)
            }
            ElementKind::VerificationCode(slot) => {
                let tr = base * el.placement.box_transform(slot.size, slot.size);
                draw_verification_code(ctx, slot, tr)
            }
        }
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        placement: &Placement,
        text: &TextField,
        base: Affine,
    ) -> CertResult<()> {
        if text.content.is_empty() {
            return Ok(());
        }
        let Some(color) = text.fill.color() else {
            return Ok(());
        };
        let weight = text.weight.css_weight();
        let Some(face) = self.fonts.resolve(&text.font_family, weight, text.italic) else {
            return Ok(());
        };

        let style = TextStyle {
            size_px: text.font_size as f32,
            weight,
            italic: text.italic,
            brush: TextBrushRgba8 {
                r: color.r,
                g: color.g,
                b: color.b,
                a: color.a,
            },
        };
        let layout = self.text_engine.layout(&text.content, &face, style)?;
        let font = self.font_data_for(&face);

        // Alignment places each line inside the text box; the box itself is anchored by the
        // placement origin.
        let box_w = f64::from(layout.width());
        let box_h = f64::from(layout.height());
        ctx.set_transform(affine_to_cpu(base * placement.box_transform(box_w, box_h)));

        for line in layout.lines() {
            let metrics = line.metrics();
            let advance = metrics.advance - metrics.trailing_whitespace;
            let dx = match text.align {
                TextAlign::Left => 0.0,
                TextAlign::Center => (box_w as f32 - advance) / 2.0,
                TextAlign::Right => box_w as f32 - advance,
            };
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                // Positioned glyphs carry the run offset and the line baseline.
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x + dx,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

impl RenderBackend for CpuRenderer {
    #[tracing::instrument(level = "debug", skip_all, fields(elements = doc.len(), scale = opts.scale))]
    fn render(
        &mut self,
        doc: &SceneDocument,
        assets: &SceneAssets,
        opts: RenderOpts,
    ) -> CertResult<RenderedImage> {
        self.evict_released();
        let canvas = doc.canvas();
        let (width, height) = canvas.scaled(opts.scale)?;
        let w16: u16 = width
            .try_into()
            .map_err(|_| CertError::render("output width exceeds u16"))?;
        let h16: u16 = height
            .try_into()
            .map_err(|_| CertError::render("output height exceeds u16"))?;
        let base = Affine::scale_non_uniform(
            f64::from(width) / f64::from(canvas.width),
            f64::from(height) / f64::from(canvas.height),
        );

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        if let Some(c) = doc.background_color().color() {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color_to_cpu(c));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }
        self.draw_background(&mut ctx, doc, assets, base)
            .map_err(CertError::into_render)?;

        for el in doc.elements().filter(|e| e.visible) {
            self.draw_element(&mut ctx, el, assets, base)
                .map_err(|e| element_failure(el, e))?;
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(RenderedImage {
            width,
            height,
            data: pixmap.data_as_u8_slice().to_vec(),
        })
    }
}

fn element_failure(el: &Element, err: CertError) -> CertError {
    match err.into_render() {
        CertError::Render(msg) => {
            CertError::render(format!("{} {}: {msg}", el.kind.type_name(), el.id))
        }
        other => other,
    }
}

fn draw_shape(ctx: &mut vello_cpu::RenderContext, shape: &Shape, transform: Affine) {
    if !(shape.width > 0.0 && shape.height > 0.0) {
        return;
    }
    let rect = Rect::new(0.0, 0.0, shape.width, shape.height);
    let path = match shape.kind {
        ShapeKind::Rectangle => rect.to_path(0.1),
        ShapeKind::Ellipse => kurbo::Ellipse::from_rect(rect).to_path(0.1),
    };
    let cpu_path = bezpath_to_cpu(&path);
    ctx.set_transform(affine_to_cpu(transform));
    if let Some(c) = shape.fill.color() {
        ctx.set_paint(color_to_cpu(c));
        ctx.fill_path(&cpu_path);
    }
    if shape.stroke_width > 0.0 {
        if let Some(c) = shape.stroke.color() {
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(shape.stroke_width));
            ctx.set_paint(color_to_cpu(c));
            ctx.stroke_path(&cpu_path);
        }
    }
}

fn draw_verification_code(
    ctx: &mut vello_cpu::RenderContext,
    slot: &VerificationSlot,
    transform: Affine,
) -> CertResult<()> {
    let Some(payload) = slot.payload.as_deref() else {
        return Ok(());
    };
    if !(slot.size > 0.0) {
        return Ok(());
    }
    let matrix = QrMatrix::encode(payload)?;
    ctx.set_transform(affine_to_cpu(transform));
    if let Some(light) = slot.light.color() {
        ctx.set_paint(color_to_cpu(light));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, slot.size, slot.size));
    }
    if let Some(dark) = slot.dark.color() {
        ctx.set_paint(color_to_cpu(dark));
        ctx.fill_path(&bezpath_to_cpu(&matrix.dark_path(slot.size)));
    }
    Ok(())
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CertResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CertError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CertError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CertError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> CertResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
