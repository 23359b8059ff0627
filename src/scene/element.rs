use crate::foundation::core::{Affine, Vec2};
use crate::foundation::error::{CertError, CertResult};
use crate::foundation::ids::ElementId;
use crate::scene::color::Paint;
use serde::{Deserialize, Serialize};

/// Horizontal anchor of an element's box relative to its `x` coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginX {
    /// `x` is the left edge.
    #[default]
    Left,
    /// `x` is the horizontal center.
    Center,
    /// `x` is the right edge.
    Right,
}

impl OriginX {
    fn factor(self) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }
}

/// Vertical anchor of an element's box relative to its `y` coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginY {
    /// `y` is the top edge.
    #[default]
    Top,
    /// `y` is the vertical center.
    Center,
    /// `y` is the bottom edge.
    Bottom,
}

impl OriginY {
    fn factor(self) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Center => 0.5,
            Self::Bottom => 1.0,
        }
    }
}

/// Geometric placement shared by every element variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Anchor x in canvas space.
    pub x: f64,
    /// Anchor y in canvas space.
    pub y: f64,
    /// Clockwise rotation about the anchor, in degrees.
    pub rotation_deg: f64,
    /// Horizontal scale factor.
    pub scale_x: f64,
    /// Vertical scale factor.
    pub scale_y: f64,
    /// Which point of the box sits at `x`.
    pub origin_x: OriginX,
    /// Which point of the box sits at `y`.
    pub origin_y: OriginY,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation_deg: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            origin_x: OriginX::Left,
            origin_y: OriginY::Top,
        }
    }
}

impl Placement {
    /// Placement at `(x, y)` with top-left origin and identity rotation/scale.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Map box-local coordinates (origin at the box's top-left) into canvas space.
    ///
    /// The anchor point selected by `origin_x`/`origin_y` lands on `(x, y)`; rotation and scale
    /// pivot around it.
    pub fn box_transform(&self, box_w: f64, box_h: f64) -> Affine {
        let anchor = Vec2::new(
            box_w * self.origin_x.factor(),
            box_h * self.origin_y.factor(),
        );
        Affine::translate(Vec2::new(self.x, self.y))
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate(-anchor)
    }

    fn validate(&self) -> CertResult<()> {
        for (name, v) in [
            ("x", self.x),
            ("y", self.y),
            ("rotation", self.rotation_deg),
            ("scale_x", self.scale_x),
            ("scale_y", self.scale_y),
        ] {
            if !v.is_finite() {
                return Err(CertError::validation(format!("{name} must be finite")));
            }
        }
        Ok(())
    }
}

/// Horizontal alignment of text lines inside the text box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Font weight of a text field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    /// Regular weight (400).
    #[default]
    Normal,
    /// Bold weight (700).
    Bold,
}

impl FontWeight {
    /// Numeric CSS weight.
    pub fn css_weight(self) -> u16 {
        match self {
            Self::Normal => 400,
            Self::Bold => 700,
        }
    }
}

/// A text field: literal text or a single binding placeholder such as `{{recipientName}}`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextField {
    /// Literal text or a placeholder.
    pub content: String,
    /// Font family name, resolved against the font book at render time.
    pub font_family: String,
    /// Font size in design pixels.
    pub font_size: f64,
    /// Text color.
    pub fill: Paint,
    /// Font weight.
    pub weight: FontWeight,
    /// Italic style.
    pub italic: bool,
    /// Line alignment inside the text box.
    pub align: TextAlign,
}

impl TextField {
    /// Default font family for new text.
    pub const DEFAULT_FAMILY: &'static str = "Arial";
    /// Default font size for new text.
    pub const DEFAULT_SIZE: f64 = 40.0;

    /// Black, left-aligned, regular text in the default family and size.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font_family: Self::DEFAULT_FAMILY.to_string(),
            font_size: Self::DEFAULT_SIZE,
            fill: Paint::BLACK,
            weight: FontWeight::Normal,
            italic: false,
            align: TextAlign::Left,
        }
    }
}

/// Geometric primitive drawn by a [`Shape`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Axis-aligned rectangle (before rotation).
    #[default]
    Rectangle,
    /// Ellipse inscribed in the box.
    Ellipse,
}

/// Filled and/or stroked rectangle or ellipse.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    /// Primitive kind.
    pub kind: ShapeKind,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Interior paint.
    pub fill: Paint,
    /// Outline paint.
    pub stroke: Paint,
    /// Outline width in design pixels.
    pub stroke_width: f64,
}

impl Shape {
    /// Outlined rectangle with a transparent interior, 2px black stroke.
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self {
            kind: ShapeKind::Rectangle,
            width,
            height,
            fill: Paint::None,
            stroke: Paint::BLACK,
            stroke_width: 2.0,
        }
    }

    /// Outlined ellipse with a transparent interior, 2px black stroke.
    pub fn ellipse(width: f64, height: f64) -> Self {
        Self {
            kind: ShapeKind::Ellipse,
            ..Self::rectangle(width, height)
        }
    }
}

/// Raster or SVG image drawn into a `width × height` box.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageElement {
    /// Asset reference (relative path, URL-like key, `data:` URI or placeholder).
    pub source: String,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
}

impl ImageElement {
    /// Image with the given source and box size.
    pub fn new(source: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            source: source.into(),
            width,
            height,
        }
    }
}

/// Reserved slot for a per-certificate verification QR code.
///
/// The slot is inert until a payload is attached for a specific output; slots without payload
/// are skipped during rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct VerificationSlot {
    /// Edge length of the square code, quiet zone included.
    pub size: f64,
    /// Module color.
    pub dark: Paint,
    /// Background behind the code.
    pub light: Paint,
    /// Text prepended to the code to form the encoded payload (e.g. a lookup URL).
    pub prefix: String,
    /// Encoded payload for the output currently being rendered.
    pub payload: Option<String>,
}

impl VerificationSlot {
    /// Black-on-white slot of the given size with no prefix.
    pub fn new(size: f64) -> Self {
        Self {
            size,
            dark: Paint::BLACK,
            light: Paint::WHITE,
            prefix: String::new(),
            payload: None,
        }
    }
}

/// Variant-specific element data.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// Text field.
    Text(TextField),
    /// Rectangle or ellipse.
    Shape(Shape),
    /// Image.
    Image(ImageElement),
    /// Verification code slot.
    VerificationCode(VerificationSlot),
}

impl ElementKind {
    /// Stable discriminant name used by the codec.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Shape(_) => "shape",
            Self::Image(_) => "image",
            Self::VerificationCode(_) => "verification_code",
        }
    }
}

/// One visual unit placed on a scene document.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Identifier, assigned by the owning document on insertion.
    pub id: ElementId,
    /// Position, rotation, scale and origin.
    pub placement: Placement,
    /// Hidden elements are kept but not drawn.
    pub visible: bool,
    /// Locked elements reject geometric edits.
    pub locked: bool,
    /// Variant data.
    pub kind: ElementKind,
}

impl Element {
    /// Visible, unlocked element at the canvas origin.
    ///
    /// The identifier is a placeholder until the element is inserted into a document.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId(0),
            placement: Placement::default(),
            visible: true,
            locked: false,
            kind,
        }
    }

    /// Text element.
    pub fn text(field: TextField) -> Self {
        Self::new(ElementKind::Text(field))
    }

    /// Shape element.
    pub fn shape(shape: Shape) -> Self {
        Self::new(ElementKind::Shape(shape))
    }

    /// Image element.
    pub fn image(image: ImageElement) -> Self {
        Self::new(ElementKind::Image(image))
    }

    /// Verification code slot.
    pub fn verification_slot(slot: VerificationSlot) -> Self {
        Self::new(ElementKind::VerificationCode(slot))
    }

    /// Builder-style anchor position.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.placement.x = x;
        self.placement.y = y;
        self
    }

    /// Builder-style origin mode.
    pub fn with_origin(mut self, origin_x: OriginX, origin_y: OriginY) -> Self {
        self.placement.origin_x = origin_x;
        self.placement.origin_y = origin_y;
        self
    }

    /// Text data, if this is a text field.
    pub fn as_text(&self) -> Option<&TextField> {
        match &self.kind {
            ElementKind::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Box size for variants with explicit dimensions.
    ///
    /// Text boxes depend on font metrics and are measured by the renderer.
    pub fn fixed_size(&self) -> Option<(f64, f64)> {
        match &self.kind {
            ElementKind::Text(_) => None,
            ElementKind::Shape(s) => Some((s.width, s.height)),
            ElementKind::Image(i) => Some((i.width, i.height)),
            ElementKind::VerificationCode(v) => Some((v.size, v.size)),
        }
    }

    /// Check every attribute against its allowed domain.
    pub fn validate(&self) -> CertResult<()> {
        self.placement
            .validate()
            .map_err(|e| CertError::validation(format!("element {}: {e}", self.id)))?;

        let check_dim = |name: &str, v: f64| -> CertResult<()> {
            if !v.is_finite() {
                return Err(CertError::validation(format!(
                    "element {}: {name} must be finite",
                    self.id
                )));
            }
            if v < 0.0 {
                return Err(CertError::validation(format!(
                    "element {}: {name} must be >= 0",
                    self.id
                )));
            }
            Ok(())
        };

        match &self.kind {
            ElementKind::Text(t) => {
                check_dim("font_size", t.font_size)?;
                if t.font_size == 0.0 {
                    return Err(CertError::validation(format!(
                        "element {}: font_size must be > 0",
                        self.id
                    )));
                }
                if t.font_family.trim().is_empty() {
                    return Err(CertError::validation(format!(
                        "element {}: font_family must be non-empty",
                        self.id
                    )));
                }
            }
            ElementKind::Shape(s) => {
                check_dim("width", s.width)?;
                check_dim("height", s.height)?;
                check_dim("stroke_width", s.stroke_width)?;
            }
            ElementKind::Image(i) => {
                check_dim("width", i.width)?;
                check_dim("height", i.height)?;
            }
            ElementKind::VerificationCode(v) => {
                check_dim("size", v.size)?;
                if v.dark.is_none() {
                    return Err(CertError::validation(format!(
                        "element {}: verification code color must not be none",
                        self.id
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/element.rs"]
mod tests;
