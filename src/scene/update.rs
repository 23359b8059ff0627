use crate::foundation::error::{CertError, CertResult};
use crate::scene::color::Paint;
use crate::scene::element::{
    Element, ElementKind, FontWeight, OriginX, OriginY, ShapeKind, TextAlign,
};

/// One typed property edit.
///
/// Every variant names a concrete attribute; applying it to an element variant that has no such
/// attribute fails with a validation error instead of being ignored.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyUpdate {
    /// Move the anchor.
    Position {
        /// New x.
        x: f64,
        /// New y.
        y: f64,
    },
    /// Rotation in degrees.
    Rotation(f64),
    /// Scale factors.
    Scale {
        /// Horizontal factor.
        x: f64,
        /// Vertical factor.
        y: f64,
    },
    /// Anchor mode.
    Origin {
        /// Horizontal anchor.
        x: OriginX,
        /// Vertical anchor.
        y: OriginY,
    },
    /// Visibility flag.
    Visible(bool),
    /// Lock flag.
    Locked(bool),
    /// Text content (text fields only).
    Text(String),
    /// Font family (text fields only).
    FontFamily(String),
    /// Font size (text fields only).
    FontSize(f64),
    /// Fill paint: text color, shape interior, or code module color.
    Fill(Paint),
    /// Font weight (text fields only).
    Weight(FontWeight),
    /// Italic flag (text fields only).
    Italic(bool),
    /// Alignment (text fields only).
    Align(TextAlign),
    /// Shape primitive (shapes only).
    ShapeKind(ShapeKind),
    /// Outline paint (shapes only).
    Stroke(Paint),
    /// Outline width (shapes only).
    StrokeWidth(f64),
    /// Box size. Verification slots are square and require `width == height`.
    Size {
        /// New width.
        width: f64,
        /// New height.
        height: f64,
    },
    /// Image source (images only).
    Source(String),
    /// Payload prefix (verification slots only).
    CodePrefix(String),
}

impl PropertyUpdate {
    /// Attribute name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Position { .. } => "position",
            Self::Rotation(_) => "rotation",
            Self::Scale { .. } => "scale",
            Self::Origin { .. } => "origin",
            Self::Visible(_) => "visible",
            Self::Locked(_) => "locked",
            Self::Text(_) => "text",
            Self::FontFamily(_) => "font_family",
            Self::FontSize(_) => "font_size",
            Self::Fill(_) => "fill",
            Self::Weight(_) => "weight",
            Self::Italic(_) => "italic",
            Self::Align(_) => "align",
            Self::ShapeKind(_) => "shape_kind",
            Self::Stroke(_) => "stroke",
            Self::StrokeWidth(_) => "stroke_width",
            Self::Size { .. } => "size",
            Self::Source(_) => "source",
            Self::CodePrefix(_) => "code_prefix",
        }
    }

    /// Return `true` for edits that move or resize the element.
    pub fn is_geometric(&self) -> bool {
        matches!(
            self,
            Self::Position { .. }
                | Self::Rotation(_)
                | Self::Scale { .. }
                | Self::Origin { .. }
                | Self::Size { .. }
        )
    }

    fn apply(&self, el: &mut Element) -> CertResult<()> {
        if el.locked && self.is_geometric() {
            return Err(CertError::validation(format!(
                "element {} is locked; {} cannot change",
                el.id,
                self.name()
            )));
        }

        let inapplicable = |el: &Element, upd: &PropertyUpdate| {
            CertError::validation(format!(
                "property {} does not apply to {} element {}",
                upd.name(),
                el.kind.type_name(),
                el.id
            ))
        };

        match self {
            Self::Position { x, y } => {
                el.placement.x = *x;
                el.placement.y = *y;
            }
            Self::Rotation(deg) => el.placement.rotation_deg = *deg,
            Self::Scale { x, y } => {
                el.placement.scale_x = *x;
                el.placement.scale_y = *y;
            }
            Self::Origin { x, y } => {
                el.placement.origin_x = *x;
                el.placement.origin_y = *y;
            }
            Self::Visible(v) => el.visible = *v,
            Self::Locked(v) => el.locked = *v,
            Self::Text(s) => match &mut el.kind {
                ElementKind::Text(t) => t.content = s.clone(),
                _ => return Err(inapplicable(el, self)),
            },
            Self::FontFamily(s) => match &mut el.kind {
                ElementKind::Text(t) => t.font_family = s.clone(),
                _ => return Err(inapplicable(el, self)),
            },
            Self::FontSize(v) => match &mut el.kind {
                ElementKind::Text(t) => t.font_size = *v,
                _ => return Err(inapplicable(el, self)),
            },
            Self::Fill(p) => match &mut el.kind {
                ElementKind::Text(t) => t.fill = *p,
                ElementKind::Shape(s) => s.fill = *p,
                ElementKind::VerificationCode(v) => v.dark = *p,
                ElementKind::Image(_) => return Err(inapplicable(el, self)),
            },
            Self::Weight(w) => match &mut el.kind {
                ElementKind::Text(t) => t.weight = *w,
                _ => return Err(inapplicable(el, self)),
            },
            Self::Italic(v) => match &mut el.kind {
                ElementKind::Text(t) => t.italic = *v,
                _ => return Err(inapplicable(el, self)),
            },
            Self::Align(a) => match &mut el.kind {
                ElementKind::Text(t) => t.align = *a,
                _ => return Err(inapplicable(el, self)),
            },
            Self::ShapeKind(k) => match &mut el.kind {
                ElementKind::Shape(s) => s.kind = *k,
                _ => return Err(inapplicable(el, self)),
            },
            Self::Stroke(p) => match &mut el.kind {
                ElementKind::Shape(s) => s.stroke = *p,
                _ => return Err(inapplicable(el, self)),
            },
            Self::StrokeWidth(v) => match &mut el.kind {
                ElementKind::Shape(s) => s.stroke_width = *v,
                _ => return Err(inapplicable(el, self)),
            },
            Self::Size { width, height } => match &mut el.kind {
                ElementKind::Shape(s) => {
                    s.width = *width;
                    s.height = *height;
                }
                ElementKind::Image(i) => {
                    i.width = *width;
                    i.height = *height;
                }
                ElementKind::VerificationCode(v) => {
                    if width != height {
                        return Err(CertError::validation(format!(
                            "verification slot {} must stay square (got {width}x{height})",
                            el.id
                        )));
                    }
                    v.size = *width;
                }
                ElementKind::Text(_) => return Err(inapplicable(el, self)),
            },
            Self::Source(s) => match &mut el.kind {
                ElementKind::Image(i) => i.source = s.clone(),
                _ => return Err(inapplicable(el, self)),
            },
            Self::CodePrefix(s) => match &mut el.kind {
                ElementKind::VerificationCode(v) => v.prefix = s.clone(),
                _ => return Err(inapplicable(el, self)),
            },
        }
        Ok(())
    }
}

impl Element {
    /// Apply a group of updates atomically.
    ///
    /// Updates are applied in order to a scratch copy which is then validated; `self` is only
    /// replaced when every step succeeds. The lock flag is checked against the scratch state, so
    /// `[Locked(false), Position { .. }]` unlocks and moves in one step.
    pub fn apply_updates(&mut self, updates: &[PropertyUpdate]) -> CertResult<()> {
        let mut next = self.clone();
        for upd in updates {
            upd.apply(&mut next)?;
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/update.rs"]
mod tests;
