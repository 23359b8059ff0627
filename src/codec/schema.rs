use crate::foundation::core::CanvasSize;
use crate::foundation::error::{CertError, CertResult};
use crate::foundation::ids::ElementId;
use crate::scene::color::Paint;
use crate::scene::document::{Background, BackgroundFit, SceneDocument};
use crate::scene::element::{
    Element, ElementKind, FontWeight, ImageElement, OriginX, OriginY, Placement, Shape, ShapeKind,
    TextAlign, TextField, VerificationSlot,
};
use serde::{Deserialize, Serialize};

/// Value of the top-level `format` field.
pub const FORMAT_TAG: &str = "certiforge/scene";
/// Current value of the top-level `version` field.
pub const FORMAT_VERSION: u64 = 1;

fn default_white() -> Paint {
    Paint::WHITE
}

fn default_black() -> Paint {
    Paint::BLACK
}

fn default_one() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SceneDef {
    pub(crate) format: String,
    pub(crate) version: u64,
    pub(crate) canvas: CanvasSize,
    #[serde(default = "default_white")]
    pub(crate) background_color: Paint,
    #[serde(default)]
    pub(crate) background: Option<BackgroundDef>,
    #[serde(default)]
    pub(crate) next_id: u64,
    #[serde(default)]
    pub(crate) elements: Vec<ElementDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct BackgroundDef {
    pub(crate) source: String,
    #[serde(default)]
    pub(crate) fit: BackgroundFit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ElementDef {
    pub(crate) id: ElementId,
    pub(crate) x: f64,
    pub(crate) y: f64,
    #[serde(default)]
    pub(crate) rotation: f64,
    #[serde(default = "default_one")]
    pub(crate) scale_x: f64,
    #[serde(default = "default_one")]
    pub(crate) scale_y: f64,
    #[serde(default)]
    pub(crate) origin_x: OriginX,
    #[serde(default)]
    pub(crate) origin_y: OriginY,
    #[serde(default = "default_true")]
    pub(crate) visible: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub(crate) locked: bool,
    #[serde(flatten)]
    pub(crate) kind: KindDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum KindDef {
    Text {
        content: String,
        font_family: String,
        font_size: f64,
        #[serde(default = "default_black")]
        fill: Paint,
        #[serde(default)]
        weight: FontWeight,
        #[serde(default)]
        italic: bool,
        #[serde(default)]
        align: TextAlign,
    },
    Shape {
        #[serde(default)]
        shape: ShapeKind,
        width: f64,
        height: f64,
        #[serde(default)]
        fill: Paint,
        #[serde(default)]
        stroke: Paint,
        #[serde(default)]
        stroke_width: f64,
    },
    Image {
        source: String,
        width: f64,
        height: f64,
    },
    VerificationCode {
        size: f64,
        #[serde(default = "default_black")]
        dark: Paint,
        #[serde(default = "default_white")]
        light: Paint,
        #[serde(default)]
        prefix: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<String>,
    },
}

impl From<&SceneDocument> for SceneDef {
    fn from(doc: &SceneDocument) -> Self {
        Self {
            format: FORMAT_TAG.to_string(),
            version: FORMAT_VERSION,
            canvas: doc.canvas(),
            background_color: doc.background_color(),
            background: doc.background().map(|b| BackgroundDef {
                source: b.source.clone(),
                fit: b.fit,
            }),
            next_id: doc.next_id(),
            elements: doc.elements().map(ElementDef::from).collect(),
        }
    }
}

impl From<&Element> for ElementDef {
    fn from(el: &Element) -> Self {
        let p = &el.placement;
        let kind = match &el.kind {
            ElementKind::Text(t) => KindDef::Text {
                content: t.content.clone(),
                font_family: t.font_family.clone(),
                font_size: t.font_size,
                fill: t.fill,
                weight: t.weight,
                italic: t.italic,
                align: t.align,
            },
            ElementKind::Shape(s) => KindDef::Shape {
                shape: s.kind,
                width: s.width,
                height: s.height,
                fill: s.fill,
                stroke: s.stroke,
                stroke_width: s.stroke_width,
            },
            ElementKind::Image(i) => KindDef::Image {
                source: i.source.clone(),
                width: i.width,
                height: i.height,
            },
            ElementKind::VerificationCode(v) => KindDef::VerificationCode {
                size: v.size,
                dark: v.dark,
                light: v.light,
                prefix: v.prefix.clone(),
                payload: v.payload.clone(),
            },
        };
        Self {
            id: el.id,
            x: p.x,
            y: p.y,
            rotation: p.rotation_deg,
            scale_x: p.scale_x,
            scale_y: p.scale_y,
            origin_x: p.origin_x,
            origin_y: p.origin_y,
            visible: el.visible,
            locked: el.locked,
            kind,
        }
    }
}

impl From<ElementDef> for Element {
    fn from(def: ElementDef) -> Self {
        let kind = match def.kind {
            KindDef::Text {
                content,
                font_family,
                font_size,
                fill,
                weight,
                italic,
                align,
            } => ElementKind::Text(TextField {
                content,
                font_family,
                font_size,
                fill,
                weight,
                italic,
                align,
            }),
            KindDef::Shape {
                shape,
                width,
                height,
                fill,
                stroke,
                stroke_width,
            } => ElementKind::Shape(Shape {
                kind: shape,
                width,
                height,
                fill,
                stroke,
                stroke_width,
            }),
            KindDef::Image {
                source,
                width,
                height,
            } => ElementKind::Image(ImageElement {
                source,
                width,
                height,
            }),
            KindDef::VerificationCode {
                size,
                dark,
                light,
                prefix,
                payload,
            } => ElementKind::VerificationCode(VerificationSlot {
                size,
                dark,
                light,
                prefix,
                payload,
            }),
        };
        Element {
            id: def.id,
            placement: Placement {
                x: def.x,
                y: def.y,
                rotation_deg: def.rotation,
                scale_x: def.scale_x,
                scale_y: def.scale_y,
                origin_x: def.origin_x,
                origin_y: def.origin_y,
            },
            visible: def.visible,
            locked: def.locked,
            kind,
        }
    }
}

impl TryFrom<SceneDef> for SceneDocument {
    type Error = CertError;

    fn try_from(def: SceneDef) -> CertResult<Self> {
        let canvas = CanvasSize::new(def.canvas.width, def.canvas.height)
            .map_err(|e| CertError::malformed(e.to_string()))?;
        let background = def.background.map(|b| Background {
            source: b.source,
            fit: b.fit,
        });
        let elements = def.elements.into_iter().map(Element::from).collect();
        SceneDocument::from_parts(
            canvas,
            def.background_color,
            background,
            elements,
            def.next_id,
        )
        .map_err(|e| match e {
            CertError::Validation(msg) => CertError::malformed(msg),
            other => other,
        })
    }
}
