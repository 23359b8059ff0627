use crate::foundation::error::{CertError, CertResult};
use crate::scene::color::Paint;
use crate::scene::document::{Background, SceneDocument};
use crate::scene::element::{
    Element, ElementKind, FontWeight, ImageElement, OriginX, OriginY, Placement, Shape, TextAlign,
    TextField,
};
use serde_json::{Map, Value};

/// Result of importing a legacy canvas-editor config.
#[derive(Debug, Clone)]
pub struct FabricImport {
    /// Imported document on the default canvas.
    pub document: SceneDocument,
    /// Descriptions of objects that had no counterpart and were dropped.
    pub skipped: Vec<String>,
}

/// Import a config produced by the legacy browser canvas editor.
///
/// The legacy form stores an `objects` array of `i-text`/`text`/`textbox`, `rect`, `ellipse`,
/// `circle` and `image` objects using `left`/`top`/`scaleX`/`angle`/`originX` geometry, plus
/// optional `background` color and `backgroundImage`.
pub fn import_fabric(json: &str) -> CertResult<FabricImport> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| CertError::malformed(format!("invalid JSON: {e}")))?;
    import_fabric_value(&value)
}

pub(crate) fn import_fabric_value(value: &Value) -> CertResult<FabricImport> {
    let root = value
        .as_object()
        .ok_or_else(|| CertError::malformed("legacy config must be a JSON object"))?;
    let objects = root
        .get("objects")
        .and_then(Value::as_array)
        .ok_or_else(|| CertError::malformed("legacy config has no objects array"))?;

    let mut doc = SceneDocument::default();
    let mut skipped = Vec::new();

    if let Some(color) = root.get("background").and_then(Value::as_str) {
        match Paint::parse(color) {
            Ok(p) => doc.set_background_color(p),
            Err(_) => skipped.push(format!("background color {color:?}")),
        }
    }
    if let Some(src) = root
        .get("backgroundImage")
        .and_then(Value::as_object)
        .and_then(|o| o.get("src"))
        .and_then(Value::as_str)
    {
        doc.set_background(Background::new(src));
    }

    for (i, obj) in objects.iter().enumerate() {
        let Some(obj) = obj.as_object() else {
            skipped.push(format!("objects[{i}]: not an object"));
            continue;
        };
        let ty = str_field(obj, "type").unwrap_or("").to_ascii_lowercase();
        let Some(element) = convert_object(&ty, obj) else {
            skipped.push(format!("objects[{i}]: type {ty:?}"));
            continue;
        };
        doc.insert_element(element)
            .map_err(|e| CertError::malformed(format!("objects[{i}]: {e}")))?;
    }

    Ok(FabricImport {
        document: doc,
        skipped,
    })
}

fn convert_object(ty: &str, obj: &Map<String, Value>) -> Option<Element> {
    let kind = match ty {
        "i-text" | "itext" | "text" | "textbox" => {
            let mut field = TextField::new(str_field(obj, "text").unwrap_or(""));
            if let Some(family) = str_field(obj, "fontFamily").filter(|s| !s.trim().is_empty()) {
                field.font_family = family.to_string();
            }
            if let Some(size) = num_field(obj, "fontSize").filter(|v| *v > 0.0) {
                field.font_size = size;
            }
            field.fill = paint_field(obj, "fill").unwrap_or(Paint::BLACK);
            field.weight = match obj.get("fontWeight") {
                Some(Value::String(s)) if s.eq_ignore_ascii_case("bold") => FontWeight::Bold,
                Some(Value::String(s)) => match s.parse::<u16>() {
                    Ok(w) if w >= 600 => FontWeight::Bold,
                    _ => FontWeight::Normal,
                },
                Some(Value::Number(n)) if n.as_f64().is_some_and(|w| w >= 600.0) => {
                    FontWeight::Bold
                }
                _ => FontWeight::Normal,
            };
            field.italic = str_field(obj, "fontStyle")
                .is_some_and(|s| s.eq_ignore_ascii_case("italic") || s == "oblique");
            field.align = match str_field(obj, "textAlign") {
                Some("center") => TextAlign::Center,
                Some("right") => TextAlign::Right,
                _ => TextAlign::Left,
            };
            ElementKind::Text(field)
        }
        "rect" => ElementKind::Shape(Shape {
            width: num_field(obj, "width").unwrap_or(0.0).max(0.0),
            height: num_field(obj, "height").unwrap_or(0.0).max(0.0),
            ..shape_paints(Shape::rectangle(0.0, 0.0), obj)
        }),
        "ellipse" => {
            let rx = num_field(obj, "rx").unwrap_or(0.0).max(0.0);
            let ry = num_field(obj, "ry").unwrap_or(0.0).max(0.0);
            ElementKind::Shape(Shape {
                width: rx * 2.0,
                height: ry * 2.0,
                ..shape_paints(Shape::ellipse(0.0, 0.0), obj)
            })
        }
        "circle" => {
            let r = num_field(obj, "radius").unwrap_or(0.0).max(0.0);
            ElementKind::Shape(Shape {
                width: r * 2.0,
                height: r * 2.0,
                ..shape_paints(Shape::ellipse(0.0, 0.0), obj)
            })
        }
        "image" => ElementKind::Image(ImageElement::new(
            str_field(obj, "src")?,
            num_field(obj, "width").unwrap_or(0.0).max(0.0),
            num_field(obj, "height").unwrap_or(0.0).max(0.0),
        )),
        _ => return None,
    };

    let placement = Placement {
        x: num_field(obj, "left").unwrap_or(0.0),
        y: num_field(obj, "top").unwrap_or(0.0),
        rotation_deg: num_field(obj, "angle").unwrap_or(0.0),
        scale_x: num_field(obj, "scaleX").unwrap_or(1.0),
        scale_y: num_field(obj, "scaleY").unwrap_or(1.0),
        origin_x: match str_field(obj, "originX") {
            Some("center") => OriginX::Center,
            Some("right") => OriginX::Right,
            _ => OriginX::Left,
        },
        origin_y: match str_field(obj, "originY") {
            Some("center") => OriginY::Center,
            Some("bottom") => OriginY::Bottom,
            _ => OriginY::Top,
        },
    };

    let mut el = Element::new(kind);
    el.placement = placement;
    el.visible = obj.get("visible").and_then(Value::as_bool).unwrap_or(true);
    el.locked = obj.get("selectable").and_then(Value::as_bool) == Some(false);
    Some(el)
}

fn shape_paints(mut shape: Shape, obj: &Map<String, Value>) -> Shape {
    shape.fill = paint_field(obj, "fill").unwrap_or(Paint::None);
    shape.stroke = paint_field(obj, "stroke").unwrap_or(Paint::None);
    shape.stroke_width = num_field(obj, "strokeWidth").unwrap_or(1.0).max(0.0);
    shape
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn num_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn paint_field(obj: &Map<String, Value>, key: &str) -> Option<Paint> {
    match obj.get(key) {
        Some(Value::Null) => Some(Paint::None),
        Some(Value::String(s)) => Paint::parse(s).ok(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/fabric.rs"]
mod tests;
