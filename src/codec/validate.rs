use crate::codec::schema::{FORMAT_TAG, FORMAT_VERSION};
use crate::scene::color::Paint;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

const MAX_CANVAS_DIM: u64 = 16_384;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaPathElem {
    Field(&'static str),
    Index(usize),
}

/// One problem found in a stored scene document, located by JSON path.
#[derive(Debug, Clone)]
pub struct SchemaError {
    path: Vec<SchemaPathElem>,
    /// Human-readable description.
    pub message: String,
}

impl SchemaError {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }

    pub(crate) fn root(message: impl Into<String>) -> Self {
        Self::at(&[], message)
    }

    /// Path in `$.elements[3].width` form.
    pub fn path(&self) -> String {
        format_path(&self.path)
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// All problems found in one document.
#[derive(Debug, Clone)]
pub struct SchemaErrors {
    /// Individual problems in document order.
    pub errors: Vec<SchemaError>,
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

const ELEMENT_TYPES: [&str; 4] = ["text", "shape", "image", "verification_code"];

/// Check a parsed document against the stored scene format before typed decoding.
///
/// Reports every problem rather than stopping at the first one.
pub(crate) fn validate_scene_value(root: &Value) -> Result<(), SchemaErrors> {
    let mut errors = Vec::new();
    let Some(obj) = root.as_object() else {
        return Err(SchemaErrors {
            errors: vec![SchemaError::at(&[], "document must be a JSON object")],
        });
    };

    if let Some(format) = obj.get("format") {
        if format.as_str() != Some(FORMAT_TAG) {
            errors.push(SchemaError::at(
                &[SchemaPathElem::Field("format")],
                format!("format must be \"{FORMAT_TAG}\""),
            ));
        }
    }

    match obj.get("version") {
        None => errors.push(SchemaError::at(
            &[SchemaPathElem::Field("version")],
            "missing version tag",
        )),
        Some(v) if v.as_u64() == Some(FORMAT_VERSION) => {}
        Some(v) => errors.push(SchemaError::at(
            &[SchemaPathElem::Field("version")],
            format!("unsupported version {v} (expected {FORMAT_VERSION})"),
        )),
    }

    validate_canvas(obj, &mut errors);

    if let Some(v) = obj.get("background_color") {
        check_paint(v, &[SchemaPathElem::Field("background_color")], &mut errors);
    }

    match obj.get("background") {
        None | Some(Value::Null) => {}
        Some(Value::Object(bg)) => {
            let path = [SchemaPathElem::Field("background")];
            require_string(bg, "source", &path, &mut errors);
            if let Some(fit) = bg.get("fit") {
                check_enum(
                    fit,
                    &["scale_to_width", "stretch", "none"],
                    &[SchemaPathElem::Field("background"), SchemaPathElem::Field("fit")],
                    &mut errors,
                );
            }
        }
        Some(_) => errors.push(SchemaError::at(
            &[SchemaPathElem::Field("background")],
            "background must be an object or null",
        )),
    }

    if let Some(v) = obj.get("next_id") {
        if v.as_u64().is_none() {
            errors.push(SchemaError::at(
                &[SchemaPathElem::Field("next_id")],
                "next_id must be a non-negative integer",
            ));
        }
    }

    match obj.get("elements") {
        None => {}
        Some(Value::Array(items)) => {
            let mut ids = HashSet::new();
            for (i, item) in items.iter().enumerate() {
                let path = [SchemaPathElem::Field("elements"), SchemaPathElem::Index(i)];
                validate_element(item, &path, &mut ids, &mut errors);
            }
        }
        Some(_) => errors.push(SchemaError::at(
            &[SchemaPathElem::Field("elements")],
            "elements must be an array",
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors })
    }
}

fn validate_canvas(obj: &Map<String, Value>, errors: &mut Vec<SchemaError>) {
    let path = [SchemaPathElem::Field("canvas")];
    let Some(canvas) = obj.get("canvas") else {
        errors.push(SchemaError::at(&path, "missing canvas"));
        return;
    };
    let Some(canvas) = canvas.as_object() else {
        errors.push(SchemaError::at(&path, "canvas must be an object"));
        return;
    };
    for field in ["width", "height"] {
        let fpath = [SchemaPathElem::Field("canvas"), SchemaPathElem::Field(field)];
        match canvas.get(field).and_then(Value::as_u64) {
            Some(v) if (1..=MAX_CANVAS_DIM).contains(&v) => {}
            Some(_) => errors.push(SchemaError::at(
                &fpath,
                format!("must be in 1..={MAX_CANVAS_DIM}"),
            )),
            None => errors.push(SchemaError::at(&fpath, "must be a positive integer")),
        }
    }
}

fn validate_element(
    item: &Value,
    path: &[SchemaPathElem],
    ids: &mut HashSet<u64>,
    errors: &mut Vec<SchemaError>,
) {
    let Some(el) = item.as_object() else {
        errors.push(SchemaError::at(path, "element must be an object"));
        return;
    };

    match el.get("id").and_then(Value::as_u64) {
        Some(id) => {
            if !ids.insert(id) {
                errors.push(SchemaError::at(
                    &child(path, "id"),
                    format!("duplicate element id {id}"),
                ));
            }
        }
        None => errors.push(SchemaError::at(
            &child(path, "id"),
            "missing or non-integer id",
        )),
    }

    require_number(el, "x", path, false, errors);
    require_number(el, "y", path, false, errors);
    optional_number(el, "rotation", path, false, errors);
    optional_number(el, "scale_x", path, false, errors);
    optional_number(el, "scale_y", path, false, errors);
    if let Some(v) = el.get("origin_x") {
        check_enum(v, &["left", "center", "right"], &child(path, "origin_x"), errors);
    }
    if let Some(v) = el.get("origin_y") {
        check_enum(v, &["top", "center", "bottom"], &child(path, "origin_y"), errors);
    }
    for flag in ["visible", "locked"] {
        if let Some(v) = el.get(flag) {
            if !v.is_boolean() {
                errors.push(SchemaError::at(&child(path, flag), "must be a boolean"));
            }
        }
    }

    let ty = match el.get("type") {
        Some(Value::String(s)) => s.as_str(),
        Some(_) => {
            errors.push(SchemaError::at(&child(path, "type"), "type must be a string"));
            return;
        }
        None => {
            errors.push(SchemaError::at(&child(path, "type"), "missing element type"));
            return;
        }
    };

    match ty {
        "text" => {
            require_string(el, "content", path, errors);
            if require_string(el, "font_family", path, errors)
                .is_some_and(|s| s.trim().is_empty())
            {
                errors.push(SchemaError::at(
                    &child(path, "font_family"),
                    "must be non-empty",
                ));
            }
            if require_number(el, "font_size", path, true, errors).is_some_and(|v| v == 0.0) {
                errors.push(SchemaError::at(&child(path, "font_size"), "must be > 0"));
            }
            optional_paint(el, "fill", path, errors);
            if let Some(v) = el.get("weight") {
                check_enum(v, &["normal", "bold"], &child(path, "weight"), errors);
            }
            if let Some(v) = el.get("align") {
                check_enum(v, &["left", "center", "right"], &child(path, "align"), errors);
            }
        }
        "shape" => {
            if let Some(v) = el.get("shape") {
                check_enum(v, &["rectangle", "ellipse"], &child(path, "shape"), errors);
            }
            require_number(el, "width", path, true, errors);
            require_number(el, "height", path, true, errors);
            optional_number(el, "stroke_width", path, true, errors);
            optional_paint(el, "fill", path, errors);
            optional_paint(el, "stroke", path, errors);
        }
        "image" => {
            require_string(el, "source", path, errors);
            require_number(el, "width", path, true, errors);
            require_number(el, "height", path, true, errors);
        }
        "verification_code" => {
            require_number(el, "size", path, true, errors);
            optional_paint(el, "dark", path, errors);
            optional_paint(el, "light", path, errors);
        }
        other => errors.push(SchemaError::at(
            &child(path, "type"),
            format!(
                "unknown element type \"{other}\" (expected one of {})",
                ELEMENT_TYPES.join(", ")
            ),
        )),
    }
}

fn child(path: &[SchemaPathElem], field: &'static str) -> Vec<SchemaPathElem> {
    let mut p = path.to_vec();
    p.push(SchemaPathElem::Field(field));
    p
}

fn require_number(
    obj: &Map<String, Value>,
    field: &'static str,
    path: &[SchemaPathElem],
    non_negative: bool,
    errors: &mut Vec<SchemaError>,
) -> Option<f64> {
    if !obj.contains_key(field) {
        errors.push(SchemaError::at(
            &child(path, field),
            format!("missing required field {field}"),
        ));
        return None;
    }
    optional_number(obj, field, path, non_negative, errors)
}

fn optional_number(
    obj: &Map<String, Value>,
    field: &'static str,
    path: &[SchemaPathElem],
    non_negative: bool,
    errors: &mut Vec<SchemaError>,
) -> Option<f64> {
    let v = obj.get(field)?;
    let Some(n) = v.as_f64().filter(|n| n.is_finite()) else {
        errors.push(SchemaError::at(&child(path, field), "must be a finite number"));
        return None;
    };
    if non_negative && n < 0.0 {
        errors.push(SchemaError::at(&child(path, field), "must be >= 0"));
        return None;
    }
    Some(n)
}

fn require_string<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
    path: &[SchemaPathElem],
    errors: &mut Vec<SchemaError>,
) -> Option<&'a str> {
    match obj.get(field) {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => {
            errors.push(SchemaError::at(&child(path, field), "must be a string"));
            None
        }
        None => {
            errors.push(SchemaError::at(
                &child(path, field),
                format!("missing required field {field}"),
            ));
            None
        }
    }
}

fn optional_paint(
    obj: &Map<String, Value>,
    field: &'static str,
    path: &[SchemaPathElem],
    errors: &mut Vec<SchemaError>,
) {
    if let Some(v) = obj.get(field) {
        check_paint(v, &child(path, field), errors);
    }
}

fn check_paint(v: &Value, path: &[SchemaPathElem], errors: &mut Vec<SchemaError>) {
    match v.as_str() {
        Some(s) => {
            if let Err(e) = Paint::parse(s) {
                errors.push(SchemaError::at(path, e.to_string()));
            }
        }
        None => errors.push(SchemaError::at(path, "color must be a string")),
    }
}

fn check_enum(v: &Value, allowed: &[&str], path: &[SchemaPathElem], errors: &mut Vec<SchemaError>) {
    match v.as_str() {
        Some(s) if allowed.contains(&s) => {}
        _ => errors.push(SchemaError::at(
            path,
            format!("must be one of {}", allowed.join(", ")),
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/validate.rs"]
mod tests;
