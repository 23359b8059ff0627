use super::*;
use serde_json::json;

fn minimal() -> Value {
    json!({
        "format": "certiforge/scene",
        "version": 1,
        "canvas": { "width": 1200, "height": 849 },
        "elements": []
    })
}

fn messages(v: &Value) -> Vec<String> {
    match validate_scene_value(v) {
        Ok(()) => Vec::new(),
        Err(e) => e.errors.iter().map(|e| e.to_string()).collect(),
    }
}

#[test]
fn minimal_document_is_valid() {
    assert!(messages(&minimal()).is_empty());
}

#[test]
fn version_is_required_and_checked() {
    let mut v = minimal();
    v.as_object_mut().unwrap().remove("version");
    assert_eq!(messages(&v), vec!["$.version: missing version tag".to_string()]);

    let mut v = minimal();
    v["version"] = json!(7);
    assert!(messages(&v)[0].starts_with("$.version: unsupported version 7"));
}

#[test]
fn negative_width_is_located() {
    let mut v = minimal();
    v["elements"] = json!([
        { "id": 1, "type": "text", "x": 0, "y": 0, "content": "a", "font_family": "Arial", "font_size": 12 },
        { "id": 2, "type": "shape", "x": 0, "y": 0, "width": -4, "height": 3 }
    ]);
    assert_eq!(messages(&v), vec!["$.elements[1].width: must be >= 0".to_string()]);
}

#[test]
fn unknown_type_and_missing_geometry_are_reported() {
    let mut v = minimal();
    v["elements"] = json!([
        { "id": 1, "type": "star", "x": 0, "y": 0 },
        { "id": 2, "type": "image", "y": 0, "source": "a.png", "width": 1 }
    ]);
    let msgs = messages(&v);
    assert!(msgs[0].starts_with("$.elements[0].type: unknown element type \"star\""));
    assert!(msgs.contains(&"$.elements[1].x: missing required field x".to_string()));
    assert!(msgs.contains(&"$.elements[1].height: missing required field height".to_string()));
}

#[test]
fn duplicate_ids_and_bad_colors() {
    let mut v = minimal();
    v["background_color"] = json!("white");
    v["elements"] = json!([
        { "id": 3, "type": "verification_code", "x": 0, "y": 0, "size": 10 },
        { "id": 3, "type": "verification_code", "x": 0, "y": 0, "size": 10, "dark": 5 }
    ]);
    let msgs = messages(&v);
    assert!(msgs.iter().any(|m| m.starts_with("$.background_color:")));
    assert!(msgs.contains(&"$.elements[1].id: duplicate element id 3".to_string()));
    assert!(msgs.contains(&"$.elements[1].dark: color must be a string".to_string()));
}

#[test]
fn canvas_bounds() {
    let mut v = minimal();
    v["canvas"] = json!({ "width": 0, "height": 20000 });
    let msgs = messages(&v);
    assert_eq!(msgs.len(), 2);
    assert!(msgs[0].starts_with("$.canvas.width"));
    assert!(msgs[1].starts_with("$.canvas.height"));
}

#[test]
fn non_object_root() {
    assert_eq!(messages(&json!([1, 2])), vec!["$: document must be a JSON object".to_string()]);
}
