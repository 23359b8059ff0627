use super::*;
use crate::scene::element::ShapeKind;

const LEGACY: &str = r##"{
  "version": "5.3.0",
  "background": "#ffffff",
  "backgroundImage": { "type": "image", "src": "https://cdn.example/bg.svg" },
  "objects": [
    { "type": "i-text", "left": 600, "top": 400, "originX": "center", "text": "{{recipientName}}",
      "fontSize": 48, "fontFamily": "Georgia", "fill": "#1F2937", "textAlign": "center",
      "fontWeight": "bold", "fontStyle": "italic" },
    { "type": "rect", "left": 100, "top": 100, "width": 200, "height": 100,
      "fill": "transparent", "stroke": "#000000", "strokeWidth": 2, "angle": 15 },
    { "type": "circle", "left": 10, "top": 10, "radius": 25, "fill": "rgb(1,2,3)" },
    { "type": "path", "path": [] },
    { "type": "image", "left": 0, "top": 0, "width": 40, "height": 30, "src": "seal.png",
      "selectable": false, "visible": false }
  ]
}"##;

#[test]
fn imports_supported_objects_in_order() {
    let out = import_fabric(LEGACY).unwrap();
    let doc = &out.document;
    assert_eq!(doc.len(), 4);
    assert_eq!(doc.background().unwrap().source, "https://cdn.example/bg.svg");
    assert_eq!(out.skipped.len(), 1);
    assert!(out.skipped[0].contains("path"));

    let els: Vec<_> = doc.elements().collect();
    let text = els[0].as_text().unwrap();
    assert_eq!(text.content, "{{recipientName}}");
    assert_eq!(text.font_family, "Georgia");
    assert_eq!(text.weight, FontWeight::Bold);
    assert!(text.italic);
    assert_eq!(text.align, TextAlign::Center);
    assert_eq!(els[0].placement.origin_x, OriginX::Center);

    match &els[1].kind {
        ElementKind::Shape(s) => {
            assert_eq!(s.kind, ShapeKind::Rectangle);
            assert_eq!((s.width, s.height), (200.0, 100.0));
            assert!(s.fill.is_none());
            assert_eq!(s.stroke, Paint::BLACK);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(els[1].placement.rotation_deg, 15.0);

    match &els[2].kind {
        ElementKind::Shape(s) => {
            assert_eq!(s.kind, ShapeKind::Ellipse);
            assert_eq!((s.width, s.height), (50.0, 50.0));
            // Non-hex legacy colors fall back to no paint.
            assert!(s.fill.is_none());
        }
        other => panic!("unexpected {other:?}"),
    }

    assert!(els[3].locked);
    assert!(!els[3].visible);
}

#[test]
fn rejects_configs_without_objects() {
    assert!(import_fabric(r#"{"foo":1}"#).is_err());
    assert!(import_fabric("[]").is_err());
}
