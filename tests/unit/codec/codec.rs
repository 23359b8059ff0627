use super::*;
use crate::foundation::core::CanvasSize;
use crate::foundation::ids::ElementId;
use crate::scene::color::Paint;
use crate::scene::document::{Background, BackgroundFit};
use crate::scene::element::{
    Element, FontWeight, ImageElement, OriginX, OriginY, Shape, TextAlign, TextField,
    VerificationSlot,
};

fn sample() -> SceneDocument {
    let mut doc = SceneDocument::new(CanvasSize::new(800, 600).unwrap());
    doc.set_background(Background {
        source: "backgrounds/classic.svg".into(),
        fit: BackgroundFit::Stretch,
    });
    doc.set_background_color(Paint::parse("#fafafa").unwrap());

    let mut name = TextField::new("{{recipientName}}");
    name.font_family = "Georgia".into();
    name.font_size = 48.0;
    name.fill = Paint::parse("#1F2937").unwrap();
    name.weight = FontWeight::Bold;
    name.italic = true;
    name.align = TextAlign::Center;
    let mut text = Element::text(name)
        .at(600.0, 400.0)
        .with_origin(OriginX::Center, OriginY::Top);
    text.placement.rotation_deg = 12.5;
    text.placement.scale_x = 1.25;
    doc.insert_element(text).unwrap();

    let mut rect = Element::shape(Shape::rectangle(200.0, 100.0)).at(100.0, 100.0);
    rect.locked = true;
    rect.visible = false;
    let rect = doc.insert_element(rect).unwrap();

    doc.insert_element(Element::image(ImageElement::new("seal.png", 64.0, 64.0)).at(1.5, 2.25))
        .unwrap();
    let mut slot = VerificationSlot::new(120.0);
    slot.prefix = "https://verify.example/".into();
    doc.insert_element(Element::verification_slot(slot).at(1000.0, 700.0))
        .unwrap();
    doc.remove_element(rect).unwrap();
    doc
}

#[test]
fn round_trip_preserves_everything() {
    let doc = sample();
    let json = encode(&doc).unwrap();
    let back = decode(&json).unwrap();
    assert_eq!(back, doc);
    assert_eq!(back.next_id(), doc.next_id());
}

#[test]
fn encoded_form_is_self_describing() {
    let json = encode(&sample()).unwrap();
    let v: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["format"], FORMAT_TAG);
    assert_eq!(v["version"], FORMAT_VERSION);
    assert_eq!(v["canvas"]["width"], 800);
    assert_eq!(v["elements"][0]["type"], "text");
    assert_eq!(v["elements"][0]["fill"], "#1f2937");
    assert_eq!(v["elements"][2]["type"], "verification_code");
}

#[test]
fn empty_document_round_trips() {
    let doc = SceneDocument::default();
    assert_eq!(decode(&encode(&doc).unwrap()).unwrap(), doc);
}

#[test]
fn malformed_inputs() {
    for bad in [
        "not json",
        r#"{"canvas":{"width":10,"height":10}}"#,
        r#"{"version":2,"canvas":{"width":10,"height":10}}"#,
        r#"{"version":1,"canvas":{"width":10,"height":10},"elements":[{"id":1,"type":"blob","x":0,"y":0}]}"#,
        r#"{"version":1,"canvas":{"width":10,"height":10},"elements":[{"id":1,"type":"shape","x":0,"width":1,"height":1}]}"#,
    ] {
        assert!(
            matches!(decode(bad), Err(CertError::MalformedDocument(_))),
            "{bad}"
        );
    }
}

#[test]
fn unknown_fields_are_ignored() {
    let json = r#"{"format":"certiforge/scene","version":1,"canvas":{"width":10,"height":10},
        "editor_hint":"grid","elements":[{"id":4,"type":"shape","x":1,"y":2,"width":3,"height":4,"glow":true}]}"#;
    let doc = decode(json).unwrap();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.next_id(), 5);
}

#[test]
fn absent_config_is_default_document() {
    for input in [None, Some(""), Some("   "), Some("null"), Some("{}")] {
        let doc = decode_stored(input).unwrap();
        assert_eq!(doc, SceneDocument::default());
    }
}

#[test]
fn stored_legacy_config_is_imported() {
    let json = r##"{"version":"5.3.0","objects":[{"type":"rect","left":5,"top":6,"width":10,"height":20,"fill":"transparent","stroke":"#000","strokeWidth":2}]}"##;
    let doc = decode_stored(Some(json)).unwrap();
    assert_eq!(doc.len(), 1);
}

#[test]
fn check_lists_all_problems() {
    let errs = check(r#"{"canvas":{"width":0,"height":10}}"#).unwrap_err();
    assert_eq!(errs.errors.len(), 2);
    assert!(check("{").is_err());
}

#[test]
fn id_counter_limits() {
    let max_id = r#"{"version":1,"canvas":{"width":10,"height":10},
        "elements":[{"id":18446744073709551615,"type":"shape","x":0,"y":0,"width":1,"height":1}]}"#;
    assert!(matches!(decode(max_id), Err(CertError::MalformedDocument(_))));

    let max_next = r#"{"version":1,"canvas":{"width":10,"height":10},"next_id":18446744073709551615,
        "elements":[{"id":3,"type":"shape","x":0,"y":0,"width":1,"height":1}]}"#;
    let mut doc = decode(max_next).unwrap();
    assert!(matches!(
        doc.insert_element(Element::shape(Shape::rectangle(1.0, 1.0))),
        Err(CertError::Validation(_))
    ));
    assert!(matches!(
        doc.duplicate(ElementId(3)),
        Err(CertError::Validation(_))
    ));
    assert_eq!(doc.len(), 1);
}
