use super::*;
use crate::scene::element::{Element, ImageElement, Shape, TextField};

fn template() -> (SceneDocument, Vec<ElementId>) {
    let mut doc = SceneDocument::default();
    let ids = vec![
        doc.insert_element(Element::text(TextField::new("{{name}}")).at(600.0, 400.0))
            .unwrap(),
        doc.insert_element(Element::text(TextField::new("Dear {{name}}")))
            .unwrap(),
        doc.insert_element(Element::image(ImageElement::new("{{ signature }}", 10.0, 10.0)))
            .unwrap(),
        doc.insert_element(Element::shape(Shape::rectangle(5.0, 5.0)))
            .unwrap(),
        doc.insert_element(Element::text(TextField::new("{{course}}")))
            .unwrap(),
        doc.insert_element(Element::text(TextField::new("{{name}}")))
            .unwrap(),
    ];
    (doc, ids)
}

fn text_of(doc: &SceneDocument, id: ElementId) -> String {
    doc.get(id).unwrap().as_text().unwrap().content.clone()
}

#[test]
fn substitutes_pure_placeholders_only() {
    let (doc, ids) = template();
    let record = BindingRecord::new()
        .with("name", "Ada Lovelace")
        .with("course", "Analytical Engines")
        .with("signature", "sig/ada.png");
    let bound = bind(&doc, &record);
    assert!(bound.warnings.is_empty());
    assert_eq!(text_of(&bound.document, ids[0]), "Ada Lovelace");
    assert_eq!(text_of(&bound.document, ids[1]), "Dear {{name}}");
    assert_eq!(text_of(&bound.document, ids[4]), "Analytical Engines");
    match &bound.document.get(ids[2]).unwrap().kind {
        ElementKind::Image(i) => assert_eq!(i.source, "sig/ada.png"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn missing_field_warns_once_and_substitutes_empty() {
    let (doc, ids) = template();
    let record = BindingRecord::new()
        .with("course", "X")
        .with("signature", "s.png");
    let bound = bind(&doc, &record);
    assert_eq!(
        bound.warnings,
        vec![BindWarning::MissingField {
            field: "name".into(),
            elements: vec![ids[0], ids[5]],
        }]
    );
    assert_eq!(text_of(&bound.document, ids[0]), "");
    assert_eq!(text_of(&bound.document, ids[5]), "");
}

#[test]
fn input_is_never_mutated_and_outputs_are_independent() {
    let (doc, ids) = template();
    let snapshot = doc.clone();
    let a = bind(&doc, &BindingRecord::new().with("name", "A"));
    let b = bind(&doc, &BindingRecord::new().with("name", "B"));
    assert_eq!(doc, snapshot);
    assert_eq!(text_of(&a.document, ids[0]), "A");
    assert_eq!(text_of(&b.document, ids[0]), "B");
    assert_eq!(text_of(&doc, ids[0]), "{{name}}");
}

#[test]
fn placeholders_are_distinct_in_z_order() {
    let (doc, _) = template();
    assert_eq!(placeholders(&doc), vec!["name", "signature", "course"]);
}

#[test]
fn warning_display() {
    let w = BindWarning::MissingField {
        field: "date".into(),
        elements: vec![ElementId(1), ElementId(2)],
    };
    assert_eq!(w.to_string(), "missing field \"date\" (2 elements)");
}
