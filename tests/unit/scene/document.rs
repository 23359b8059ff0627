use super::*;
use crate::scene::element::{Shape, TextField};

fn rect_at(x: f64) -> Element {
    Element::shape(Shape::rectangle(10.0, 10.0)).at(x, 0.0)
}

fn doc_with(n: usize) -> (SceneDocument, Vec<ElementId>) {
    let mut doc = SceneDocument::default();
    let ids = (0..n)
        .map(|i| doc.insert_element(rect_at(i as f64)).unwrap())
        .collect();
    (doc, ids)
}

#[test]
fn new_document_is_empty() {
    let doc = SceneDocument::default();
    assert!(doc.is_empty());
    assert!(doc.background().is_none());
    assert_eq!(doc.canvas(), CanvasSize::default());
    assert_eq!(doc.background_color(), Paint::WHITE);
}

#[test]
fn insert_appends_on_top_with_fresh_ids() {
    let (doc, ids) = doc_with(3);
    assert_eq!(doc.z_order(), ids.as_slice());
    assert_eq!(doc.index_of(ids[2]), Some(2));
    assert_ne!(ids[0], ids[1]);
    doc.check_invariants().unwrap();
}

#[test]
fn insert_rejects_invalid_element() {
    let mut doc = SceneDocument::default();
    let err = doc
        .insert_element(Element::shape(Shape::rectangle(-5.0, 1.0)))
        .unwrap_err();
    assert!(matches!(err, CertError::Validation(_)));
    assert!(doc.is_empty());
}

#[test]
fn set_background_is_idempotent() {
    let mut doc = SceneDocument::default();
    doc.set_background(Background::new("bg.svg"));
    let once = doc.clone();
    doc.set_background(Background::new("bg.svg"));
    assert_eq!(doc, once);
    doc.clear_background();
    assert!(doc.background().is_none());
}

#[test]
fn remove_compacts_and_reports_missing() {
    let (mut doc, ids) = doc_with(3);
    doc.remove_element(ids[1]).unwrap();
    assert_eq!(doc.z_order(), &[ids[0], ids[2]]);
    assert!(matches!(
        doc.remove_element(ids[1]),
        Err(CertError::NotFound(_))
    ));
    doc.check_invariants().unwrap();
}

#[test]
fn ids_are_not_reused_after_removal() {
    let (mut doc, ids) = doc_with(2);
    doc.remove_element(ids[1]).unwrap();
    let id = doc.insert_element(rect_at(9.0)).unwrap();
    assert!(!ids.contains(&id));
}

#[test]
fn reorder_clamps() {
    let (mut doc, ids) = doc_with(3);
    assert_eq!(doc.reorder(ids[0], 99).unwrap(), 2);
    assert_eq!(doc.z_order(), &[ids[1], ids[2], ids[0]]);
    assert!(matches!(
        doc.reorder(ElementId(999), 0),
        Err(CertError::NotFound(_))
    ));
}

#[test]
fn reorder_back_element_to_zero_keeps_everything() {
    let (mut doc, ids) = doc_with(4);
    assert_eq!(doc.reorder(ids[0], 0).unwrap(), 0);
    assert_eq!(doc.z_order(), ids.as_slice());
}

#[test]
fn front_and_back() {
    let (mut doc, ids) = doc_with(3);
    doc.bring_to_front(ids[0]).unwrap();
    assert_eq!(doc.z_order(), &[ids[1], ids[2], ids[0]]);
    doc.send_to_back(ids[2]).unwrap();
    assert_eq!(doc.z_order(), &[ids[2], ids[1], ids[0]]);
}

#[test]
fn duplicate_inserts_offset_copy_above_source() {
    let (mut doc, ids) = doc_with(3);
    let copy = doc.duplicate(ids[0]).unwrap();
    assert_eq!(doc.z_order(), &[ids[0], copy, ids[1], ids[2]]);
    let src = doc.get(ids[0]).unwrap();
    let dup = doc.get(copy).unwrap();
    assert_eq!(dup.placement.x, src.placement.x + DUPLICATE_OFFSET);
    assert_eq!(dup.placement.y, src.placement.y + DUPLICATE_OFFSET);
    assert_eq!(dup.kind, src.kind);
    doc.check_invariants().unwrap();
}

#[test]
fn update_element_is_atomic() {
    let mut doc = SceneDocument::default();
    let id = doc
        .insert_element(Element::text(TextField::new("hello")))
        .unwrap();
    let before = doc.clone();
    assert!(
        doc.update_element(
            id,
            &[
                PropertyUpdate::Text("x".into()),
                PropertyUpdate::StrokeWidth(1.0)
            ]
        )
        .is_err()
    );
    assert_eq!(doc, before);
    assert!(matches!(
        doc.update_element(ElementId(77), &[]),
        Err(CertError::NotFound(_))
    ));
}

#[test]
fn z_order_survives_mixed_operations() {
    let mut doc = SceneDocument::default();
    let mut live = Vec::new();
    for step in 0..40u64 {
        match step % 5 {
            0 | 1 => live.push(doc.insert_element(rect_at(step as f64)).unwrap()),
            2 if !live.is_empty() => {
                let id = live.remove((step as usize) % live.len());
                doc.remove_element(id).unwrap();
            }
            3 if !live.is_empty() => {
                let id = live[(step as usize * 7) % live.len()];
                doc.reorder(id, (step as usize) % 4).unwrap();
            }
            _ if !live.is_empty() => {
                live.push(doc.duplicate(live[0]).unwrap());
            }
            _ => {}
        }
        doc.check_invariants().unwrap();
        assert_eq!(doc.len(), live.len());
    }
}

#[test]
fn exhausted_id_counter_fails_without_mutation() {
    let mut seed = rect_at(0.0);
    seed.id = ElementId(7);
    let mut doc = SceneDocument::from_parts(
        CanvasSize::default(),
        Paint::WHITE,
        None,
        vec![seed],
        u64::MAX,
    )
    .unwrap();
    assert_eq!(doc.next_id(), u64::MAX);

    assert!(matches!(
        doc.insert_element(rect_at(1.0)),
        Err(CertError::Validation(_))
    ));
    assert!(matches!(
        doc.duplicate(ElementId(7)),
        Err(CertError::Validation(_))
    ));
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.next_id(), u64::MAX);
    doc.check_invariants().unwrap();
}

#[test]
fn largest_element_id_is_rejected_on_rebuild() {
    let mut el = rect_at(0.0);
    el.id = ElementId(u64::MAX);
    let err = SceneDocument::from_parts(CanvasSize::default(), Paint::WHITE, None, vec![el], 1)
        .unwrap_err();
    assert!(matches!(err, CertError::MalformedDocument(_)));
}
