use super::*;
use crate::scene::element::{ImageElement, Shape, TextField, VerificationSlot};

#[test]
fn text_updates_apply() {
    let mut el = Element::text(TextField::new("a"));
    el.apply_updates(&[
        PropertyUpdate::Text("b".into()),
        PropertyUpdate::FontSize(28.0),
        PropertyUpdate::Weight(FontWeight::Bold),
        PropertyUpdate::Align(TextAlign::Center),
    ])
    .unwrap();
    let t = el.as_text().unwrap();
    assert_eq!(t.content, "b");
    assert_eq!(t.font_size, 28.0);
    assert_eq!(t.weight, FontWeight::Bold);
    assert_eq!(t.align, TextAlign::Center);
}

#[test]
fn invalid_step_leaves_element_untouched() {
    let mut el = Element::text(TextField::new("a"));
    let before = el.clone();
    let err = el
        .apply_updates(&[
            PropertyUpdate::Text("changed".into()),
            PropertyUpdate::FontSize(-3.0),
        ])
        .unwrap_err();
    assert!(matches!(err, CertError::Validation(_)));
    assert_eq!(el, before);
}

#[test]
fn inapplicable_property_is_rejected() {
    let mut el = Element::image(ImageElement::new("a.png", 10.0, 10.0));
    let before = el.clone();
    assert!(el.apply_updates(&[PropertyUpdate::FontSize(12.0)]).is_err());
    assert!(el.apply_updates(&[PropertyUpdate::Fill(Paint::BLACK)]).is_err());
    assert_eq!(el, before);
}

#[test]
fn fill_targets_variant_color() {
    let red = Paint::parse("#ff0000").unwrap();
    let mut shape = Element::shape(Shape::rectangle(1.0, 1.0));
    shape.apply_updates(&[PropertyUpdate::Fill(red)]).unwrap();
    match &shape.kind {
        ElementKind::Shape(s) => assert_eq!(s.fill, red),
        _ => unreachable!(),
    }

    let mut slot = Element::verification_slot(VerificationSlot::new(50.0));
    slot.apply_updates(&[PropertyUpdate::Fill(red)]).unwrap();
    match &slot.kind {
        ElementKind::VerificationCode(v) => assert_eq!(v.dark, red),
        _ => unreachable!(),
    }
}

#[test]
fn locked_blocks_geometry_but_not_style() {
    let mut el = Element::shape(Shape::rectangle(10.0, 10.0));
    el.locked = true;
    assert!(
        el.apply_updates(&[PropertyUpdate::Position { x: 5.0, y: 5.0 }])
            .is_err()
    );
    assert!(
        el.apply_updates(&[PropertyUpdate::Size {
            width: 1.0,
            height: 1.0
        }])
        .is_err()
    );
    el.apply_updates(&[PropertyUpdate::Stroke(Paint::None)]).unwrap();

    el.apply_updates(&[
        PropertyUpdate::Locked(false),
        PropertyUpdate::Position { x: 5.0, y: 6.0 },
    ])
    .unwrap();
    assert_eq!((el.placement.x, el.placement.y), (5.0, 6.0));
}

#[test]
fn verification_slot_stays_square() {
    let mut el = Element::verification_slot(VerificationSlot::new(50.0));
    assert!(
        el.apply_updates(&[PropertyUpdate::Size {
            width: 60.0,
            height: 70.0
        }])
        .is_err()
    );
    el.apply_updates(&[PropertyUpdate::Size {
        width: 80.0,
        height: 80.0,
    }])
    .unwrap();
    assert_eq!(el.fixed_size(), Some((80.0, 80.0)));
}
