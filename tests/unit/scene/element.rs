use super::*;

#[test]
fn box_transform_maps_anchor_to_position() {
    let mut p = Placement::at(600.0, 400.0);
    p.origin_x = OriginX::Center;
    p.origin_y = OriginY::Center;
    let t = p.box_transform(200.0, 100.0);
    let c = t * kurbo::Point::new(100.0, 50.0);
    assert!((c.x - 600.0).abs() < 1e-9);
    assert!((c.y - 400.0).abs() < 1e-9);
}

#[test]
fn box_transform_rotates_about_anchor() {
    let mut p = Placement::at(10.0, 10.0);
    p.rotation_deg = 90.0;
    let t = p.box_transform(4.0, 2.0);
    let corner = t * kurbo::Point::new(4.0, 0.0);
    assert!((corner.x - 10.0).abs() < 1e-9);
    assert!((corner.y - 14.0).abs() < 1e-9);
}

#[test]
fn validate_rejects_negative_dimensions() {
    let el = Element::shape(Shape::rectangle(-1.0, 10.0));
    assert!(matches!(el.validate(), Err(CertError::Validation(_))));

    let el = Element::image(ImageElement::new("a.png", 10.0, f64::INFINITY));
    assert!(el.validate().is_err());
}

#[test]
fn validate_rejects_bad_text() {
    let mut field = TextField::new("hi");
    field.font_size = 0.0;
    assert!(Element::text(field).validate().is_err());

    let mut field = TextField::new("hi");
    field.font_family = "  ".into();
    assert!(Element::text(field).validate().is_err());
}

#[test]
fn validate_rejects_non_finite_position() {
    let el = Element::text(TextField::new("x")).at(f64::NAN, 0.0);
    assert!(el.validate().is_err());
}

#[test]
fn fixed_size_per_variant() {
    assert_eq!(Element::text(TextField::new("x")).fixed_size(), None);
    assert_eq!(
        Element::shape(Shape::ellipse(3.0, 4.0)).fixed_size(),
        Some((3.0, 4.0))
    );
    assert_eq!(
        Element::verification_slot(VerificationSlot::new(90.0)).fixed_size(),
        Some((90.0, 90.0))
    );
}

#[test]
fn type_names_are_codec_discriminants() {
    assert_eq!(Element::text(TextField::new("")).kind.type_name(), "text");
    assert_eq!(
        Element::verification_slot(VerificationSlot::new(1.0))
            .kind
            .type_name(),
        "verification_code"
    );
}
