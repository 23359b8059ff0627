use super::*;

#[test]
fn constructors_build_expected_variants() {
    assert!(matches!(CertError::not_found("x"), CertError::NotFound(_)));
    assert!(matches!(CertError::validation("x"), CertError::Validation(_)));
    assert!(matches!(
        CertError::malformed("x"),
        CertError::MalformedDocument(_)
    ));
    assert!(matches!(CertError::render("x"), CertError::Render(_)));
}

#[test]
fn display_prefixes_kind() {
    assert_eq!(
        CertError::validation("width must be >= 0").to_string(),
        "validation error: width must be >= 0"
    );
    assert_eq!(CertError::not_found("element el-3").to_string(), "not found: element el-3");
}

#[test]
fn into_render_keeps_message() {
    let e = CertError::validation("bad").into_render();
    match e {
        CertError::Render(msg) => assert!(msg.contains("bad")),
        other => panic!("unexpected {other:?}"),
    }

    let wrapped: CertError = anyhow::anyhow!("disk gone").into();
    match wrapped.into_render() {
        CertError::Render(msg) => assert_eq!(msg, "disk gone"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn kind_labels_are_stable() {
    assert_eq!(CertError::render("x").kind(), "render_failure");
    assert_eq!(CertError::malformed("x").kind(), "malformed_document");
    assert_eq!(CertError::validation("x").kind(), "validation_failed");
}
