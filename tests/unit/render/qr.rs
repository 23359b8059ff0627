use super::*;

#[test]
fn encodes_with_finder_patterns() {
    let m = QrMatrix::encode("https://verify.example/ABCDE-FGHJK").unwrap();
    assert!(m.width() >= 21);
    assert_eq!((m.width() - 21) % 4, 0);
    assert_eq!(m.total_width(), m.width() + 8);
    // Finder pattern corners are dark, the separator next to them light.
    assert!(m.is_dark(0, 0));
    assert!(m.is_dark(m.width() - 1, 0));
    assert!(m.is_dark(0, m.width() - 1));
    assert!(!m.is_dark(7, 0));
    assert!(!m.is_dark(m.width(), 0));
}

#[test]
fn empty_payload_is_rejected() {
    assert!(QrMatrix::encode("").is_err());
}

#[test]
fn dark_path_stays_inside_quiet_zone() {
    let m = QrMatrix::encode("ABCDE-FGHJK").unwrap();
    let size = m.total_width() as f64 * 3.0;
    let path = m.dark_path(size);
    let bbox = kurbo::Shape::bounding_box(&path);
    assert!((bbox.x0 - 12.0).abs() < 1e-9);
    assert!((bbox.y0 - 12.0).abs() < 1e-9);
    assert!((bbox.x1 - (size - 12.0)).abs() < 1e-9);
    assert!((bbox.y1 - (size - 12.0)).abs() < 1e-9);
}
