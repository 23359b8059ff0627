use std::io::Cursor;

use super::*;

fn png_1x1(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_1x1([100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"definitely not an image").is_err());
}

#[test]
fn parse_svg_ok_and_err() {
    let db = Arc::new(usvg::fontdb::Database::new());
    let ok = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"#;
    parse_svg(ok, Arc::clone(&db), None).unwrap();
    assert!(parse_svg(b"<svg", db, None).is_err());
}

#[test]
fn svg_detection() {
    assert!(looks_like_svg("bg/classic.SVG", b""));
    assert!(looks_like_svg("https://cdn.example/a.svg?v=2", b""));
    assert!(looks_like_svg("data:image/svg+xml;base64,AAAA", b""));
    assert!(looks_like_svg("blob-123", b"  <?xml version=\"1.0\"?>\n<svg></svg>"));
    assert!(looks_like_svg("blob-123", b"\xEF\xBB\xBF<svg/>"));
    assert!(!looks_like_svg("photo.png", &png_1x1([0, 0, 0, 255])));
}

#[test]
fn data_uris() {
    assert_eq!(decode_data_uri("data:text/plain;base64,aGVsbG8=").unwrap(), b"hello");
    assert_eq!(
        decode_data_uri("data:image/svg+xml;utf8,%3Csvg%2F%3E").unwrap(),
        b"<svg/>"
    );
    assert!(decode_data_uri("data:text/plain;base64").is_err());
    assert!(decode_data_uri("data:,%zz").is_err());
    assert!(decode_data_uri("file.png").is_err());
}

#[test]
fn unpremultiply_inverts_premultiply() {
    let mut px = vec![200u8, 100, 50, 255, 90, 60, 30, 128, 10, 10, 10, 0];
    let original = px.clone();
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &original[..4]);
    for (a, b) in px[4..7].iter().zip(&original[4..7]) {
        assert!((*a as i16 - *b as i16).abs() <= 1);
    }
    assert_eq!(&px[8..], &[0, 0, 0, 0]);
}
