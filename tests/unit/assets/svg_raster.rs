use super::*;

#[test]
fn params_follow_transform_scale() {
    let (w, h, adj) = svg_raster_params(100.0, 50.0, Affine::scale(2.0)).unwrap();
    assert_eq!((w, h), (200, 100));
    let p = adj * kurbo::Point::new(200.0, 100.0);
    assert!((p.x - 200.0).abs() < 1e-9);
    assert!((p.y - 100.0).abs() < 1e-9);
}

#[test]
fn params_reject_degenerate_boxes() {
    assert!(svg_raster_params(0.0, 10.0, Affine::IDENTITY).is_err());
    assert!(svg_raster_params(10.0, f64::NAN, Affine::IDENTITY).is_err());
    assert!(svg_raster_params(10.0, 10.0, Affine::scale(10_000.0)).is_err());
}

#[test]
fn rasterize_fills_rect() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><rect width="4" height="4" fill="#ff0000"/></svg>"##;
    let tree = usvg::Tree::from_data(svg, &usvg::Options::default()).unwrap();
    let px = rasterize_svg_to_premul_rgba8(&tree, 8, 8).unwrap();
    assert_eq!(px.len(), 8 * 8 * 4);
    assert_eq!(&px[..4], &[255, 0, 0, 255]);
}
