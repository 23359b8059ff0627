use super::*;

#[test]
fn default_canvas_is_certificate_landscape() {
    let c = CanvasSize::default();
    assert_eq!((c.width, c.height), (1200, 849));
}

#[test]
fn canvas_rejects_zero_and_huge() {
    assert!(CanvasSize::new(0, 10).is_err());
    assert!(CanvasSize::new(10, 0).is_err());
    assert!(CanvasSize::new(100_000, 10).is_err());
    assert!(CanvasSize::new(1, 1).is_ok());
}

#[test]
fn scaled_rounds_and_validates() {
    let c = CanvasSize::default();
    assert_eq!(c.scaled(1.0).unwrap(), (1200, 849));
    assert_eq!(c.scaled(2.0).unwrap(), (2400, 1698));
    assert_eq!(c.scaled(0.5).unwrap(), (600, 425));
    assert!(c.scaled(0.0).is_err());
    assert!(c.scaled(f64::NAN).is_err());
    assert!(c.scaled(100.0).is_err());
}

#[test]
fn premul_rounds() {
    let c = Rgba8 {
        r: 100,
        g: 50,
        b: 200,
        a: 128,
    };
    assert_eq!(
        c.to_premul(),
        [
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
    assert_eq!(Rgba8::WHITE.to_premul(), [255, 255, 255, 255]);
}
