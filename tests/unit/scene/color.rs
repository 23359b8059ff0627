use super::*;

#[test]
fn parses_hex_forms() {
    assert_eq!(Paint::parse("#000").unwrap(), Paint::BLACK);
    assert_eq!(
        Paint::parse("#1F2937").unwrap(),
        Paint::Solid(Rgba8::opaque(0x1f, 0x29, 0x37))
    );
    assert_eq!(
        Paint::parse("#4f46e580").unwrap(),
        Paint::Solid(Rgba8 {
            r: 0x4f,
            g: 0x46,
            b: 0xe5,
            a: 0x80
        })
    );
}

#[test]
fn none_and_transparent_are_empty() {
    assert_eq!(Paint::parse("none").unwrap(), Paint::None);
    assert_eq!(Paint::parse("Transparent").unwrap(), Paint::None);
    assert!(Paint::parse("#00000000").unwrap().is_none());
}

#[test]
fn rejects_garbage() {
    for bad in ["", "red", "#12", "#12345", "#gggggg", "000000", "#ééé"] {
        assert!(Paint::parse(bad).is_err(), "{bad} should fail");
    }
}

#[test]
fn display_is_canonical() {
    assert_eq!(Paint::parse("#ABC").unwrap().to_string(), "#aabbcc");
    assert_eq!(Paint::parse("#11223344").unwrap().to_string(), "#11223344");
    assert_eq!(Paint::None.to_string(), "none");
}

#[test]
fn serde_uses_strings() {
    let json = serde_json::to_string(&Paint::parse("#6B7280").unwrap()).unwrap();
    assert_eq!(json, "\"#6b7280\"");
    let back: Paint = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Paint::Solid(Rgba8::opaque(0x6b, 0x72, 0x80)));
    assert!(serde_json::from_str::<Paint>("\"blue\"").is_err());
}
