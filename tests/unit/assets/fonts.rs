use super::*;

#[test]
fn empty_book_resolves_nothing() {
    let book = FontBook::default();
    assert_eq!(book.face_count(), 0);
    assert!(book.resolve("Georgia", 400, false).is_none());
    // Cached negative lookups stay negative.
    assert!(book.resolve("Georgia", 400, false).is_none());
}

#[test]
fn isolated_opts_skip_system_fonts() {
    let opts = FontBookOpts::isolated();
    assert!(!opts.system_fonts);
    let book = FontBook::new(&opts);
    assert_eq!(book.face_count(), 0);
}

#[test]
fn missing_font_dir_is_tolerated() {
    let opts = FontBookOpts {
        system_fonts: false,
        font_dirs: vec![PathBuf::from("/definitely/not/a/font/dir")],
    };
    assert_eq!(FontBook::new(&opts).face_count(), 0);
}

#[test]
fn registering_garbage_fails() {
    let mut book = FontBook::default();
    assert!(book.register_font_data(b"not a font".to_vec()).is_err());
}

#[test]
fn generic_family_names() {
    use usvg::fontdb::Family;
    assert!(matches!(generic_or_named("serif"), Family::Serif));
    assert!(matches!(generic_or_named("Sans-Serif"), Family::SansSerif));
    assert!(matches!(generic_or_named(" Georgia "), Family::Name("Georgia")));
}

#[test]
fn layout_rejects_bad_size() {
    let mut engine = TextLayoutEngine::new();
    let face = ResolvedFace {
        data: Arc::new(Vec::new()),
        index: 0,
        family: "x".into(),
    };
    let style = TextStyle {
        size_px: 0.0,
        weight: 400,
        italic: false,
        brush: TextBrushRgba8::default(),
    };
    assert!(engine.layout("hi", &face, style).is_err());
}
