use super::*;

fn seed() -> VerificationSeed {
    VerificationSeed::from_bytes([7u8; 32])
}

#[test]
fn code_shape() {
    let code = verification_code("tpl-1", 0, &seed());
    assert_eq!(code.len(), CODE_LEN + 1);
    assert_eq!(code.as_bytes()[5], b'-');
    assert!(
        code.chars()
            .filter(|c| *c != '-')
            .all(|c| CROCKFORD.contains(&(c as u8)))
    );
}

#[test]
fn code_is_deterministic_and_input_sensitive() {
    let a = verification_code("tpl-1", 3, &seed());
    assert_eq!(a, verification_code("tpl-1", 3, &seed()));
    assert_ne!(a, verification_code("tpl-1", 4, &seed()));
    assert_ne!(a, verification_code("tpl-2", 3, &seed()));
    assert_ne!(
        a,
        verification_code("tpl-1", 3, &VerificationSeed::from_bytes([8u8; 32]))
    );
}

#[test]
fn codes_are_distinct_across_a_batch() {
    let s = seed();
    let codes: std::collections::HashSet<_> =
        (0..500).map(|i| verification_code("tpl", i, &s)).collect();
    assert_eq!(codes.len(), 500);
}

#[test]
fn seed_hex_round_trip() {
    let s = VerificationSeed::generate();
    assert_eq!(VerificationSeed::from_hex(&s.to_hex()).unwrap(), s);
    assert!(VerificationSeed::from_hex("abc").is_err());
    assert!(VerificationSeed::from_hex(&"zz".repeat(32)).is_err());
    assert_eq!(format!("{s:?}"), "VerificationSeed(..)");
}

#[test]
fn normalize_accepts_aliases() {
    let code = verification_code("tpl", 1, &seed());
    assert_eq!(normalize_code(&code.to_lowercase()).as_deref(), Some(code.as_str()));
    assert_eq!(normalize_code("o1il0-abcde").as_deref(), Some("01110-ABCDE"));
    assert!(normalize_code("ABCD").is_none());
    assert!(normalize_code("ABCDE-FGHJU").is_none());
}

#[test]
fn metadata_serializes_without_absent_code() {
    let meta = GenerationMetadata::now("tpl", 2, None);
    let json = serde_json::to_value(&meta).unwrap();
    assert_eq!(json["row_index"], 2);
    assert!(json.get("verification_code").is_none());
    let back: GenerationMetadata = serde_json::from_value(json).unwrap();
    assert_eq!(back, meta);
}
