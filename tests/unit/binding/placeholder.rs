use super::*;

#[test]
fn accepts_bare_placeholders() {
    assert_eq!(parse_placeholder("{{name}}"), Some("name"));
    assert_eq!(parse_placeholder("{{ recipient.name }}"), Some("recipient.name"));
    assert_eq!(parse_placeholder("{{_x-1}}"), Some("_x-1"));
}

#[test]
fn mixed_or_invalid_content_is_literal() {
    for s in [
        "Dear {{name}}",
        "{{name}}!",
        " {{name}}",
        "{{first}} {{last}}",
        "{{}}",
        "{{1abc}}",
        "{{na me}}",
        "{name}",
        "",
    ] {
        assert_eq!(parse_placeholder(s), None, "{s:?}");
    }
}

#[test]
fn token_round_trips() {
    assert_eq!(placeholder_token("courseName"), "{{courseName}}");
    assert_eq!(parse_placeholder(&placeholder_token("courseName")), Some("courseName"));
}
