/// Extract the placeholder name when `content` is exactly one `{{name}}` token.
///
/// Whitespace is allowed just inside the braces (`{{ name }}`). Anything else around or inside
/// the token (surrounding text, two tokens, an invalid name) makes the content literal.
pub fn parse_placeholder(content: &str) -> Option<&str> {
    let inner = content.strip_prefix("{{")?.strip_suffix("}}")?;
    let name = inner.trim();
    is_placeholder_name(name).then_some(name)
}

/// Return `true` for names matching `[A-Za-z_][A-Za-z0-9_.-]*`.
pub fn is_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Render `name` as a placeholder token.
pub fn placeholder_token(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

#[cfg(test)]
#[path = "../../tests/unit/binding/placeholder.rs"]
mod tests;
