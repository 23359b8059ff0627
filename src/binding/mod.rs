//! Field binding: substitute per-certificate values into a copy of a template.
//!
//! Only content that is exactly one placeholder token is substituted. Mixed text such as
//! `"Dear {{name}}"` stays literal.

/// Placeholder grammar.
pub mod placeholder;
/// Binding records and their JSON/CSV loaders.
pub mod record;

use crate::foundation::ids::ElementId;
use crate::scene::document::SceneDocument;
use crate::scene::element::ElementKind;

pub use placeholder::{is_placeholder_name, parse_placeholder, placeholder_token};
pub use record::{BindingRecord, records_from_csv, records_from_json};

/// Non-fatal problem found while binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindWarning {
    /// The record has no value for a referenced placeholder; an empty string was substituted.
    MissingField {
        /// Placeholder name.
        field: String,
        /// Elements that reference it, back to front.
        elements: Vec<ElementId>,
    },
}

impl std::fmt::Display for BindWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { field, elements } => {
                write!(f, "missing field \"{field}\" ({} element", elements.len())?;
                if elements.len() != 1 {
                    f.write_str("s")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A render-ready copy of a template plus the warnings raised producing it.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundScene {
    /// Independent document with placeholders substituted.
    pub document: SceneDocument,
    /// At most one warning per missing field.
    pub warnings: Vec<BindWarning>,
}

/// Substitute `record` into a copy of `doc`.
///
/// Text fields and image sources whose whole value is a placeholder are replaced. Absent keys
/// become empty strings and produce one [`BindWarning::MissingField`] per field name. `doc` itself
/// is never modified.
#[tracing::instrument(level = "debug", skip_all, fields(elements = doc.len()))]
pub fn bind(doc: &SceneDocument, record: &BindingRecord) -> BoundScene {
    let mut out = doc.clone();
    let mut warnings: Vec<BindWarning> = Vec::new();

    let ids: Vec<ElementId> = doc.z_order().to_vec();
    for id in ids {
        let Some(el) = out.get_mut(id) else {
            continue;
        };
        let slot = match &mut el.kind {
            ElementKind::Text(t) => &mut t.content,
            ElementKind::Image(i) => &mut i.source,
            ElementKind::Shape(_) | ElementKind::VerificationCode(_) => continue,
        };
        let Some(name) = parse_placeholder(slot).map(str::to_owned) else {
            continue;
        };
        match record.get(&name) {
            Some(value) => *slot = value.to_string(),
            None => {
                slot.clear();
                note_missing(&mut warnings, name, id);
            }
        }
    }

    for w in &warnings {
        tracing::warn!(warning = %w, "binding record incomplete");
    }

    BoundScene {
        document: out,
        warnings,
    }
}

fn note_missing(warnings: &mut Vec<BindWarning>, name: String, id: ElementId) {
    for w in warnings.iter_mut() {
        let BindWarning::MissingField { field, elements } = w;
        if *field == name {
            elements.push(id);
            return;
        }
    }
    warnings.push(BindWarning::MissingField {
        field: name,
        elements: vec![id],
    });
}

/// Distinct placeholder names referenced by `doc`, in z-order of first use.
pub fn placeholders(doc: &SceneDocument) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for el in doc.elements() {
        let value = match &el.kind {
            ElementKind::Text(t) => t.content.as_str(),
            ElementKind::Image(i) => i.source.as_str(),
            ElementKind::Shape(_) | ElementKind::VerificationCode(_) => continue,
        };
        if let Some(name) = parse_placeholder(value) {
            if !out.iter().any(|n| n == name) {
                out.push(name.to_string());
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/binding/bind.rs"]
mod tests;
