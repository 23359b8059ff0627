//! Versioned JSON codec for scene documents.
//!
//! The stored form is the template's `configJSON`: a self-describing object tagged with
//! `"format": "certiforge/scene"` and `"version": 1`, carrying the canvas, background and the
//! z-ordered element list (each element names its variant in a `type` field).

/// Legacy canvas-editor import.
pub mod fabric;
pub(crate) mod schema;
/// Path-located validation of stored documents.
pub mod validate;

use crate::foundation::error::{CertError, CertResult};
use crate::scene::document::SceneDocument;
use anyhow::Context;
use serde_json::Value;

pub use fabric::{FabricImport, import_fabric};
pub use schema::{FORMAT_TAG, FORMAT_VERSION};
pub use validate::{SchemaError, SchemaErrors};

/// Serialize a document to its stored JSON form.
pub fn encode(doc: &SceneDocument) -> CertResult<String> {
    let def = schema::SceneDef::from(doc);
    let json = serde_json::to_string_pretty(&def).context("serialize scene document")?;
    Ok(json)
}

/// Parse a stored document.
///
/// Fails with [`CertError::MalformedDocument`] on invalid JSON, a missing or unknown version tag,
/// unknown element types, and missing or non-finite geometry.
pub fn decode(json: &str) -> CertResult<SceneDocument> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| CertError::malformed(format!("invalid JSON: {e}")))?;
    decode_value(value)
}

/// Parse an already-deserialized stored document.
pub fn decode_value(value: Value) -> CertResult<SceneDocument> {
    validate::validate_scene_value(&value).map_err(|e| CertError::malformed(e.to_string()))?;
    let def: schema::SceneDef =
        serde_json::from_value(value).map_err(|e| CertError::malformed(e.to_string()))?;
    SceneDocument::try_from(def)
}

/// List every problem in a stored document without building it.
pub fn check(json: &str) -> Result<(), SchemaErrors> {
    let value: Value = serde_json::from_str(json).map_err(|e| SchemaErrors {
        errors: vec![SchemaError::root(format!("invalid JSON: {e}"))],
    })?;
    validate::validate_scene_value(&value)
}

/// Load whatever a template record holds.
///
/// Absent, blank or `null` configs yield a fresh default document; a legacy canvas-editor config
/// (an `objects` array without a `format` tag) is imported; anything else goes through [`decode`].
pub fn decode_stored(json: Option<&str>) -> CertResult<SceneDocument> {
    let Some(json) = json.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(SceneDocument::default());
    };
    let value: Value = serde_json::from_str(json)
        .map_err(|e| CertError::malformed(format!("invalid JSON: {e}")))?;
    match &value {
        Value::Null => Ok(SceneDocument::default()),
        Value::Object(obj) if obj.is_empty() => Ok(SceneDocument::default()),
        Value::Object(obj) if obj.contains_key("objects") && !obj.contains_key("format") => {
            let imported = fabric::import_fabric_value(&value)?;
            for skipped in &imported.skipped {
                tracing::warn!(object = %skipped, "legacy object skipped during import");
            }
            Ok(imported.document)
        }
        _ => decode_value(value),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/codec.rs"]
mod tests;
