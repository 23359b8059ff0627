use crate::foundation::error::{CertError, CertResult};
use anyhow::Context;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Read;

/// Per-certificate values keyed by placeholder name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindingRecord {
    values: BTreeMap<String, String>,
}

impl BindingRecord {
    /// Empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a value, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return `true` when the record has no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    /// Build from a flat JSON object. Scalars are stringified; `null` leaves the key absent.
    pub fn from_json_value(value: &Value) -> CertResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| CertError::validation("binding record must be a JSON object"))?;
        let mut out = Self::new();
        for (key, v) in obj {
            match v {
                Value::Null => {}
                Value::String(s) => out.insert(key, s.as_str()),
                Value::Bool(_) | Value::Number(_) => out.insert(key, v.to_string()),
                Value::Array(_) | Value::Object(_) => {
                    return Err(CertError::validation(format!(
                        "binding record field \"{key}\" must be a scalar"
                    )));
                }
            }
        }
        Ok(out)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for BindingRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (k, v) in iter {
            out.insert(k, v);
        }
        out
    }
}

/// Parse one record (JSON object) or many (JSON array of objects).
pub fn records_from_json(json: &str) -> CertResult<Vec<BindingRecord>> {
    let value: Value = serde_json::from_str(json).context("parse binding records JSON")?;
    match &value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                BindingRecord::from_json_value(item)
                    .map_err(|e| CertError::validation(format!("record {i}: {e}")))
            })
            .collect(),
        Value::Object(_) => Ok(vec![BindingRecord::from_json_value(&value)?]),
        _ => Err(CertError::validation(
            "binding records must be a JSON object or array of objects",
        )),
    }
}

/// Parse CSV rows; the header row names the placeholders.
///
/// Header names and cells are trimmed. Empty cells are present-but-empty values.
pub fn records_from_csv<R: Read>(reader: R) -> CertResult<Vec<BindingRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);
    let headers = rdr.headers().context("read CSV header row")?.clone();
    if headers.iter().any(str::is_empty) {
        return Err(CertError::validation("CSV header contains an empty column name"));
    }
    let mut out = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("read CSV row {}", i + 1))?;
        out.push(headers.iter().zip(row.iter()).collect());
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/binding/record.rs"]
mod tests;
