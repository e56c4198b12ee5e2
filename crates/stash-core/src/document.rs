//! Documents and the per-field coercion rules applied on every write.
//!
//! A document's payload is a map from field name to [`FieldValue`]. The
//! schema's field list is the single source of truth for which keys are
//! legal and how each value is coerced; types are never inferred from the
//! raw input alone.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  Error, Result,
  schema::{FieldDef, FieldKind},
};

/// Raw caller-supplied field values, keyed by field name. Keys the schema
/// does not declare are silently dropped.
pub type RawValues = serde_json::Map<String, Value>;

/// A stored field value. Untagged so payloads serialise as plain JSON
/// scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
  Bool(bool),
  Number(f64),
  Text(String),
  Null,
}

impl FieldValue {
  /// Textual rendering used by the full-text index and title derivation.
  pub fn as_display(&self) -> String {
    match self {
      Self::Bool(b) => b.to_string(),
      Self::Number(n) => n.to_string(),
      Self::Text(s) => s.clone(),
      Self::Null => String::new(),
    }
  }
}

/// A stored record. `schema_id` pins the schema version the payload was
/// validated against; activating a later version never re-validates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
  pub id:         i64,
  /// Echo of the owning vault id; not a cross-database reference.
  pub vault_id:   i64,
  pub schema_id:  i64,
  pub title:      String,
  pub fields:     BTreeMap<String, FieldValue>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Check a raw payload against a schema's fields and coerce each value to
/// its declared type.
pub fn coerce_values(
  fields: &[FieldDef],
  raw: &RawValues,
) -> Result<BTreeMap<String, FieldValue>> {
  let mut out = BTreeMap::new();
  for field in fields {
    let value = raw.get(&field.name);
    if field.required && is_blank(value) {
      return Err(Error::FieldRequired { label: field.label.clone() });
    }
    out.insert(field.name.clone(), coerce_one(field, value)?);
  }
  Ok(out)
}

/// Absent, null, and whitespace-only strings all count as missing for the
/// required check.
fn is_blank(value: Option<&Value>) -> bool {
  match value {
    None | Some(Value::Null) => true,
    Some(Value::String(s)) => s.trim().is_empty(),
    Some(_) => false,
  }
}

fn coerce_one(field: &FieldDef, value: Option<&Value>) -> Result<FieldValue> {
  let value = value.unwrap_or(&Value::Null);
  match field.kind {
    FieldKind::Number => match value {
      Value::Null => Ok(FieldValue::Null),
      Value::Number(n) => n
        .as_f64()
        .map(FieldValue::Number)
        .ok_or_else(|| Error::NotANumber { label: field.label.clone() }),
      Value::String(s) => {
        let s = s.trim();
        if s.is_empty() {
          Ok(FieldValue::Null)
        } else {
          s.parse::<f64>()
            .map(FieldValue::Number)
            .map_err(|_| Error::NotANumber { label: field.label.clone() })
        }
      }
      _ => Err(Error::NotANumber { label: field.label.clone() }),
    },

    // Never fails: unrecognised input reads as false.
    FieldKind::Boolean => Ok(FieldValue::Bool(match value {
      Value::Bool(b) => *b,
      Value::String(s) => {
        let s = s.trim();
        s == "on" || s == "1" || s.eq_ignore_ascii_case("true")
      }
      _ => false,
    })),

    FieldKind::Select => {
      let chosen = match value {
        Value::Null => "",
        Value::String(s) => s.trim(),
        _ => return Err(Error::InvalidOption { label: field.label.clone() }),
      };
      if !chosen.is_empty() && !field.options.iter().any(|o| o == chosen) {
        return Err(Error::InvalidOption { label: field.label.clone() });
      }
      Ok(FieldValue::Text(chosen.to_owned()))
    }

    FieldKind::String | FieldKind::Text => Ok(FieldValue::Text(match value {
      Value::String(s) => s.trim().to_owned(),
      Value::Null => String::new(),
      other => other.to_string(),
    })),
  }
}

/// Derive a title when the caller supplies none: the first non-empty string
/// field wins, then the first boolean field rendered as `name:value`, then
/// the current time in RFC 3339.
///
/// Iteration follows the schema's declared field order so the result is
/// deterministic regardless of payload ordering.
pub fn derive_title(
  fields: &[FieldDef],
  values: &BTreeMap<String, FieldValue>,
  now: DateTime<Utc>,
) -> String {
  let mut first_bool = None;
  for field in fields {
    match values.get(&field.name) {
      Some(FieldValue::Text(s)) if !s.trim().is_empty() => {
        return s.trim().to_owned();
      }
      Some(FieldValue::Bool(b)) if first_bool.is_none() => {
        first_bool = Some(format!("{}:{}", field.name, b));
      }
      _ => {}
    }
  }
  first_bool.unwrap_or_else(|| now.to_rfc3339())
}

/// Flatten a payload into the text body fed to the full-text index, one
/// `name: value` line per schema field.
pub fn flatten_for_index(
  fields: &[FieldDef],
  values: &BTreeMap<String, FieldValue>,
) -> String {
  let mut body = String::new();
  for field in fields {
    if let Some(value) = values.get(&field.name) {
      body.push_str(&field.name);
      body.push_str(": ");
      body.push_str(&value.as_display());
      body.push('\n');
    }
  }
  body
}
