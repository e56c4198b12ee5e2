//! Schema versions — immutable, per-vault field-definition sets.
//!
//! Exactly one version per vault is active at a time; activating a new
//! version supersedes all older ones in a single transaction. Documents
//! stay pinned to the version they were created under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The value type a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
  String,
  Number,
  Boolean,
  /// Multi-line text; rendered as a textarea by form-driven clients.
  Text,
  /// Enumerated choice; `options` lists the allowed values.
  Select,
}

/// One field in a schema version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
  /// Storage key, unique within a schema. Doubles as the form/query key.
  pub name:     String,
  /// Display string; also what validation errors call the field.
  pub label:    String,
  #[serde(rename = "type")]
  pub kind:     FieldKind,
  #[serde(default)]
  pub required: bool,
  /// Allowed values; mandatory (and only meaningful) for [`FieldKind::Select`].
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub options:  Vec<String>,
}

/// An immutable schema version. There is no edit operation, only
/// superseding activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
  pub id:         i64,
  /// Echo of the owning vault id; not a cross-database reference.
  pub vault_id:   i64,
  /// Monotonically increasing within the vault, starting at 1.
  pub version:    i64,
  pub title:      String,
  pub fields:     Vec<FieldDef>,
  pub active:     bool,
  pub created_at: DateTime<Utc>,
}

/// Validate a field-definition payload before activation.
///
/// Errors name the offending field index so the caller can point at the
/// exact spec entry that failed. No partial activation happens on error.
pub fn validate_fields(fields: &[FieldDef]) -> Result<()> {
  if fields.is_empty() {
    return Err(Error::NoFields);
  }
  for (index, field) in fields.iter().enumerate() {
    if field.name.trim().is_empty() {
      return Err(Error::BadFieldSpec {
        index,
        problem: "name is required".into(),
      });
    }
    if fields[..index].iter().any(|f| f.name == field.name) {
      return Err(Error::BadFieldSpec {
        index,
        problem: format!("duplicate field name {:?}", field.name),
      });
    }
    if field.label.trim().is_empty() {
      return Err(Error::BadFieldSpec {
        index,
        problem: "label is required".into(),
      });
    }
    if field.kind == FieldKind::Select && field.options.is_empty() {
      return Err(Error::BadFieldSpec {
        index,
        problem: "select fields need at least one option".into(),
      });
    }
  }
  Ok(())
}
