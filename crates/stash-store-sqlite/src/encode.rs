//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Field definitions and
//! document payloads are stored as compact JSON.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use stash_core::{
  document::{Document, FieldValue},
  schema::{FieldDef, Schema},
  vault::Vault,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JSON payloads ───────────────────────────────────────────────────────────

pub fn encode_fields(fields: &[FieldDef]) -> Result<String> {
  Ok(serde_json::to_string(fields)?)
}

pub fn decode_fields(s: &str) -> Result<Vec<FieldDef>> {
  Ok(serde_json::from_str(s)?)
}

pub fn encode_values(values: &BTreeMap<String, FieldValue>) -> Result<String> {
  Ok(serde_json::to_string(values)?)
}

pub fn decode_values(s: &str) -> Result<BTreeMap<String, FieldValue>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `vaults` row.
pub struct RawVault {
  pub id:         i64,
  pub name:       String,
  pub slug:       String,
  pub created_at: String,
}

impl RawVault {
  pub fn into_vault(self) -> Result<Vault> {
    Ok(Vault {
      id:         self.id,
      name:       self.name,
      slug:       self.slug,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `schemas` row.
pub struct RawSchema {
  pub id:          i64,
  pub vault_id:    i64,
  pub version:     i64,
  pub title:       String,
  pub fields_json: String,
  pub is_active:   bool,
  pub created_at:  String,
}

impl RawSchema {
  pub fn into_schema(self) -> Result<Schema> {
    Ok(Schema {
      id:         self.id,
      vault_id:   self.vault_id,
      version:    self.version,
      title:      self.title,
      fields:     decode_fields(&self.fields_json)?,
      active:     self.is_active,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `documents` row.
pub struct RawDocument {
  pub id:         i64,
  pub vault_id:   i64,
  pub schema_id:  i64,
  pub title:      String,
  pub data_json:  String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawDocument {
  pub fn into_document(self) -> Result<Document> {
    Ok(Document {
      id:         self.id,
      vault_id:   self.vault_id,
      schema_id:  self.schema_id,
      title:      self.title,
      fields:     decode_values(&self.data_json)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}
