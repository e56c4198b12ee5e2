//! Domain error taxonomy shared across the workspace.
//!
//! Variants are grouped by failure kind so a routing layer can choose a
//! transport representation by matching, never by string inspection.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  // ── Validation ────────────────────────────────────────────────────────

  #[error("name and slug are required")]
  EmptyNameOrSlug,

  #[error("schema title is required")]
  EmptySchemaTitle,

  #[error("schema must define at least one field")]
  NoFields,

  #[error("fields[{index}]: {problem}")]
  BadFieldSpec { index: usize, problem: String },

  // ── Not found ─────────────────────────────────────────────────────────

  #[error("vault not found: {0}")]
  VaultNotFound(i64),

  #[error("no vault with slug {0:?}")]
  SlugNotFound(String),

  #[error("schema not found: {0}")]
  SchemaNotFound(i64),

  #[error("document not found: {0}")]
  DocumentNotFound(i64),

  // ── Conflict ──────────────────────────────────────────────────────────

  #[error("slug already in use: {0}")]
  SlugTaken(String),

  // ── Domain state ──────────────────────────────────────────────────────

  #[error("no active schema; activate one before creating documents")]
  NoActiveSchema,

  // ── Type / coercion ───────────────────────────────────────────────────

  #[error("{label} is required")]
  FieldRequired { label: String },

  #[error("{label}: must be a number")]
  NotANumber { label: String },

  #[error("{label}: invalid option")]
  InvalidOption { label: String },

  // ── Infrastructure ────────────────────────────────────────────────────

  #[error("storage error: {0}")]
  Storage(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
