//! Vault — an isolated tenant that owns one schema history and one
//! document set, backed by its own database file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registry entry for one tenant.
///
/// The slug is immutable once assigned and determines where the vault's
/// database lives on disk. Vaults are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vault {
  /// Registry-assigned, monotonically increasing, never reused.
  pub id:         i64,
  pub name:       String,
  /// URL/filesystem-safe identifier, unique across all vaults.
  pub slug:       String,
  pub created_at: DateTime<Utc>,
}
