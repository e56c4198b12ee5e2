//! The `VaultRegistry` and `VaultStore` traits.
//!
//! Implemented by storage backends (e.g. `stash-store-sqlite`). The routing
//! layer depends on these abstractions, not on any concrete backend.

use std::future::Future;

use crate::{
  document::{Document, RawValues},
  schema::{FieldDef, Schema},
  vault::Vault,
};

/// The vault catalog plus the handle cache that opens each vault's
/// isolated store on demand.
///
/// All methods return `Send` futures so the traits can be used from
/// multi-threaded async runtimes (e.g. tokio with `axum`). Backend errors
/// must convert into the [`crate::Error`] taxonomy so callers can map them
/// to a transport representation.
pub trait VaultRegistry: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;
  /// An open, schema-initialised handle to one vault's store.
  type Handle: VaultStore<Error = Self::Error>;

  /// All vaults, most recently created first.
  fn list_vaults(
    &self,
  ) -> impl Future<Output = Result<Vec<Vault>, Self::Error>> + Send + '_;

  /// The vault with this registry id.
  fn get_vault(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Vault, Self::Error>> + Send + '_;

  /// The vault with this slug. Used where public routes identify vaults by
  /// slug; resolves to the same store as [`VaultRegistry::get_vault`].
  fn get_vault_by_slug(
    &self,
    slug: String,
  ) -> impl Future<Output = Result<Vault, Self::Error>> + Send + '_;

  /// Insert a new vault and provision its physical store. The two succeed
  /// or fail together; a failed provisioning leaves no registry row.
  fn create_vault(
    &self,
    name: String,
    slug: String,
  ) -> impl Future<Output = Result<Vault, Self::Error>> + Send + '_;

  /// Look up (or lazily open, initialise, and cache) the handle for `id`.
  fn vault(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Self::Handle, Self::Error>> + Send + '_;
}

/// Operations against one vault's isolated store. Handles are cheap to
/// clone and internally reference-counted.
pub trait VaultStore: Clone + Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Append a new schema version and atomically make it the only active
  /// one.
  fn activate_schema(
    &self,
    title: String,
    fields: Vec<FieldDef>,
  ) -> impl Future<Output = Result<Schema, Self::Error>> + Send + '_;

  /// The schema new documents are validated against. `None` when the vault
  /// has no schema yet; that is a state, not an error.
  fn active_schema(
    &self,
  ) -> impl Future<Output = Result<Option<Schema>, Self::Error>> + Send + '_;

  /// A specific schema version, as referenced by a document's `schema_id`.
  fn schema(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Schema, Self::Error>> + Send + '_;

  /// Validate `values` against the active schema, persist the document,
  /// and write its full-text index entry, all in one transaction.
  fn create_document(
    &self,
    title: Option<String>,
    values: RawValues,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Re-validate against the document's pinned schema version (never the
  /// currently active one) and rewrite the row and its index entry
  /// atomically. `schema_id` never changes.
  fn update_document(
    &self,
    id: i64,
    title: Option<String>,
    values: RawValues,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  fn get_document(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// Most recently updated documents, capped at `limit`.
  fn recent_documents(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + '_;

  /// Ranked full-text search over titles and flattened payloads, capped at
  /// 100 results. A blank query lists recent documents instead of being
  /// handed to the match engine (where it would be a syntax error).
  fn search(
    &self,
    query: String,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + '_;
}
