//! Handlers for `/vaults` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/vaults` | Most recently created first |
//! | `POST` | `/vaults` | Body: `{"name":"...","slug":"..."}` |
//! | `GET`  | `/vaults/:id` | Overview: vault + active schema + recent documents |
//! | `GET`  | `/vaults/by-slug/:slug` | Same overview, resolved by slug |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use stash_core::{
  document::Document,
  schema::Schema,
  store::{VaultRegistry, VaultStore},
  vault::Vault,
};

use crate::error::{ApiError, store_err};

/// Documents included in a vault overview.
const OVERVIEW_LIMIT: usize = 50;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /vaults`
pub async fn list<R>(
  State(registry): State<Arc<R>>,
) -> Result<Json<Vec<Vault>>, ApiError>
where
  R: VaultRegistry,
{
  let vaults = registry.list_vaults().await.map_err(store_err)?;
  Ok(Json(vaults))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
  pub slug: String,
}

/// `POST /vaults` — body: `{"name":"Recipes","slug":"recipes"}`
pub async fn create<R>(
  State(registry): State<Arc<R>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  R: VaultRegistry,
{
  let vault = registry
    .create_vault(body.name, body.slug)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(vault)))
}

// ─── Overview ─────────────────────────────────────────────────────────────────

/// A vault plus its active schema and most recently updated documents.
#[derive(Debug, Serialize)]
pub struct VaultView {
  pub vault:     Vault,
  pub schema:    Option<Schema>,
  pub documents: Vec<Document>,
}

/// `GET /vaults/:id`
pub async fn get_one<R>(
  State(registry): State<Arc<R>>,
  Path(id): Path<i64>,
) -> Result<Json<VaultView>, ApiError>
where
  R: VaultRegistry,
{
  let vault = registry.get_vault(id).await.map_err(store_err)?;
  view(&*registry, vault).await
}

/// `GET /vaults/by-slug/:slug`
pub async fn get_by_slug<R>(
  State(registry): State<Arc<R>>,
  Path(slug): Path<String>,
) -> Result<Json<VaultView>, ApiError>
where
  R: VaultRegistry,
{
  let vault = registry.get_vault_by_slug(slug).await.map_err(store_err)?;
  view(&*registry, vault).await
}

async fn view<R>(registry: &R, vault: Vault) -> Result<Json<VaultView>, ApiError>
where
  R: VaultRegistry,
{
  let handle = registry.vault(vault.id).await.map_err(store_err)?;
  let schema = handle.active_schema().await.map_err(store_err)?;
  let documents = handle
    .recent_documents(OVERVIEW_LIMIT)
    .await
    .map_err(store_err)?;
  Ok(Json(VaultView { vault, schema, documents }))
}
