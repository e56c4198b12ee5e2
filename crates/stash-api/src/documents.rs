//! Handlers for per-vault document endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stash_core::{
  document::{Document, RawValues},
  store::{VaultRegistry, VaultStore},
};

use crate::error::{ApiError, store_err};

const LIST_LIMIT: usize = 50;

/// Body for document creation and update. `values` is keyed by field name;
/// keys the active (or pinned) schema does not declare are ignored.
#[derive(Debug, Deserialize)]
pub struct DocumentBody {
  pub title:  Option<String>,
  #[serde(default)]
  pub values: RawValues,
}

/// `GET /vaults/:id/documents` — most recently updated first.
pub async fn list<R>(
  State(registry): State<Arc<R>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<Document>>, ApiError>
where
  R: VaultRegistry,
{
  let handle = registry.vault(id).await.map_err(store_err)?;
  let documents = handle
    .recent_documents(LIST_LIMIT)
    .await
    .map_err(store_err)?;
  Ok(Json(documents))
}

/// `POST /vaults/:id/documents` — validate against the active schema,
/// persist, and index.
pub async fn create<R>(
  State(registry): State<Arc<R>>,
  Path(id): Path<i64>,
  Json(body): Json<DocumentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  R: VaultRegistry,
{
  let handle = registry.vault(id).await.map_err(store_err)?;
  let document = handle
    .create_document(body.title, body.values)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(document)))
}

/// `PUT /vaults/:id/documents/:doc_id` — re-validate against the
/// document's pinned schema version and rewrite row plus index entry.
pub async fn update<R>(
  State(registry): State<Arc<R>>,
  Path((id, doc_id)): Path<(i64, i64)>,
  Json(body): Json<DocumentBody>,
) -> Result<Json<Document>, ApiError>
where
  R: VaultRegistry,
{
  let handle = registry.vault(id).await.map_err(store_err)?;
  let document = handle
    .update_document(doc_id, body.title, body.values)
    .await
    .map_err(store_err)?;
  Ok(Json(document))
}
