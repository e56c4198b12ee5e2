//! Handler for `GET /vaults/:id/search`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::Deserialize;
use stash_core::{
  document::Document,
  store::{VaultRegistry, VaultStore},
};

use crate::error::{ApiError, store_err};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Full-text query. A blank query lists recent documents.
  pub q: Option<String>,
}

/// `GET /vaults/:id/search?q=...` — ranked results, capped at 100.
pub async fn handler<R>(
  State(registry): State<Arc<R>>,
  Path(id): Path<i64>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Document>>, ApiError>
where
  R: VaultRegistry,
{
  let handle = registry.vault(id).await.map_err(store_err)?;
  let documents = handle
    .search(params.q.unwrap_or_default())
    .await
    .map_err(store_err)?;
  Ok(Json(documents))
}
