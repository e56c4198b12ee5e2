//! Handlers for per-vault schema endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stash_core::{
  schema::{FieldDef, Schema},
  store::{VaultRegistry, VaultStore},
};

use crate::error::{ApiError, store_err};

#[derive(Debug, Deserialize)]
pub struct ActivateBody {
  pub title:  String,
  pub fields: Vec<FieldDef>,
}

/// `POST /vaults/:id/schemas` — activate a new schema version.
pub async fn activate<R>(
  State(registry): State<Arc<R>>,
  Path(id): Path<i64>,
  Json(body): Json<ActivateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  R: VaultRegistry,
{
  let handle = registry.vault(id).await.map_err(store_err)?;
  let schema = handle
    .activate_schema(body.title, body.fields)
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(schema)))
}

/// `GET /vaults/:id/schemas/active` — the schema new documents are
/// validated against; 404 while the vault has no schema yet.
pub async fn active<R>(
  State(registry): State<Arc<R>>,
  Path(id): Path<i64>,
) -> Result<Json<Schema>, ApiError>
where
  R: VaultRegistry,
{
  let handle = registry.vault(id).await.map_err(store_err)?;
  let schema = handle
    .active_schema()
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("vault {id} has no active schema"))
    })?;
  Ok(Json(schema))
}
