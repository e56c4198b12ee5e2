//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Built from the core error taxonomy: not-found kinds map to 404, the
/// slug conflict and missing-active-schema states to 409, validation and
/// coercion failures to 400, and storage failures to 500.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(String),
}

impl From<stash_core::Error> for ApiError {
  fn from(e: stash_core::Error) -> Self {
    use stash_core::Error as E;
    match &e {
      E::VaultNotFound(_)
      | E::SlugNotFound(_)
      | E::SchemaNotFound(_)
      | E::DocumentNotFound(_) => Self::NotFound(e.to_string()),
      E::SlugTaken(_) | E::NoActiveSchema => Self::Conflict(e.to_string()),
      E::Storage(_) | E::Serialization(_) => Self::Store(e.to_string()),
      _ => Self::BadRequest(e.to_string()),
    }
  }
}

/// Convert a backend error into its API representation.
pub fn store_err<E: Into<stash_core::Error>>(e: E) -> ApiError {
  ApiError::from(e.into())
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
