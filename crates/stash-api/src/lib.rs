//! JSON REST API for Stash.
//!
//! Exposes an axum [`Router`] backed by any
//! [`stash_core::store::VaultRegistry`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stash_api::api_router(vaults.clone()))
//! ```

pub mod documents;
pub mod error;
pub mod schemas;
pub mod search;
pub mod vaults;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use stash_core::store::VaultRegistry;

pub use error::ApiError;

/// Build a fully-materialised API router for `registry`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<R>(registry: Arc<R>) -> Router<()>
where
  R: VaultRegistry + 'static,
{
  Router::new()
    // Vaults
    .route("/vaults", get(vaults::list::<R>).post(vaults::create::<R>))
    .route("/vaults/{id}", get(vaults::get_one::<R>))
    .route("/vaults/by-slug/{slug}", get(vaults::get_by_slug::<R>))
    // Schemas
    .route("/vaults/{id}/schemas", post(schemas::activate::<R>))
    .route("/vaults/{id}/schemas/active", get(schemas::active::<R>))
    // Documents
    .route(
      "/vaults/{id}/documents",
      get(documents::list::<R>).post(documents::create::<R>),
    )
    .route("/vaults/{id}/documents/{doc_id}", put(documents::update::<R>))
    // Search
    .route("/vaults/{id}/search", get(search::handler::<R>))
    .with_state(registry)
}
