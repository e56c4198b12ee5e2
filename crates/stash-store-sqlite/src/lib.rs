//! SQLite backend for the Stash document store.
//!
//! One registry database catalogues the vaults; each vault gets its own
//! database file holding a schema history, documents, and an FTS5 full-text
//! index. All access goes through [`tokio_rusqlite`] so database work runs
//! on dedicated threads without blocking the async runtime.

mod encode;
mod registry;
mod schema;
mod vault;

pub mod error;

pub use error::{Error, Result};
pub use registry::SqliteVaults;
pub use vault::SqliteVault;

#[cfg(test)]
mod tests;
