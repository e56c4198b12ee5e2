//! Core types and trait definitions for the Stash document store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod document;
pub mod error;
pub mod schema;
pub mod store;
pub mod vault;

pub use error::{Error, Result};
