//! Error type for `stash-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] stash_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl From<Error> for stash_core::Error {
  /// Collapse infrastructure failures into the core `Storage` kind so
  /// routing layers map every backend the same way.
  fn from(e: Error) -> Self {
    match e {
      Error::Core(core) => core,
      Error::Json(e) => stash_core::Error::Serialization(e),
      other => stash_core::Error::Storage(other.to_string()),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
