//! Error type for `garita-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] garita_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to mark an exit on a visit that does not exist.
  #[error("visit not found: {0}")]
  VisitNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
