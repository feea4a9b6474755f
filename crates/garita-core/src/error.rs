//! Error types for `garita-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// One or more required request fields are missing or empty.
  /// `fields` carries the offending field names for the API error payload.
  #[error("missing required fields: {}", fields.join(", "))]
  Validation { fields: Vec<String> },

  #[error("unknown visit type code: {0}")]
  UnknownVisitType(i64),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
