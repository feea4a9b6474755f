//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Registration request failed the field rules; carries the field names.
  #[error("missing required fields: {fields:?}")]
  Validation { fields: Vec<String> },

  #[error("bad request: {0}")]
  BadRequest(String),

  /// Unknown username or wrong password — indistinguishable on the wire.
  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("unauthorized")]
  Unauthorized,

  #[error("forbidden")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<garita_core::Error> for ApiError {
  fn from(err: garita_core::Error) -> Self {
    match err {
      garita_core::Error::Validation { fields } => ApiError::Validation { fields },
      other => ApiError::Internal(other.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      ApiError::Validation { fields } => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Missing required fields", "fields": fields })),
      )
        .into_response(),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::InvalidCredentials => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Invalid credentials" })),
      )
        .into_response(),
      ApiError::Unauthorized => (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid or missing token" })),
      )
        .into_response(),
      ApiError::Forbidden => (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "Insufficient permissions" })),
      )
        .into_response(),
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response(),
      ApiError::Internal(m) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": m })),
      )
        .into_response(),
    }
  }
}
