//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | 400 "Invalid credentials" for unknown user or wrong password |
//! | `POST` | `/auth/register` | 400 if the username is taken |
//! | `POST` | `/auth/verify-token` | Bearer token; 401 if missing/invalid |

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{Json, extract::State};
use garita_core::{
  store::VisitStore,
  visitor::{NewUser, Role, User},
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{AppState, error::ApiError, token::AuthUser};

// ─── Bodies ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
  pub username:   String,
  pub password:   String,
  pub first_name: String,
  pub last_name:  String,
  pub role:       Role,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
  pub token: String,
  pub user:  User,
}

// ─── Password hashing ────────────────────────────────────────────────────────

pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, phc: &str) -> Result<(), ApiError> {
  let parsed = PasswordHash::new(phc).map_err(|_| ApiError::InvalidCredentials)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .map_err(|_| ApiError::InvalidCredentials)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let record = state
    .store
    .find_user(&body.username)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or(ApiError::InvalidCredentials)?;

  verify_password(&body.password, &record.password_hash)?;

  let token = state.tokens.issue(&record.user)?;
  Ok(Json(AuthResponse {
    token,
    user: record.user,
  }))
}

/// `POST /auth/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<Json<AuthResponse>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let password_hash = hash_password(&body.password)?;

  let user = state
    .store
    .create_user(NewUser {
      username: body.username,
      password_hash,
      first_name: body.first_name,
      last_name: body.last_name,
      role: body.role,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::BadRequest("Username already taken".to_string()))?;

  let token = state.tokens.issue(&user)?;
  Ok(Json(AuthResponse { token, user }))
}

/// `POST /auth/verify-token`
pub async fn verify_token(AuthUser(user): AuthUser) -> Json<Value> {
  Json(json!({ "isValid": true, "user": user }))
}
