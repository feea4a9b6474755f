//! Bearer-token issuing, verification, and the authenticated-user extractor.
//!
//! A token is `base64(JSON claims) . hex(HMAC-SHA256 tag)`. Claims carry the
//! full user plus an expiry timestamp, so handlers get the role without a
//! database round-trip.

use axum::{extract::FromRequestParts, http::request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::{Duration, Utc};
use garita_core::{store::VisitStore, visitor::User};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::{AppState, error::ApiError};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum TokenError {
  #[error("invalid token")]
  Invalid,

  #[error("token expired")]
  Expired,

  #[error("claims encoding failed: {0}")]
  Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  user: User,
  /// Unix timestamp after which the token is rejected.
  exp:  i64,
}

/// Issues and verifies bearer tokens for one server instance.
pub struct TokenSigner {
  secret: Vec<u8>,
  ttl:    Duration,
}

impl TokenSigner {
  pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
    Self {
      secret: secret.into(),
      ttl,
    }
  }

  fn mac(&self) -> Result<HmacSha256, TokenError> {
    HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::Invalid)
  }

  pub fn issue(&self, user: &User) -> Result<String, TokenError> {
    let claims = Claims {
      user: user.clone(),
      exp:  (Utc::now() + self.ttl).timestamp(),
    };
    let payload = B64.encode(serde_json::to_vec(&claims)?);

    let mut mac = self.mac()?;
    mac.update(payload.as_bytes());
    let tag = hex::encode(mac.finalize().into_bytes());

    Ok(format!("{payload}.{tag}"))
  }

  pub fn verify(&self, token: &str) -> Result<User, TokenError> {
    let (payload, tag_hex) =
      token.split_once('.').ok_or(TokenError::Invalid)?;
    let tag = hex::decode(tag_hex).map_err(|_| TokenError::Invalid)?;

    let mut mac = self.mac()?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&tag).map_err(|_| TokenError::Invalid)?;

    // The tag authenticated the payload, so decode failures past this point
    // mean corruption, not tampering.
    let bytes = B64.decode(payload).map_err(|_| TokenError::Invalid)?;
    let claims: Claims =
      serde_json::from_slice(&bytes).map_err(|_| TokenError::Invalid)?;

    if claims.exp <= Utc::now().timestamp() {
      return Err(TokenError::Expired);
    }
    Ok(claims.user)
  }
}

impl From<TokenError> for ApiError {
  fn from(err: TokenError) -> Self {
    match err {
      TokenError::Invalid | TokenError::Expired => ApiError::Unauthorized,
      TokenError::Encode(e) => ApiError::Internal(e.to_string()),
    }
  }
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Present in a handler's arguments means the request carried a valid
/// (unexpired, untampered) bearer token for this user.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<AppState<S>> for AuthUser
where
  S: VisitStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let header = parts
      .headers
      .get(axum::http::header::AUTHORIZATION)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthorized)?;

    let token = header
      .strip_prefix("Bearer ")
      .ok_or(ApiError::Unauthorized)?;

    let user = state
      .tokens
      .verify(token)
      .map_err(|_| ApiError::Unauthorized)?;
    Ok(AuthUser(user))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use garita_core::visitor::Role;

  fn user() -> User {
    User {
      id:         1,
      username:   "porteria1".into(),
      first_name: "Luis".into(),
      last_name:  "Gómez".into(),
      role:       Role::Operator,
    }
  }

  #[test]
  fn issue_and_verify_round_trip() {
    let signer = TokenSigner::new(b"secret".to_vec(), Duration::hours(1));
    let token = signer.issue(&user()).unwrap();

    let verified = signer.verify(&token).unwrap();
    assert_eq!(verified.username, "porteria1");
    assert_eq!(verified.role, Role::Operator);
  }

  #[test]
  fn tampered_payload_is_rejected() {
    let signer = TokenSigner::new(b"secret".to_vec(), Duration::hours(1));
    let token = signer.issue(&user()).unwrap();

    let (payload, tag) = token.split_once('.').unwrap();
    let mut forged_claims = Claims {
      user: user(),
      exp:  i64::MAX,
    };
    forged_claims.user.role = Role::Admin;
    let forged_payload =
      B64.encode(serde_json::to_vec(&forged_claims).unwrap());
    assert_ne!(payload, forged_payload);

    let forged = format!("{forged_payload}.{tag}");
    assert!(matches!(signer.verify(&forged), Err(TokenError::Invalid)));
  }

  #[test]
  fn wrong_secret_is_rejected() {
    let signer = TokenSigner::new(b"secret".to_vec(), Duration::hours(1));
    let other = TokenSigner::new(b"other".to_vec(), Duration::hours(1));
    let token = signer.issue(&user()).unwrap();
    assert!(other.verify(&token).is_err());
  }

  #[test]
  fn expired_token_is_rejected() {
    let signer = TokenSigner::new(b"secret".to_vec(), Duration::seconds(-1));
    let token = signer.issue(&user()).unwrap();
    assert!(matches!(signer.verify(&token), Err(TokenError::Expired)));
  }

  #[test]
  fn garbage_is_rejected() {
    let signer = TokenSigner::new(b"secret".to_vec(), Duration::hours(1));
    assert!(signer.verify("not-a-token").is_err());
    assert!(signer.verify("a.b").is_err());
    assert!(signer.verify("").is_err());
  }
}
