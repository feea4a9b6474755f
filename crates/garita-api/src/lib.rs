//! JSON REST API for Garita.
//!
//! Exposes an axum [`Router`] backed by any [`garita_core::store::VisitStore`].
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = garita_api::api_router(store.clone(), signer);
//! ```

pub mod auth;
pub mod error;
pub mod selects;
pub mod token;
pub mod visitors;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, patch, post},
};
use garita_core::store::VisitStore;

pub use error::ApiError;
pub use token::TokenSigner;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenSigner>,
}

// Manual impl: `S` itself need not be `Clone` behind the `Arc`.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  self.store.clone(),
      tokens: self.tokens.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, tokens: TokenSigner) -> Router<()>
where
  S: VisitStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let state = AppState {
    store,
    tokens: Arc::new(tokens),
  };

  Router::new()
    // Auth
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/register", post(auth::register::<S>))
    .route("/auth/verify-token", post(auth::verify_token))
    // Visitors & visits
    .route(
      "/visitors",
      get(visitors::list::<S>).delete(visitors::delete_many::<S>),
    )
    .route("/visitors/search-visitor", get(visitors::search::<S>))
    .route(
      "/visitors/register-complete",
      post(visitors::register_complete::<S>),
    )
    .route("/visitors/exit/{id}", patch(visitors::mark_exit::<S>))
    .route("/visitors/dashboard-stats", get(visitors::dashboard::<S>))
    .route("/visitors/{id}", delete(visitors::delete_one::<S>))
    // Selects
    .route("/selects/entities", get(selects::entities::<S>))
    .route(
      "/selects/administrative-units/{entity_id}",
      get(selects::administrative_units::<S>),
    )
    .route("/selects/directions/{unit_id}", get(selects::directions::<S>))
    .route("/selects/areas/{parent_id}", get(selects::areas::<S>))
    .route("/selects/id-types", get(selects::id_types::<S>))
    .route("/selects/contact-prefixes", get(selects::contact_prefixes::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::Utc;
  use garita_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn test_router() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.seed_reference_data().await.unwrap();
    api_router(
      Arc::new(store),
      TokenSigner::new(b"test-secret".to_vec(), chrono::Duration::hours(1)),
    )
  }

  async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder =
        builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn visit_body(dni: i64) -> Value {
    json!({
      "id_type_id": 1,
      "dni": dni,
      "first_name": "Ana",
      "last_name": "Pérez",
      "contact_prefix_id": 1,
      "contact_number": "5551234",
      "company_name": "Acme C.A.",
      "company_rif": "J-12345678-9",
      "visit_type": 1,
      "entity_id": 1,
      "administrative_unit_id": "860000000000",
      "visit_date": Utc::now().date_naive().to_string(),
      "reason": "Reunión"
    })
  }

  async fn register_user(router: &Router, username: &str, role: &str) -> String {
    let (status, body) = send(
      router,
      "POST",
      "/auth/register",
      None,
      Some(json!({
        "username": username,
        "password": "secret",
        "firstName": "Luis",
        "lastName": "Gómez",
        "role": role
      })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["token"].as_str().unwrap().to_string()
  }

  // ── Registration ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_complete_returns_201_and_string_wide_ids() {
    let router = test_router().await;

    let (status, body) = send(
      &router,
      "POST",
      "/visitors/register-complete",
      None,
      Some(visit_body(12345678)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");

    // Wide ids come back as the exact submitted string.
    assert_eq!(body["visit"]["administrative_unit_id"], "860000000000");
    assert_eq!(body["visit"]["visit_type"], 1);
    assert_eq!(body["visitor"]["dni"], 12345678);
    assert_eq!(body["company"]["rif"], "J-12345678-9");
    assert!(body["vehicle"].is_null());
    assert!(body["visit"]["exit_at"].is_null());
  }

  #[tokio::test]
  async fn empty_registration_lists_every_missing_field() {
    let router = test_router().await;

    let (status, body) = send(
      &router,
      "POST",
      "/visitors/register-complete",
      None,
      Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let fields: Vec<&str> = body["fields"]
      .as_array()
      .unwrap()
      .iter()
      .map(|v| v.as_str().unwrap())
      .collect();
    assert!(fields.contains(&"dni"), "fields: {fields:?}");
    assert!(fields.contains(&"reason"), "fields: {fields:?}");
    assert!(fields.contains(&"visit_type"), "fields: {fields:?}");
  }

  #[tokio::test]
  async fn vehicular_registration_requires_vehicle_fields() {
    let router = test_router().await;

    let mut body = visit_body(12345678);
    body["visit_type"] = json!(2);
    let (status, response) = send(
      &router,
      "POST",
      "/visitors/register-complete",
      None,
      Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let fields = response["fields"].as_array().unwrap();
    assert!(fields.contains(&json!("vehicle_plate")));
    assert!(fields.contains(&json!("vehicle_model")));
  }

  // ── Search & exit ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn search_unknown_dni_returns_404() {
    let router = test_router().await;
    let (status, _) = send(
      &router,
      "GET",
      "/visitors/search-visitor?dni=99999999",
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn registered_visit_can_be_searched_and_closed() {
    let router = test_router().await;

    let (_, registration) = send(
      &router,
      "POST",
      "/visitors/register-complete",
      None,
      Some(visit_body(12345678)),
    )
    .await;
    let visit_id = registration["visit"]["id"].as_i64().unwrap();

    let (status, history) = send(
      &router,
      "GET",
      "/visitors/search-visitor?dni=12345678",
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["visits"].as_array().unwrap().len(), 1);
    assert_eq!(history["company_name"], "Acme C.A.");

    let (status, exited) = send(
      &router,
      "PATCH",
      &format!("/visitors/exit/{visit_id}"),
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!exited["visit"]["exit_at"].is_null());

    let (_, listing) = send(&router, "GET", "/visitors", None, None).await;
    assert!(!listing[0]["visit"]["exit_at"].is_null());
  }

  #[tokio::test]
  async fn exit_on_unknown_visit_returns_500() {
    let router = test_router().await;
    let (status, _) =
      send(&router, "PATCH", "/visitors/exit/4242", None, None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn dashboard_reports_totals_and_charts() {
    let router = test_router().await;

    send(
      &router,
      "POST",
      "/visitors/register-complete",
      None,
      Some(visit_body(11111111)),
    )
    .await;
    send(
      &router,
      "POST",
      "/visitors/register-complete",
      None,
      Some(visit_body(22222222)),
    )
    .await;

    let (status, body) = send(
      &router,
      "GET",
      "/visitors/dashboard-stats?timeRange=day&metric=entities",
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalVisits"], 2);
    assert_eq!(body["stats"]["activeVisits"], 2);
    assert_eq!(body["stats"]["uniqueVisitors"], 2);
    assert_eq!(body["charts"]["main"][0]["label"], "MIDME");
    assert_eq!(body["charts"]["topVisitors"].as_array().unwrap().len(), 1);
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_round_trip() {
    let router = test_router().await;
    register_user(&router, "porteria1", "OPERATOR").await;

    let (status, body) = send(
      &router,
      "POST",
      "/auth/login",
      None,
      Some(json!({ "username": "porteria1", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "OPERATOR");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, verified) = send(
      &router,
      "POST",
      "/auth/verify-token",
      Some(token.as_str()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["isValid"], true);
    assert_eq!(verified["user"]["username"], "porteria1");
  }

  #[tokio::test]
  async fn wrong_password_and_unknown_user_get_the_same_400() {
    let router = test_router().await;
    register_user(&router, "porteria1", "OPERATOR").await;

    for login in [
      json!({ "username": "porteria1", "password": "wrong" }),
      json!({ "username": "nadie", "password": "secret" }),
    ] {
      let (status, body) =
        send(&router, "POST", "/auth/login", None, Some(login)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST);
      assert_eq!(body["error"], "Invalid credentials");
    }
  }

  #[tokio::test]
  async fn duplicate_username_returns_400() {
    let router = test_router().await;
    register_user(&router, "porteria1", "OPERATOR").await;

    let (status, _) = send(
      &router,
      "POST",
      "/auth/register",
      None,
      Some(json!({
        "username": "porteria1",
        "password": "other",
        "firstName": "Otro",
        "lastName": "Usuario",
        "role": "OPERATOR"
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn verify_token_without_token_returns_401() {
    let router = test_router().await;
    let (status, _) =
      send(&router, "POST", "/auth/verify-token", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  // ── Admin deletes ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn deletes_are_gated_by_token_and_role() {
    let router = test_router().await;
    let operator = register_user(&router, "porteria1", "OPERATOR").await;
    let admin = register_user(&router, "jefe", "ADMIN").await;

    let (_, registration) = send(
      &router,
      "POST",
      "/visitors/register-complete",
      None,
      Some(visit_body(12345678)),
    )
    .await;
    let visitor_id = registration["visitor"]["id"].as_i64().unwrap();

    let (status, _) = send(
      &router,
      "DELETE",
      &format!("/visitors/{visitor_id}"),
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
      &router,
      "DELETE",
      &format!("/visitors/{visitor_id}"),
      Some(operator.as_str()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
      &router,
      "DELETE",
      &format!("/visitors/{visitor_id}"),
      Some(admin.as_str()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
      &router,
      "GET",
      "/visitors/search-visitor?dni=12345678",
      None,
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn bulk_delete_with_admin_token() {
    let router = test_router().await;
    let admin = register_user(&router, "jefe", "ADMIN").await;

    let (_, a) = send(
      &router,
      "POST",
      "/visitors/register-complete",
      None,
      Some(visit_body(11111111)),
    )
    .await;
    let (_, b) = send(
      &router,
      "POST",
      "/visitors/register-complete",
      None,
      Some(visit_body(22222222)),
    )
    .await;

    let ids = json!({
      "ids": [
        a["visitor"]["id"].as_i64().unwrap(),
        b["visitor"]["id"].as_i64().unwrap(),
      ]
    });
    let (status, _) =
      send(&router, "DELETE", "/visitors", Some(admin.as_str()), Some(ids))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listing) = send(&router, "GET", "/visitors", None, None).await;
    assert_eq!(listing.as_array().unwrap().len(), 0);
  }

  // ── Selects ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn hierarchy_is_navigable_through_selects() {
    let router = test_router().await;

    let (status, entities) =
      send(&router, "GET", "/selects/entities", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entities.as_array().unwrap().len(), 2);

    let (_, units) = send(
      &router,
      "GET",
      "/selects/administrative-units/1",
      None,
      None,
    )
    .await;
    // Unit ids serialize as strings.
    assert_eq!(units[0]["id"], "860000000000");

    let (_, directions) = send(
      &router,
      "GET",
      "/selects/directions/860003000000",
      None,
      None,
    )
    .await;
    assert_eq!(directions.as_array().unwrap().len(), 2);

    let (_, areas) = send(
      &router,
      "GET",
      "/selects/areas/860009000000?type=unit",
      None,
      None,
    )
    .await;
    assert_eq!(areas.as_array().unwrap().len(), 2);

    let (_, id_types) =
      send(&router, "GET", "/selects/id-types", None, None).await;
    assert_eq!(id_types.as_array().unwrap().len(), 3);

    let (_, prefixes) =
      send(&router, "GET", "/selects/contact-prefixes", None, None).await;
    assert_eq!(prefixes.as_array().unwrap().len(), 5);
  }

  #[tokio::test]
  async fn unknown_area_parent_type_returns_400() {
    let router = test_router().await;

    for uri in [
      "/selects/areas/860009000000?type=floor",
      "/selects/areas/860009000000",
    ] {
      let (status, _) = send(&router, "GET", uri, None, None).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
    }
  }
}
