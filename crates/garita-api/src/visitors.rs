//! Handlers for `/visitors` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/visitors` | All visits, newest first |
//! | `GET`    | `/visitors/search-visitor?dni=` | 404 if unknown |
//! | `POST`   | `/visitors/register-complete` | 201, or 400 with field names |
//! | `PATCH`  | `/visitors/exit/{id}` | 500 on any failure |
//! | `GET`    | `/visitors/dashboard-stats?timeRange=&metric=` | |
//! | `DELETE` | `/visitors/{id}`, `/visitors` | Admin only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use garita_core::{
  dashboard::{DashboardStats, Metric, TimeRange},
  store::VisitStore,
  validate,
  visit::{NewVisitRequest, VisitRecord, VisitorHistory},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError, token::AuthUser};

// ─── Listing & search ────────────────────────────────────────────────────────

/// `GET /visitors`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<VisitRecord>>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let records = state
    .store
    .list_visits()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(records))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub dni: i64,
}

/// `GET /visitors/search-visitor?dni=<dni>`
pub async fn search<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<VisitorHistory>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let history = state
    .store
    .find_visitor_history(params.dni)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no visitor with dni {}", params.dni))
    })?;
  Ok(Json(history))
}

// ─── Registration ────────────────────────────────────────────────────────────

/// `POST /visitors/register-complete`
///
/// Validates first (400 with offending field names, storage untouched), then
/// runs the whole registration as one transaction.
pub async fn register_complete<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewVisitRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let validated = validate::validate(body)?;

  let registration = state
    .store
    .register_visit(validated)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(registration)))
}

// ─── Exit marking ────────────────────────────────────────────────────────────

/// `PATCH /visitors/exit/{id}`
pub async fn mark_exit<S>(
  State(state): State<AppState<S>>,
  Path(visit_id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let visit = state
    .store
    .mark_exit(visit_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "message": "Exit registered", "visit": visit })))
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardParams {
  pub time_range: TimeRange,
  pub metric:     Metric,
}

/// `GET /visitors/dashboard-stats?timeRange=<range>&metric=<metric>`
pub async fn dashboard<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardStats>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let stats = state
    .store
    .dashboard_stats(params.time_range, params.metric)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(stats))
}

// ─── Deletes (admin only) ────────────────────────────────────────────────────

/// `DELETE /visitors/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(visitor_id): Path<i64>,
) -> Result<Json<Value>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if !user.role.is_admin() {
    return Err(ApiError::Forbidden);
  }

  state
    .store
    .delete_visitor(visitor_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "message": "Visitor deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteBody {
  pub ids: Vec<i64>,
}

/// `DELETE /visitors` — body `{"ids": [...]}`
pub async fn delete_many<S>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Json(body): Json<BulkDeleteBody>,
) -> Result<Json<Value>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if !user.role.is_admin() {
    return Err(ApiError::Forbidden);
  }

  state
    .store
    .delete_visitors(body.ids)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(json!({ "message": "Visitors deleted" })))
}
