//! Handlers for `/selects` endpoints — the reference pickers the registration
//! form is built from.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/selects/entities` | |
//! | `GET` | `/selects/administrative-units/{entity_id}` | |
//! | `GET` | `/selects/directions/{unit_id}` | |
//! | `GET` | `/selects/areas/{parent_id}?type=unit\|direction` | 400 on any other type |
//! | `GET` | `/selects/id-types` | |
//! | `GET` | `/selects/contact-prefixes` | |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use garita_core::{
  hierarchy::{
    AdministrativeUnit, Area, AreaParent, ContactPrefix, Direction, Entity,
    IdType, WideId,
  },
  store::VisitStore,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// `GET /selects/entities`
pub async fn entities<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Entity>>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entities = state
    .store
    .list_entities()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(entities))
}

/// `GET /selects/administrative-units/{entity_id}`
pub async fn administrative_units<S>(
  State(state): State<AppState<S>>,
  Path(entity_id): Path<i64>,
) -> Result<Json<Vec<AdministrativeUnit>>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let units = state
    .store
    .list_administrative_units(entity_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(units))
}

/// `GET /selects/directions/{unit_id}`
pub async fn directions<S>(
  State(state): State<AppState<S>>,
  Path(unit_id): Path<i64>,
) -> Result<Json<Vec<Direction>>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let directions = state
    .store
    .list_directions(WideId::new(unit_id))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(directions))
}

#[derive(Debug, Deserialize)]
pub struct AreaParams {
  #[serde(rename = "type")]
  pub parent_type: Option<String>,
}

/// `GET /selects/areas/{parent_id}?type=unit|direction`
///
/// For `unit` the result covers the whole subtree: areas directly under the
/// unit plus areas under the unit's directions.
pub async fn areas<S>(
  State(state): State<AppState<S>>,
  Path(parent_id): Path<i64>,
  Query(params): Query<AreaParams>,
) -> Result<Json<Vec<Area>>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let parent = match params.parent_type.as_deref() {
    Some("unit") => AreaParent::Unit(WideId::new(parent_id)),
    Some("direction") => AreaParent::Direction(WideId::new(parent_id)),
    other => {
      return Err(ApiError::BadRequest(format!(
        "type must be 'unit' or 'direction', got {:?}",
        other.unwrap_or("nothing")
      )));
    }
  };

  let areas = state
    .store
    .list_areas(parent)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(areas))
}

/// `GET /selects/id-types`
pub async fn id_types<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<IdType>>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let id_types = state
    .store
    .list_id_types()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(id_types))
}

/// `GET /selects/contact-prefixes`
pub async fn contact_prefixes<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<ContactPrefix>>, ApiError>
where
  S: VisitStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let prefixes = state
    .store
    .list_contact_prefixes()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(prefixes))
}
