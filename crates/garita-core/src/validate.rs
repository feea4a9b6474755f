//! Pre-transaction validation of registration requests.
//!
//! Requiredness is expressed as a declarative rule table keyed by visit type:
//! a base set that always applies, plus vehicle fields that apply only to
//! vehicular visits. Validation runs before any storage is touched and
//! reports every offending field name at once.

use chrono::NaiveDate;

use crate::{
  Error, Result,
  hierarchy::WideId,
  visit::{NewVisitRequest, VisitType},
};

// ─── Rule table ──────────────────────────────────────────────────────────────

type Rule = (&'static str, fn(&NewVisitRequest) -> bool);

fn present(s: &str) -> bool { !s.trim().is_empty() }

fn opt_present(s: &Option<String>) -> bool {
  s.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Fields required for every registration, regardless of visit type.
const BASE_RULES: &[Rule] = &[
  ("id_type_id", |r| r.id_type_id > 0),
  ("dni", |r| r.dni > 0),
  ("first_name", |r| present(&r.first_name)),
  ("last_name", |r| present(&r.last_name)),
  ("contact_prefix_id", |r| r.contact_prefix_id > 0),
  ("contact_number", |r| present(&r.contact_number)),
  ("company_name", |r| present(&r.company_name)),
  ("company_rif", |r| present(&r.company_rif)),
  ("visit_type", |r| r.visit_type.is_some()),
  ("entity_id", |r| r.entity_id > 0),
  ("administrative_unit_id", |r| r.administrative_unit_id.is_some()),
  ("visit_date", |r| r.visit_date.is_some()),
  ("reason", |r| present(&r.reason)),
];

/// Additionally required when the visit type is vehicular.
const VEHICULAR_RULES: &[Rule] = &[
  ("vehicle_plate", |r| opt_present(&r.vehicle_plate)),
  ("vehicle_model", |r| opt_present(&r.vehicle_model)),
];

/// Names of all fields the rule table finds missing or empty.
pub fn missing_fields(request: &NewVisitRequest) -> Vec<&'static str> {
  let mut missing: Vec<&'static str> = BASE_RULES
    .iter()
    .filter(|(_, ok)| !ok(request))
    .map(|(name, _)| *name)
    .collect();

  if request.visit_type == Some(VisitType::Vehicular) {
    missing.extend(
      VEHICULAR_RULES
        .iter()
        .filter(|(_, ok)| !ok(request))
        .map(|(name, _)| *name),
    );
  }

  missing
}

// ─── Validated shape ─────────────────────────────────────────────────────────

/// Vehicle attributes carried into the transaction for a vehicular visit.
#[derive(Debug, Clone)]
pub struct VehicleSpec {
  pub plate: String,
  pub model: String,
  pub brand: Option<String>,
  pub color: Option<String>,
}

/// A registration request that passed the rule table: conditionally required
/// fields are resolved to concrete values, and vehicle fields collapse to
/// `Some(spec)` exactly when the visit is vehicular.
#[derive(Debug, Clone)]
pub struct ValidatedVisit {
  pub id_type_id: i64,
  pub dni:        i64,
  pub first_name: String,
  pub last_name:  String,
  pub contact_prefix_id: i64,
  pub contact_number:    String,
  pub company_name: String,
  pub company_rif:  String,
  pub visit_type: VisitType,
  pub entity_id:  i64,
  pub administrative_unit_id: WideId,
  pub direction_id: Option<WideId>,
  pub area_id:      Option<WideId>,
  pub visit_date: NaiveDate,
  pub visit_hour: Option<String>,
  pub reason:     String,
  pub vehicle:    Option<VehicleSpec>,
}

/// Apply the rule table and lower the request into its validated form.
///
/// Vehicle fields on a pedestrian request are discarded rather than rejected.
pub fn validate(request: NewVisitRequest) -> Result<ValidatedVisit> {
  let missing = missing_fields(&request);
  if !missing.is_empty() {
    return Err(Error::Validation {
      fields: missing.iter().map(|s| s.to_string()).collect(),
    });
  }

  // The rule table guarantees these are set.
  let (Some(visit_type), Some(administrative_unit_id), Some(visit_date)) = (
    request.visit_type,
    request.administrative_unit_id,
    request.visit_date,
  ) else {
    return Err(Error::Validation {
      fields: vec!["visit_type".into()],
    });
  };

  let vehicle = match (visit_type, &request.vehicle_plate, &request.vehicle_model)
  {
    (VisitType::Vehicular, Some(plate), Some(model)) => Some(VehicleSpec {
      plate: plate.clone(),
      model: model.clone(),
      brand: request.vehicle_brand.clone(),
      color: request.vehicle_color.clone(),
    }),
    _ => None,
  };

  Ok(ValidatedVisit {
    id_type_id: request.id_type_id,
    dni: request.dni,
    first_name: request.first_name,
    last_name: request.last_name,
    contact_prefix_id: request.contact_prefix_id,
    contact_number: request.contact_number,
    company_name: request.company_name,
    company_rif: request.company_rif,
    visit_type,
    entity_id: request.entity_id,
    administrative_unit_id,
    direction_id: request.direction_id,
    area_id: request.area_id,
    visit_date,
    visit_hour: request.visit_hour,
    reason: request.reason,
    vehicle,
  })
}
