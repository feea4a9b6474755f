//! Visit records and the registration request/response shapes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, de};

use crate::{
  Error,
  hierarchy::WideId,
  visitor::{Company, Vehicle, Visitor},
};

// ─── VisitType ───────────────────────────────────────────────────────────────

/// How the visitor arrived. Travels as its integer code in JSON and storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitType {
  Pedestrian,
  Vehicular,
}

impl VisitType {
  pub const fn code(self) -> i64 {
    match self {
      VisitType::Pedestrian => 1,
      VisitType::Vehicular => 2,
    }
  }

  pub const fn from_code(code: i64) -> Result<Self, Error> {
    match code {
      1 => Ok(VisitType::Pedestrian),
      2 => Ok(VisitType::Vehicular),
      other => Err(Error::UnknownVisitType(other)),
    }
  }
}

impl Serialize for VisitType {
  fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(self.code())
  }
}

impl<'de> Deserialize<'de> for VisitType {
  fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    let code = i64::deserialize(d)?;
    VisitType::from_code(code).map_err(de::Error::custom)
  }
}

// ─── Visit ───────────────────────────────────────────────────────────────────

/// One recorded instance of a visitor's presence.
///
/// After creation the only mutation ever applied is setting `exit_at` (and
/// bumping `updated_at`) via the exit-marking operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
  pub id:         i64,
  pub visitor_id: i64,
  pub visit_type: VisitType,
  pub entity_id:  i64,
  pub administrative_unit_id: WideId,
  pub direction_id: Option<WideId>,
  pub area_id:      Option<WideId>,
  pub visit_date: NaiveDate,
  pub visit_hour: Option<String>,
  /// `None` while the visitor is on-site.
  pub exit_at:    Option<DateTime<Utc>>,
  pub reason:     String,
  pub vehicle_id: Option<i64>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Visit {
  /// An "active" visit is one whose exit timestamp has not been recorded.
  pub const fn is_active(&self) -> bool { self.exit_at.is_none() }
}

// ─── Registration request ────────────────────────────────────────────────────

/// The `POST /visitors/register-complete` body, exactly as received.
///
/// Everything is defaulted so that absent fields surface through the
/// validation rule table (with field names) instead of a bare
/// deserialization error. See [`crate::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewVisitRequest {
  // identity
  pub id_type_id: i64,
  pub dni:        i64,
  pub first_name: String,
  pub last_name:  String,
  // contact
  pub contact_prefix_id: i64,
  pub contact_number:    String,
  // company
  pub company_name: String,
  pub company_rif:  String,
  // visit
  pub visit_type: Option<VisitType>,
  pub entity_id:  i64,
  pub administrative_unit_id: Option<WideId>,
  pub direction_id: Option<WideId>,
  pub area_id:      Option<WideId>,
  pub visit_date: Option<NaiveDate>,
  pub visit_hour: Option<String>,
  pub reason:     String,
  // vehicle (required for vehicular visits, discarded for pedestrian ones)
  pub vehicle_plate: Option<String>,
  pub vehicle_model: Option<String>,
  pub vehicle_brand: Option<String>,
  pub vehicle_color: Option<String>,
}

/// Composite result of a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
  pub visitor: Visitor,
  pub company: Company,
  pub vehicle: Option<Vehicle>,
  pub visit:   Visit,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// A visit expanded with joined display data for listing views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRecord {
  pub visit:   Visit,
  pub visitor: Visitor,
  /// Name of the visitor's most recent company association, if any.
  pub company_name: Option<String>,
  pub entity_name:  String,
  pub administrative_unit_name: String,
  pub direction_name: Option<String>,
  pub area_name:      Option<String>,
  pub vehicle: Option<Vehicle>,
}

/// Result of a DNI search: the visitor plus their recent visit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorHistory {
  pub visitor: Visitor,
  pub company_name: Option<String>,
  /// Up to the 5 most recent visits, newest first.
  pub visits:  Vec<VisitRecord>,
}
