//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, visit dates as ISO 8601 dates,
//! hierarchy identifiers as 64-bit INTEGERs, roles and visit types as their
//! wire codes.

use chrono::{DateTime, NaiveDate, Utc};
use garita_core::{
  visit::{Visit, VisitRecord, VisitType},
  visitor::{Role, User, UserRecord, Vehicle, Visitor},
};

use crate::{Error, Result};

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<Role> { Ok(s.parse::<Role>()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns read directly from a `visitors` row.
pub struct RawVisitor {
  pub id:                i64,
  pub id_type_id:        i64,
  pub dni:               i64,
  pub first_name:        String,
  pub last_name:         String,
  pub contact_prefix_id: i64,
  pub contact_number:    String,
  pub created_at:        String,
}

impl RawVisitor {
  pub fn into_visitor(self) -> Result<Visitor> {
    Ok(Visitor {
      id:                self.id,
      id_type_id:        self.id_type_id,
      dni:               self.dni,
      first_name:        self.first_name,
      last_name:         self.last_name,
      contact_prefix_id: self.contact_prefix_id,
      contact_number:    self.contact_number,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

/// Raw columns read directly from a `visits` row.
pub struct RawVisit {
  pub id:         i64,
  pub visitor_id: i64,
  pub visit_type: i64,
  pub entity_id:  i64,
  pub administrative_unit_id: i64,
  pub direction_id: Option<i64>,
  pub area_id:      Option<i64>,
  pub visit_date: String,
  pub visit_hour: Option<String>,
  pub exit_at:    Option<String>,
  pub reason:     String,
  pub vehicle_id: Option<i64>,
  pub created_at: String,
  pub updated_at: String,
}

impl RawVisit {
  pub fn into_visit(self) -> Result<Visit> {
    Ok(Visit {
      id:         self.id,
      visitor_id: self.visitor_id,
      visit_type: VisitType::from_code(self.visit_type)?,
      entity_id:  self.entity_id,
      administrative_unit_id: self.administrative_unit_id.into(),
      direction_id: self.direction_id.map(Into::into),
      area_id:      self.area_id.map(Into::into),
      visit_date: decode_date(&self.visit_date)?,
      visit_hour: self.visit_hour,
      exit_at:    self.exit_at.as_deref().map(decode_dt).transpose()?,
      reason:     self.reason,
      vehicle_id: self.vehicle_id,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// A visit joined with its visitor, location names, vehicle and company —
/// one row of the listing query.
pub struct RawVisitRecord {
  pub visit:   RawVisit,
  pub visitor: RawVisitor,
  pub entity_name: String,
  pub administrative_unit_name: String,
  pub direction_name: Option<String>,
  pub area_name:      Option<String>,
  // vehicles LEFT JOIN: plate/model are NOT NULL in the table, so a NULL
  // plate here means the visit has no vehicle at all.
  pub vehicle_plate: Option<String>,
  pub vehicle_model: Option<String>,
  pub vehicle_brand: Option<String>,
  pub vehicle_color: Option<String>,
  pub company_name:  Option<String>,
}

impl RawVisitRecord {
  pub fn into_record(self) -> Result<VisitRecord> {
    let vehicle = match (self.visit.vehicle_id, self.vehicle_plate, self.vehicle_model) {
      (Some(id), Some(plate), Some(model)) => Some(Vehicle {
        id,
        plate,
        model,
        brand: self.vehicle_brand,
        color: self.vehicle_color,
      }),
      _ => None,
    };

    Ok(VisitRecord {
      visit:   self.visit.into_visit()?,
      visitor: self.visitor.into_visitor()?,
      company_name: self.company_name,
      entity_name:  self.entity_name,
      administrative_unit_name: self.administrative_unit_name,
      direction_name: self.direction_name,
      area_name:      self.area_name,
      vehicle,
    })
  }
}

/// Raw columns read directly from a `users` row.
pub struct RawUser {
  pub id:            i64,
  pub username:      String,
  pub password_hash: String,
  pub first_name:    String,
  pub last_name:     String,
  pub role:          String,
}

impl RawUser {
  pub fn into_record(self) -> Result<UserRecord> {
    Ok(UserRecord {
      user: User {
        id:         self.id,
        username:   self.username,
        first_name: self.first_name,
        last_name:  self.last_name,
        role:       decode_role(&self.role)?,
      },
      password_hash: self.password_hash,
    })
  }
}
