//! People and companies: visitors keyed by national identity, companies keyed
//! by tax id, and the staff users who operate the front desk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Visitor ─────────────────────────────────────────────────────────────────

/// A registered visitor. At most one row exists per (id type, DNI) pair;
/// registration looks up before inserting and never updates an existing
/// record (first-write-wins on name and contact fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visitor {
  pub id:                i64,
  pub id_type_id:        i64,
  /// National identity document number.
  pub dni:               i64,
  pub first_name:        String,
  pub last_name:         String,
  pub contact_prefix_id: i64,
  pub contact_number:    String,
  pub created_at:        DateTime<Utc>,
}

impl Visitor {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

// ─── Company ─────────────────────────────────────────────────────────────────

/// A visiting company, found-or-created by its tax id (RIF).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
  pub id:   i64,
  pub name: String,
  pub rif:  String,
}

// ─── Vehicle ─────────────────────────────────────────────────────────────────

/// A vehicle recorded for one vehicular visit. Rows are created fresh per
/// visit; plates are deliberately not deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
  pub id:    i64,
  pub plate: String,
  pub model: String,
  pub brand: Option<String>,
  pub color: Option<String>,
}

// ─── Users ───────────────────────────────────────────────────────────────────

/// Role of a staff user. Only [`Role::Admin`] may delete visitor records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  Admin,
  Operator,
}

impl Role {
  pub const fn is_admin(self) -> bool { matches!(self, Role::Admin) }

  pub const fn as_str(self) -> &'static str {
    match self {
      Role::Admin => "ADMIN",
      Role::Operator => "OPERATOR",
    }
  }
}

impl std::str::FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "ADMIN" => Ok(Role::Admin),
      "OPERATOR" => Ok(Role::Operator),
      other => Err(Error::UnknownRole(other.to_string())),
    }
  }
}

/// A front-desk or administrative user. The password hash lives only in
/// [`UserRecord`] and never crosses the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:         i64,
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
  pub role:       Role,
}

/// A user together with their argon2 PHC password hash, as stored.
#[derive(Debug, Clone)]
pub struct UserRecord {
  pub user:          User,
  pub password_hash: String,
}

/// Input for creating a user. The caller hashes the password.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
  pub first_name:    String,
  pub last_name:     String,
  pub role:          Role,
}
