//! The location hierarchy: Entity → AdministrativeUnit → Direction → Area,
//! plus the static reference sets (id types, contact prefixes).
//!
//! All hierarchy rows are seeded once at provisioning time and read-only
//! thereafter.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, de};

// ─── WideId ──────────────────────────────────────────────────────────────────

/// An externally assigned hierarchy identifier.
///
/// Unit/direction/area codes (e.g. `860204000200`) exceed both `i32` and the
/// JavaScript safe-integer range, so they travel as decimal strings in JSON:
/// always serialized as a string, accepted on input as a string or a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WideId(i64);

impl WideId {
  pub const fn new(value: i64) -> Self { Self(value) }

  pub const fn get(self) -> i64 { self.0 }
}

impl fmt::Display for WideId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl From<i64> for WideId {
  fn from(value: i64) -> Self { Self(value) }
}

impl FromStr for WideId {
  type Err = std::num::ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { s.parse().map(Self) }
}

impl Serialize for WideId {
  fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for WideId {
  fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    struct WideIdVisitor;

    impl de::Visitor<'_> for WideIdVisitor {
      type Value = WideId;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a decimal string")
      }

      fn visit_i64<E: de::Error>(self, v: i64) -> Result<WideId, E> {
        Ok(WideId(v))
      }

      fn visit_u64<E: de::Error>(self, v: u64) -> Result<WideId, E> {
        i64::try_from(v)
          .map(WideId)
          .map_err(|_| E::custom("identifier out of range"))
      }

      fn visit_str<E: de::Error>(self, v: &str) -> Result<WideId, E> {
        v.parse().map_err(E::custom)
      }
    }

    d.deserialize_any(WideIdVisitor)
  }
}

// ─── Hierarchy rows ──────────────────────────────────────────────────────────

/// Top-level organizational unit (a ministry or company).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
  pub id:   i64,
  pub name: String,
}

/// A ministry office or department under an [`Entity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdministrativeUnit {
  pub id:        WideId,
  pub name:      String,
  pub entity_id: i64,
}

/// A line direction under an [`AdministrativeUnit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Direction {
  pub id:   WideId,
  pub name: String,
  pub administrative_unit_id: WideId,
}

/// A work-area leaf node. Hangs off exactly one administrative unit OR
/// exactly one direction — never both, never neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
  pub id:   WideId,
  pub name: String,
  pub administrative_unit_id: Option<WideId>,
  pub direction_id:           Option<WideId>,
}

/// Which parent an area lookup is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaParent {
  /// Areas directly under the unit, plus areas under the unit's directions.
  Unit(WideId),
  /// Areas of this direction only.
  Direction(WideId),
}

// ─── Static reference sets ───────────────────────────────────────────────────

/// A national-identity document type (e.g. V = national, E = foreign).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdType {
  pub id:           i64,
  pub name:         String,
  pub abbreviation: String,
}

/// A phone country/operator code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactPrefix {
  pub id:   i64,
  pub code: String,
}
