//! [`SqliteStore`] — the SQLite implementation of [`VisitStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use garita_core::{
  dashboard::{self, DashboardStats, Metric, StatRow, TimeRange},
  hierarchy::{
    AdministrativeUnit, Area, AreaParent, ContactPrefix, Direction, Entity,
    IdType, WideId,
  },
  store::VisitStore,
  validate::ValidatedVisit,
  visit::{Registration, Visit, VisitRecord, VisitorHistory},
  visitor::{Company, NewUser, User, UserRecord, Vehicle},
};

use crate::{
  Error, Result,
  encode::{RawUser, RawVisit, RawVisitRecord, RawVisitor, encode_date, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Garita store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SQL fragments ───────────────────────────────────────────────────────────

/// The listing join: a visit expanded with visitor, location names, vehicle
/// and the visitor's most recent company association.
const VISIT_RECORD_SELECT: &str = "
  SELECT
    v.id, v.visitor_id, v.visit_type, v.entity_id, v.administrative_unit_id,
    v.direction_id, v.area_id, v.visit_date, v.visit_hour, v.exit_at,
    v.reason, v.vehicle_id, v.created_at, v.updated_at,
    vis.id, vis.id_type_id, vis.dni, vis.first_name, vis.last_name,
    vis.contact_prefix_id, vis.contact_number, vis.created_at,
    e.name, au.name, d.name, a.name,
    veh.plate, veh.model, veh.brand, veh.color,
    c.name
  FROM visits v
  JOIN visitors vis ON vis.id = v.visitor_id
  JOIN entities e   ON e.id = v.entity_id
  JOIN administrative_units au ON au.id = v.administrative_unit_id
  LEFT JOIN directions d ON d.id = v.direction_id
  LEFT JOIN areas a      ON a.id = v.area_id
  LEFT JOIN vehicles veh ON veh.id = v.vehicle_id
  LEFT JOIN companies c  ON c.id = (
    SELECT vc.company_id FROM visitor_companies vc
    WHERE vc.visitor_id = vis.id
    ORDER BY vc.id DESC LIMIT 1
  )";

fn visit_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawVisitRecord> {
  Ok(RawVisitRecord {
    visit: RawVisit {
      id:         row.get(0)?,
      visitor_id: row.get(1)?,
      visit_type: row.get(2)?,
      entity_id:  row.get(3)?,
      administrative_unit_id: row.get(4)?,
      direction_id: row.get(5)?,
      area_id:      row.get(6)?,
      visit_date: row.get(7)?,
      visit_hour: row.get(8)?,
      exit_at:    row.get(9)?,
      reason:     row.get(10)?,
      vehicle_id: row.get(11)?,
      created_at: row.get(12)?,
      updated_at: row.get(13)?,
    },
    visitor: RawVisitor {
      id:                row.get(14)?,
      id_type_id:        row.get(15)?,
      dni:               row.get(16)?,
      first_name:        row.get(17)?,
      last_name:         row.get(18)?,
      contact_prefix_id: row.get(19)?,
      contact_number:    row.get(20)?,
      created_at:        row.get(21)?,
    },
    entity_name: row.get(22)?,
    administrative_unit_name: row.get(23)?,
    direction_name: row.get(24)?,
    area_name:      row.get(25)?,
    vehicle_plate: row.get(26)?,
    vehicle_model: row.get(27)?,
    vehicle_brand: row.get(28)?,
    vehicle_color: row.get(29)?,
    company_name:  row.get(30)?,
  })
}

// ─── Transaction helpers ─────────────────────────────────────────────────────

fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

fn fetch_visitor(
  tx: &rusqlite::Transaction<'_>,
  id_type_id: i64,
  dni: i64,
) -> rusqlite::Result<Option<RawVisitor>> {
  tx.query_row(
    "SELECT id, id_type_id, dni, first_name, last_name, contact_prefix_id,
            contact_number, created_at
     FROM visitors WHERE id_type_id = ?1 AND dni = ?2",
    rusqlite::params![id_type_id, dni],
    |row| {
      Ok(RawVisitor {
        id:                row.get(0)?,
        id_type_id:        row.get(1)?,
        dni:               row.get(2)?,
        first_name:        row.get(3)?,
        last_name:         row.get(4)?,
        contact_prefix_id: row.get(5)?,
        contact_number:    row.get(6)?,
        created_at:        row.get(7)?,
      })
    },
  )
  .optional()
}

/// Find-or-create the visitor. An existing row wins unchanged; a UNIQUE
/// violation on insert means a concurrent registration got there first, so
/// re-fetch and use that row.
fn resolve_visitor(
  tx: &rusqlite::Transaction<'_>,
  request: &ValidatedVisit,
  now: &str,
) -> rusqlite::Result<RawVisitor> {
  if let Some(existing) = fetch_visitor(tx, request.id_type_id, request.dni)? {
    return Ok(existing);
  }

  let inserted = tx.execute(
    "INSERT INTO visitors
       (id_type_id, dni, first_name, last_name, contact_prefix_id,
        contact_number, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      request.id_type_id,
      request.dni,
      request.first_name,
      request.last_name,
      request.contact_prefix_id,
      request.contact_number,
      now,
    ],
  );

  match inserted {
    Ok(_) => {}
    Err(e) if is_unique_violation(&e) => {}
    Err(e) => return Err(e),
  }

  fetch_visitor(tx, request.id_type_id, request.dni)?
    .ok_or(rusqlite::Error::QueryReturnedNoRows)
}

fn fetch_company(
  tx: &rusqlite::Transaction<'_>,
  rif: &str,
) -> rusqlite::Result<Option<Company>> {
  tx.query_row(
    "SELECT id, name, rif FROM companies WHERE rif = ?1",
    rusqlite::params![rif],
    |row| {
      Ok(Company {
        id:   row.get(0)?,
        name: row.get(1)?,
        rif:  row.get(2)?,
      })
    },
  )
  .optional()
}

fn resolve_company(
  tx: &rusqlite::Transaction<'_>,
  name: &str,
  rif: &str,
) -> rusqlite::Result<Company> {
  if let Some(existing) = fetch_company(tx, rif)? {
    return Ok(existing);
  }

  let inserted = tx.execute(
    "INSERT INTO companies (name, rif) VALUES (?1, ?2)",
    rusqlite::params![name, rif],
  );

  match inserted {
    Ok(_) => {}
    Err(e) if is_unique_violation(&e) => {}
    Err(e) => return Err(e),
  }

  fetch_company(tx, rif)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

/// Create the visitor↔company association only if it does not already exist.
fn ensure_association(
  tx: &rusqlite::Transaction<'_>,
  visitor_id: i64,
  company_id: i64,
) -> rusqlite::Result<()> {
  tx.execute(
    "INSERT OR IGNORE INTO visitor_companies (visitor_id, company_id)
     VALUES (?1, ?2)",
    rusqlite::params![visitor_id, company_id],
  )?;
  Ok(())
}

fn delete_visitor_rows(
  tx: &rusqlite::Transaction<'_>,
  visitor_id: i64,
) -> rusqlite::Result<()> {
  let mut stmt = tx.prepare(
    "SELECT vehicle_id FROM visits
     WHERE visitor_id = ?1 AND vehicle_id IS NOT NULL",
  )?;
  let vehicle_ids = stmt
    .query_map(rusqlite::params![visitor_id], |row| row.get::<_, i64>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  drop(stmt);

  tx.execute(
    "DELETE FROM visits WHERE visitor_id = ?1",
    rusqlite::params![visitor_id],
  )?;
  for vehicle_id in vehicle_ids {
    tx.execute(
      "DELETE FROM vehicles WHERE id = ?1",
      rusqlite::params![vehicle_id],
    )?;
  }
  tx.execute(
    "DELETE FROM visitor_companies WHERE visitor_id = ?1",
    rusqlite::params![visitor_id],
  )?;
  tx.execute(
    "DELETE FROM visitors WHERE id = ?1",
    rusqlite::params![visitor_id],
  )?;
  Ok(())
}

// ─── VisitStore impl ─────────────────────────────────────────────────────────

impl VisitStore for SqliteStore {
  type Error = Error;

  // ── Location hierarchy ────────────────────────────────────────────────────

  async fn list_entities(&self) -> Result<Vec<Entity>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, name FROM entities ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Entity {
              id:   row.get(0)?,
              name: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn list_administrative_units(
    &self,
    entity_id: i64,
  ) -> Result<Vec<AdministrativeUnit>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, entity_id FROM administrative_units
           WHERE entity_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![entity_id], |row| {
            Ok(AdministrativeUnit {
              id:        WideId::new(row.get(0)?),
              name:      row.get(1)?,
              entity_id: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn list_directions(&self, unit_id: WideId) -> Result<Vec<Direction>> {
    let unit_raw = unit_id.get();
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, name, administrative_unit_id FROM directions
           WHERE administrative_unit_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![unit_raw], |row| {
            Ok(Direction {
              id:   WideId::new(row.get(0)?),
              name: row.get(1)?,
              administrative_unit_id: WideId::new(row.get(2)?),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn list_areas(&self, parent: AreaParent) -> Result<Vec<Area>> {
    // For a unit, include areas hanging off the unit's directions as well —
    // the picker shows the whole subtree.
    let (sql, parent_raw) = match parent {
      AreaParent::Unit(id) => (
        "SELECT id, name, administrative_unit_id, direction_id FROM areas
         WHERE administrative_unit_id = ?1
            OR direction_id IN
               (SELECT id FROM directions WHERE administrative_unit_id = ?1)
         ORDER BY id",
        id.get(),
      ),
      AreaParent::Direction(id) => (
        "SELECT id, name, administrative_unit_id, direction_id FROM areas
         WHERE direction_id = ?1 ORDER BY id",
        id.get(),
      ),
    };

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params![parent_raw], |row| {
            Ok(Area {
              id:   WideId::new(row.get(0)?),
              name: row.get(1)?,
              administrative_unit_id: row
                .get::<_, Option<i64>>(2)?
                .map(WideId::new),
              direction_id: row.get::<_, Option<i64>>(3)?.map(WideId::new),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn list_id_types(&self) -> Result<Vec<IdType>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT id, name, abbreviation FROM id_types ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(IdType {
              id:           row.get(0)?,
              name:         row.get(1)?,
              abbreviation: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn list_contact_prefixes(&self) -> Result<Vec<ContactPrefix>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, code FROM contact_prefixes ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(ContactPrefix {
              id:   row.get(0)?,
              code: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  // ── Registration ──────────────────────────────────────────────────────────

  async fn register_visit(
    &self,
    request: ValidatedVisit,
  ) -> Result<Registration> {
    let now = Utc::now();
    let now_str = encode_dt(now);
    let request_for_result = request.clone();

    // One atomic unit. BEGIN IMMEDIATE takes the write lock up front so two
    // concurrent registrations for the same identity serialize instead of
    // both passing the "not found" check.
    let (raw_visitor, company, vehicle, visit_id) = self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let visitor = resolve_visitor(&tx, &request, &now_str)?;
        let company =
          resolve_company(&tx, &request.company_name, &request.company_rif)?;
        ensure_association(&tx, visitor.id, company.id)?;

        let vehicle = match &request.vehicle {
          Some(spec) => {
            tx.execute(
              "INSERT INTO vehicles (plate, model, brand, color)
               VALUES (?1, ?2, ?3, ?4)",
              rusqlite::params![spec.plate, spec.model, spec.brand, spec.color],
            )?;
            Some(Vehicle {
              id:    tx.last_insert_rowid(),
              plate: spec.plate.clone(),
              model: spec.model.clone(),
              brand: spec.brand.clone(),
              color: spec.color.clone(),
            })
          }
          None => None,
        };

        tx.execute(
          "INSERT INTO visits
             (visitor_id, visit_type, entity_id, administrative_unit_id,
              direction_id, area_id, visit_date, visit_hour, exit_at, reason,
              vehicle_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9, ?10, ?11, ?11)",
          rusqlite::params![
            visitor.id,
            request.visit_type.code(),
            request.entity_id,
            request.administrative_unit_id.get(),
            request.direction_id.map(WideId::get),
            request.area_id.map(WideId::get),
            encode_date(request.visit_date),
            request.visit_hour,
            request.reason,
            vehicle.as_ref().map(|v| v.id),
            now_str,
          ],
        )?;
        let visit_id = tx.last_insert_rowid();

        tx.commit()?;
        Ok((visitor, company, vehicle, visit_id))
      })
      .await?;

    let visitor = raw_visitor.into_visitor()?;
    let visit = Visit {
      id:         visit_id,
      visitor_id: visitor.id,
      visit_type: request_for_result.visit_type,
      entity_id:  request_for_result.entity_id,
      administrative_unit_id: request_for_result.administrative_unit_id,
      direction_id: request_for_result.direction_id,
      area_id:      request_for_result.area_id,
      visit_date: request_for_result.visit_date,
      visit_hour: request_for_result.visit_hour,
      exit_at:    None,
      reason:     request_for_result.reason,
      vehicle_id: vehicle.as_ref().map(|v| v.id),
      created_at: now,
      updated_at: now,
    };

    Ok(Registration {
      visitor,
      company,
      vehicle,
      visit,
    })
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  async fn list_visits(&self) -> Result<Vec<VisitRecord>> {
    let raws: Vec<RawVisitRecord> = self
      .conn
      .call(|conn| {
        let sql =
          format!("{VISIT_RECORD_SELECT} ORDER BY v.created_at DESC, v.id DESC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], visit_record_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisitRecord::into_record).collect()
  }

  async fn find_visitor_history(&self, dni: i64) -> Result<Option<VisitorHistory>> {
    let found: Option<(RawVisitor, Option<String>, Vec<RawVisitRecord>)> = self
      .conn
      .call(move |conn| {
        let visitor = conn
          .query_row(
            "SELECT vis.id, vis.id_type_id, vis.dni, vis.first_name,
                    vis.last_name, vis.contact_prefix_id, vis.contact_number,
                    vis.created_at, c.name
             FROM visitors vis
             LEFT JOIN companies c ON c.id = (
               SELECT vc.company_id FROM visitor_companies vc
               WHERE vc.visitor_id = vis.id
               ORDER BY vc.id DESC LIMIT 1
             )
             WHERE vis.dni = ?1
             ORDER BY vis.id LIMIT 1",
            rusqlite::params![dni],
            |row| {
              Ok((
                RawVisitor {
                  id:                row.get(0)?,
                  id_type_id:        row.get(1)?,
                  dni:               row.get(2)?,
                  first_name:        row.get(3)?,
                  last_name:         row.get(4)?,
                  contact_prefix_id: row.get(5)?,
                  contact_number:    row.get(6)?,
                  created_at:        row.get(7)?,
                },
                row.get::<_, Option<String>>(8)?,
              ))
            },
          )
          .optional()?;

        let Some((visitor, company_name)) = visitor else {
          return Ok(None);
        };

        let sql = format!(
          "{VISIT_RECORD_SELECT}
           WHERE v.visitor_id = ?1
           ORDER BY v.created_at DESC, v.id DESC
           LIMIT 5"
        );
        let mut stmt = conn.prepare(&sql)?;
        let visits = stmt
          .query_map(rusqlite::params![visitor.id], visit_record_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((visitor, company_name, visits)))
      })
      .await?;

    let Some((raw_visitor, company_name, raw_visits)) = found else {
      return Ok(None);
    };

    Ok(Some(VisitorHistory {
      visitor: raw_visitor.into_visitor()?,
      company_name,
      visits: raw_visits
        .into_iter()
        .map(RawVisitRecord::into_record)
        .collect::<Result<_>>()?,
    }))
  }

  async fn mark_exit(&self, visit_id: i64) -> Result<Visit> {
    let now_str = encode_dt(Utc::now());

    let raw: Option<RawVisit> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE visits SET exit_at = ?1, updated_at = ?1 WHERE id = ?2",
          rusqlite::params![now_str, visit_id],
        )?;
        if changed == 0 {
          return Ok(None);
        }

        let raw = conn
          .query_row(
            "SELECT id, visitor_id, visit_type, entity_id,
                    administrative_unit_id, direction_id, area_id, visit_date,
                    visit_hour, exit_at, reason, vehicle_id, created_at,
                    updated_at
             FROM visits WHERE id = ?1",
            rusqlite::params![visit_id],
            |row| {
              Ok(RawVisit {
                id:         row.get(0)?,
                visitor_id: row.get(1)?,
                visit_type: row.get(2)?,
                entity_id:  row.get(3)?,
                administrative_unit_id: row.get(4)?,
                direction_id: row.get(5)?,
                area_id:      row.get(6)?,
                visit_date: row.get(7)?,
                visit_hour: row.get(8)?,
                exit_at:    row.get(9)?,
                reason:     row.get(10)?,
                vehicle_id: row.get(11)?,
                created_at: row.get(12)?,
                updated_at: row.get(13)?,
              })
            },
          )
          .optional()?;
        Ok(raw)
      })
      .await?;

    raw
      .ok_or(Error::VisitNotFound(visit_id))?
      .into_visit()
  }

  async fn dashboard_stats(
    &self,
    range: TimeRange,
    metric: Metric,
  ) -> Result<DashboardStats> {
    let lower = range.lower_bound(Utc::now()).map(encode_date);

    type RawStat =
      (String, String, String, Option<String>, Option<String>, i64, String, String, bool);

    let raws: Vec<RawStat> = self
      .conn
      .call(move |conn| {
        let base = "
          SELECT v.visit_date, e.name, au.name, d.name, a.name,
                 vis.id, vis.first_name, vis.last_name,
                 v.exit_at IS NULL
          FROM visits v
          JOIN visitors vis ON vis.id = v.visitor_id
          JOIN entities e   ON e.id = v.entity_id
          JOIN administrative_units au ON au.id = v.administrative_unit_id
          LEFT JOIN directions d ON d.id = v.direction_id
          LEFT JOIN areas a      ON a.id = v.area_id";

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<RawStat> {
          Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
            row.get(8)?,
          ))
        };

        let rows = match &lower {
          Some(bound) => {
            let sql = format!("{base} WHERE v.visit_date >= ?1");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
              .query_map(rusqlite::params![bound], map_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
          }
          None => {
            let mut stmt = conn.prepare(base)?;
            let rows = stmt
              .query_map([], map_row)?
              .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
          }
        };
        Ok(rows)
      })
      .await?;

    let rows: Vec<StatRow> = raws
      .into_iter()
      .map(
        |(date, entity, unit, direction, area, visitor_id, first, last, active)| {
          Ok(StatRow {
            visit_date: crate::encode::decode_date(&date)?,
            entity_name: entity,
            unit_name: unit,
            direction_name: direction,
            area_name: area,
            visitor_id,
            visitor_name: format!("{first} {last}"),
            active,
          })
        },
      )
      .collect::<Result<_>>()?;

    Ok(dashboard::compute_stats(&rows, metric))
  }

  // ── Administrative deletes ────────────────────────────────────────────────

  async fn delete_visitor(&self, visitor_id: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        delete_visitor_rows(&tx, visitor_id)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_visitors(&self, visitor_ids: Vec<i64>) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for visitor_id in visitor_ids {
          delete_visitor_rows(&tx, visitor_id)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let user = input.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO users
             (username, password_hash, first_name, last_name, role)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            input.username,
            input.password_hash,
            input.first_name,
            input.last_name,
            input.role.as_str(),
          ],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(id.map(|id| User {
      id,
      username: user.username,
      first_name: user.first_name,
      last_name: user.last_name,
      role: user.role,
    }))
  }

  async fn find_user(&self, username: &str) -> Result<Option<UserRecord>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, username, password_hash, first_name, last_name, role
               FROM users WHERE username = ?1",
              rusqlite::params![username],
              |row| {
                Ok(RawUser {
                  id:            row.get(0)?,
                  username:      row.get(1)?,
                  password_hash: row.get(2)?,
                  first_name:    row.get(3)?,
                  last_name:     row.get(4)?,
                  role:          row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_record).transpose()
  }
}
