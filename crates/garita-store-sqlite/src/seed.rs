//! Reference-data fixture: the location hierarchy, id types and contact
//! prefixes, loaded once at provisioning time.
//!
//! Inserts use `INSERT OR IGNORE` so seeding is idempotent and safe to run
//! at every startup against an existing database.

use crate::{Result, store::SqliteStore};

// (id, name)
const ENTITIES: &[(i64, &str)] = &[(1, "MIDME"), (2, "CVM")];

// (id, name, entity_id) — ids are the externally assigned 12-digit codes.
const ADMINISTRATIVE_UNITS: &[(i64, &str, i64)] = &[
  (860000000000, "Despacho del Ministro o la Ministra de Desarrollo Minero Ecológico", 1),
  (860100000000, "Despacho del Viceministro de Exploración e Inversión Ecominera", 1),
  (860200000000, "Despacho del Viceministro de Seguimiento y Control del Desarrollo Ecominero", 1),
  (860003000000, "Consultoría Jurídica", 1),
  (860005000000, "Oficina de Atención Ciudadana", 1),
  (860006000000, "Oficina de Gestión Comunicacional", 1),
  (860009000000, "Oficina de Gestión Administrativa", 1),
  (860010000000, "Oficina de las Tecnologías de la Información y Comunicación", 1),
];

// (id, name, administrative_unit_id)
const DIRECTIONS: &[(i64, &str, i64)] = &[
  (860001000000, "Dirección General del Despacho", 860000000000),
  (860003010000, "Dirección de Línea de Asesoría Jurídica", 860003000000),
  (860003020000, "Dirección de Línea de Recursos Administrativos y Litigio", 860003000000),
  (860006020000, "Dirección de Línea de Prensa", 860006000000),
  (860009010000, "Dirección de Línea de Seguridad y Transporte", 860009000000),
  (860201000000, "Dirección General de la Gestión Productiva de la Pequeña Minería", 860200000000),
];

// (id, name, administrative_unit_id, direction_id) — exactly one parent set.
const AREAS: &[(i64, &str, Option<i64>, Option<i64>)] = &[
  (860001000100, "Área de Trabajo de Secretaría General", None, Some(860001000000)),
  (860001000200, "Área de Trabajo de Administración y Logística", None, Some(860001000000)),
  (860003010100, "Área de Trabajo de Doctrinas y Opiniones Jurídicas", None, Some(860003010000)),
  (860005000100, "Área de Trabajo de Atención Social", Some(860005000000), None),
  (860005000200, "Área de Trabajo de Participación Ciudadana", Some(860005000000), None),
  (860009010100, "Área de Trabajo de Seguridad", None, Some(860009010000)),
  (860009010200, "Área de Trabajo de Transporte", None, Some(860009010000)),
  (860010000300, "Área de Trabajo de Seguridad de la Información", Some(860010000000), None),
  (860010000400, "Área de Trabajo de Atención Tecnológica Integral", Some(860010000000), None),
  (860201000100, "Área de Trabajo de Gestión Técnica", None, Some(860201000000)),
];

// (id, name, abbreviation)
const ID_TYPES: &[(i64, &str, &str)] = &[
  (1, "Venezolano", "V"),
  (2, "Extranjero", "E"),
  (3, "Pasaporte", "P"),
];

// (id, code)
const CONTACT_PREFIXES: &[(i64, &str)] = &[
  (1, "0412"),
  (2, "0414"),
  (3, "0416"),
  (4, "0424"),
  (5, "0426"),
];

impl SqliteStore {
  /// Load the reference dataset into an initialised store.
  pub async fn seed_reference_data(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;

        for (id, name) in ENTITIES {
          tx.execute(
            "INSERT OR IGNORE INTO entities (id, name) VALUES (?1, ?2)",
            rusqlite::params![id, name],
          )?;
        }

        for (id, name, entity_id) in ADMINISTRATIVE_UNITS {
          tx.execute(
            "INSERT OR IGNORE INTO administrative_units (id, name, entity_id)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![id, name, entity_id],
          )?;
        }

        for (id, name, unit_id) in DIRECTIONS {
          tx.execute(
            "INSERT OR IGNORE INTO directions (id, name, administrative_unit_id)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![id, name, unit_id],
          )?;
        }

        for (id, name, unit_id, direction_id) in AREAS {
          tx.execute(
            "INSERT OR IGNORE INTO areas
               (id, name, administrative_unit_id, direction_id)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, name, unit_id, direction_id],
          )?;
        }

        for (id, name, abbreviation) in ID_TYPES {
          tx.execute(
            "INSERT OR IGNORE INTO id_types (id, name, abbreviation)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![id, name, abbreviation],
          )?;
        }

        for (id, code) in CONTACT_PREFIXES {
          tx.execute(
            "INSERT OR IGNORE INTO contact_prefixes (id, code) VALUES (?1, ?2)",
            rusqlite::params![id, code],
          )?;
        }

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
