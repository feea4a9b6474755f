//! SQL schema for the Garita SQLite store.
//!
//! Executed once at connection startup. The UNIQUE constraints on
//! (id_type_id, dni), companies.rif and visitor↔company pairs are the
//! backstop for the find-or-create paths: a concurrent insert that slips
//! past the lookup fails the constraint and the transaction re-fetches.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Location hierarchy (seeded, read-only) ──────────────────────────────

CREATE TABLE IF NOT EXISTS entities (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE
);

-- Hierarchy ids are externally assigned 64-bit codes, never auto-increment.
CREATE TABLE IF NOT EXISTS administrative_units (
    id         INTEGER PRIMARY KEY,
    name       TEXT NOT NULL,
    entity_id  INTEGER NOT NULL REFERENCES entities(id)
);

CREATE TABLE IF NOT EXISTS directions (
    id                      INTEGER PRIMARY KEY,
    name                    TEXT NOT NULL,
    administrative_unit_id  INTEGER NOT NULL REFERENCES administrative_units(id)
);

-- An area hangs off exactly one unit or exactly one direction.
CREATE TABLE IF NOT EXISTS areas (
    id                      INTEGER PRIMARY KEY,
    name                    TEXT NOT NULL,
    administrative_unit_id  INTEGER REFERENCES administrative_units(id),
    direction_id            INTEGER REFERENCES directions(id),
    CHECK ((administrative_unit_id IS NULL) != (direction_id IS NULL))
);

CREATE TABLE IF NOT EXISTS id_types (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    abbreviation  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS contact_prefixes (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    code  TEXT NOT NULL UNIQUE
);

-- ── Identities ──────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS visitors (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    id_type_id         INTEGER NOT NULL REFERENCES id_types(id),
    dni                INTEGER NOT NULL,
    first_name         TEXT NOT NULL,
    last_name          TEXT NOT NULL,
    contact_prefix_id  INTEGER NOT NULL REFERENCES contact_prefixes(id),
    contact_number     TEXT NOT NULL,
    created_at         TEXT NOT NULL,
    UNIQUE (id_type_id, dni)
);

CREATE TABLE IF NOT EXISTS companies (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL,
    rif   TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS visitor_companies (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    visitor_id  INTEGER NOT NULL REFERENCES visitors(id),
    company_id  INTEGER NOT NULL REFERENCES companies(id),
    UNIQUE (visitor_id, company_id)
);

-- Vehicles are created fresh per vehicular visit; no plate dedup.
CREATE TABLE IF NOT EXISTS vehicles (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    plate  TEXT NOT NULL,
    model  TEXT NOT NULL,
    brand  TEXT,
    color  TEXT
);

-- ── Visits ──────────────────────────────────────────────────────────────

-- exit_at is the only column ever updated after insert.
CREATE TABLE IF NOT EXISTS visits (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    visitor_id              INTEGER NOT NULL REFERENCES visitors(id),
    visit_type              INTEGER NOT NULL,   -- 1 pedestrian | 2 vehicular
    entity_id               INTEGER NOT NULL REFERENCES entities(id),
    administrative_unit_id  INTEGER NOT NULL REFERENCES administrative_units(id),
    direction_id            INTEGER REFERENCES directions(id),
    area_id                 INTEGER REFERENCES areas(id),
    visit_date              TEXT NOT NULL,      -- ISO 8601 date
    visit_hour              TEXT,
    exit_at                 TEXT,               -- NULL while on-site
    reason                  TEXT NOT NULL,
    vehicle_id              INTEGER REFERENCES vehicles(id),
    created_at              TEXT NOT NULL,
    updated_at              TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS visits_visitor_idx ON visits(visitor_id);
CREATE INDEX IF NOT EXISTS visits_date_idx    ON visits(visit_date);

-- ── Users ───────────────────────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    username       TEXT NOT NULL UNIQUE,
    password_hash  TEXT NOT NULL,   -- argon2 PHC string
    first_name     TEXT NOT NULL,
    last_name      TEXT NOT NULL,
    role           TEXT NOT NULL    -- 'ADMIN' | 'OPERATOR'
);

PRAGMA user_version = 1;
";
