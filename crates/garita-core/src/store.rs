//! The `VisitStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `garita-store-sqlite`).
//! The HTTP layer (`garita-api`) depends on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  dashboard::{DashboardStats, Metric, TimeRange},
  hierarchy::{
    AdministrativeUnit, Area, AreaParent, ContactPrefix, Direction, Entity,
    IdType, WideId,
  },
  validate::ValidatedVisit,
  visit::{Registration, Visit, VisitRecord, VisitorHistory},
  visitor::{NewUser, User, UserRecord},
};

/// Abstraction over a Garita storage backend.
///
/// Reference data (the location hierarchy, id types, contact prefixes) is
/// seeded once and read-only. `register_visit` is the only multi-row write
/// and must be atomic: every sub-operation commits or none do.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait VisitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Location hierarchy (read-only) ────────────────────────────────────

  fn list_entities(
    &self,
  ) -> impl Future<Output = Result<Vec<Entity>, Self::Error>> + Send + '_;

  fn list_administrative_units(
    &self,
    entity_id: i64,
  ) -> impl Future<Output = Result<Vec<AdministrativeUnit>, Self::Error>> + Send + '_;

  fn list_directions(
    &self,
    unit_id: WideId,
  ) -> impl Future<Output = Result<Vec<Direction>, Self::Error>> + Send + '_;

  /// For [`AreaParent::Unit`], returns areas directly under the unit plus
  /// areas under that unit's directions; for [`AreaParent::Direction`],
  /// areas of that direction only.
  fn list_areas(
    &self,
    parent: AreaParent,
  ) -> impl Future<Output = Result<Vec<Area>, Self::Error>> + Send + '_;

  fn list_id_types(
    &self,
  ) -> impl Future<Output = Result<Vec<IdType>, Self::Error>> + Send + '_;

  fn list_contact_prefixes(
    &self,
  ) -> impl Future<Output = Result<Vec<ContactPrefix>, Self::Error>> + Send + '_;

  // ── Registration (transactional) ──────────────────────────────────────

  /// Register a visit as one atomic unit: resolve the visitor by
  /// (id type, DNI) and the company by tax id (find-or-create, existing
  /// rows returned unchanged), ensure the visitor↔company association,
  /// insert a vehicle when the validated request carries one, and create
  /// the visit row. Any failure rolls the whole unit back.
  fn register_visit(
    &self,
    request: ValidatedVisit,
  ) -> impl Future<Output = Result<Registration, Self::Error>> + Send + '_;

  // ── Queries ───────────────────────────────────────────────────────────

  /// All visits, newest first, expanded with joined display data.
  fn list_visits(
    &self,
  ) -> impl Future<Output = Result<Vec<VisitRecord>, Self::Error>> + Send + '_;

  /// Visitor detail plus up to 5 most recent visits, or `None` if no
  /// visitor carries this DNI.
  fn find_visitor_history(
    &self,
    dni: i64,
  ) -> impl Future<Output = Result<Option<VisitorHistory>, Self::Error>> + Send + '_;

  /// Set the exit timestamp of a visit to now.
  ///
  /// Deliberately overwrites: calling this on an already-closed visit
  /// replaces the previous exit timestamp without complaint.
  fn mark_exit(
    &self,
    visit_id: i64,
  ) -> impl Future<Output = Result<Visit, Self::Error>> + Send + '_;

  /// Aggregate statistics over visits whose date falls inside `range`.
  fn dashboard_stats(
    &self,
    range: TimeRange,
    metric: Metric,
  ) -> impl Future<Output = Result<DashboardStats, Self::Error>> + Send + '_;

  // ── Administrative deletes ────────────────────────────────────────────

  /// Delete a visitor together with their visits and company associations.
  fn delete_visitor(
    &self,
    visitor_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Bulk variant of [`VisitStore::delete_visitor`]. Unknown ids are
  /// skipped silently.
  fn delete_visitors(
    &self,
    visitor_ids: Vec<i64>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create a user, or return `None` when the username is already taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send + 'a;
}
