//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use garita_core::{
  dashboard::{Metric, TimeRange},
  hierarchy::{AreaParent, WideId},
  store::VisitStore,
  validate::{ValidatedVisit, VehicleSpec},
  visit::VisitType,
  visitor::{NewUser, Role},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory().await.expect("in-memory store");
  s.seed_reference_data().await.expect("seed");
  s
}

fn pedestrian(dni: i64) -> ValidatedVisit {
  ValidatedVisit {
    id_type_id: 1,
    dni,
    first_name: "Ana".into(),
    last_name: "Pérez".into(),
    contact_prefix_id: 1,
    contact_number: "5551234".into(),
    company_name: "Acme C.A.".into(),
    company_rif: "J-12345678-9".into(),
    visit_type: VisitType::Pedestrian,
    entity_id: 1,
    administrative_unit_id: WideId::new(860000000000),
    direction_id: None,
    area_id: None,
    visit_date: Utc::now().date_naive(),
    visit_hour: Some("09:30".into()),
    reason: "Reunión".into(),
    vehicle: None,
  }
}

fn vehicular(dni: i64) -> ValidatedVisit {
  ValidatedVisit {
    visit_type: VisitType::Vehicular,
    vehicle: Some(VehicleSpec {
      plate: "AB123CD".into(),
      model: "Corolla".into(),
      brand: Some("Toyota".into()),
      color: None,
    }),
    ..pedestrian(dni)
  }
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn seeded_hierarchy_is_readable() {
  let s = store().await;

  let entities = s.list_entities().await.unwrap();
  assert_eq!(entities.len(), 2);
  assert_eq!(entities[0].name, "MIDME");

  let units = s.list_administrative_units(1).await.unwrap();
  assert_eq!(units.len(), 8);

  let directions = s
    .list_directions(WideId::new(860003000000))
    .await
    .unwrap();
  assert_eq!(directions.len(), 2);

  assert_eq!(s.list_id_types().await.unwrap().len(), 3);
  assert_eq!(s.list_contact_prefixes().await.unwrap().len(), 5);
}

#[tokio::test]
async fn seeding_twice_is_idempotent() {
  let s = store().await;
  s.seed_reference_data().await.unwrap();
  assert_eq!(s.list_entities().await.unwrap().len(), 2);
}

#[tokio::test]
async fn unit_areas_include_direction_areas() {
  let s = store().await;

  // 860009000000 has no areas of its own, but its direction
  // 860009010000 carries two.
  let areas = s
    .list_areas(AreaParent::Unit(WideId::new(860009000000)))
    .await
    .unwrap();
  assert_eq!(areas.len(), 2);
  assert!(areas.iter().all(|a| a.direction_id.is_some()));

  // A unit with direct areas only.
  let areas = s
    .list_areas(AreaParent::Unit(WideId::new(860005000000)))
    .await
    .unwrap();
  assert_eq!(areas.len(), 2);
  assert!(areas.iter().all(|a| a.administrative_unit_id.is_some()));
}

#[tokio::test]
async fn direction_areas_are_scoped_to_the_direction() {
  let s = store().await;
  let areas = s
    .list_areas(AreaParent::Direction(WideId::new(860001000000)))
    .await
    .unwrap();
  assert_eq!(areas.len(), 2);
}

// ─── Registration ────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_pedestrian_visit() {
  let s = store().await;

  let reg = s.register_visit(pedestrian(12345678)).await.unwrap();
  assert_eq!(reg.visitor.dni, 12345678);
  assert_eq!(reg.company.rif, "J-12345678-9");
  assert!(reg.vehicle.is_none());
  assert!(reg.visit.vehicle_id.is_none());
  assert!(reg.visit.is_active());
}

#[tokio::test]
async fn register_vehicular_visit_creates_vehicle() {
  let s = store().await;

  let reg = s.register_visit(vehicular(12345678)).await.unwrap();
  let vehicle = reg.vehicle.unwrap();
  assert_eq!(vehicle.plate, "AB123CD");
  assert_eq!(vehicle.brand.as_deref(), Some("Toyota"));
  assert_eq!(reg.visit.vehicle_id, Some(vehicle.id));
  assert_eq!(reg.visit.visit_type, VisitType::Vehicular);
}

#[tokio::test]
async fn returning_visitor_is_not_duplicated() {
  let s = store().await;

  let first = s.register_visit(pedestrian(12345678)).await.unwrap();
  let second = s.register_visit(pedestrian(12345678)).await.unwrap();

  assert_eq!(first.visitor.id, second.visitor.id);
  assert_ne!(first.visit.id, second.visit.id);
}

#[tokio::test]
async fn returning_visitor_keeps_first_write_fields() {
  let s = store().await;

  let first = s.register_visit(pedestrian(12345678)).await.unwrap();

  let mut request = pedestrian(12345678);
  request.first_name = "Otra".into();
  request.last_name = "Persona".into();
  request.contact_number = "9990000".into();
  let second = s.register_visit(request).await.unwrap();

  // The existing row wins; name/contact fields on the request are ignored.
  assert_eq!(second.visitor.id, first.visitor.id);
  assert_eq!(second.visitor.first_name, "Ana");
  assert_eq!(second.visitor.last_name, "Pérez");
  assert_eq!(second.visitor.contact_number, "5551234");
}

#[tokio::test]
async fn same_dni_different_id_type_is_a_new_visitor() {
  let s = store().await;

  let first = s.register_visit(pedestrian(12345678)).await.unwrap();
  let mut request = pedestrian(12345678);
  request.id_type_id = 2;
  let second = s.register_visit(request).await.unwrap();

  assert_ne!(first.visitor.id, second.visitor.id);
}

#[tokio::test]
async fn company_is_deduplicated_by_rif() {
  let s = store().await;

  let first = s.register_visit(pedestrian(12345678)).await.unwrap();
  let mut request = pedestrian(87654321);
  request.company_name = "Acme renombrada".into();
  let second = s.register_visit(request).await.unwrap();

  // Same tax id resolves to the existing row, name untouched.
  assert_eq!(first.company.id, second.company.id);
  assert_eq!(second.company.name, "Acme C.A.");
}

#[tokio::test]
async fn failed_registration_leaves_no_partial_rows() {
  let s = store().await;

  // Entity 99 is not seeded, so the visit insert fails its foreign-key
  // check after the visitor and company steps have already run.
  let mut request = vehicular(12345678);
  request.entity_id = 99;
  assert!(s.register_visit(request).await.is_err());

  assert!(s.find_visitor_history(12345678).await.unwrap().is_none());
  assert!(s.list_visits().await.unwrap().is_empty());

  // The rolled-back identity does not shadow a later registration.
  let reg = s.register_visit(pedestrian(12345678)).await.unwrap();
  assert_eq!(reg.visitor.first_name, "Ana");
}

// ─── Listing and history ─────────────────────────────────────────────────────

#[tokio::test]
async fn list_visits_is_newest_first() {
  let s = store().await;

  let first = s.register_visit(pedestrian(11111111)).await.unwrap();
  let second = s.register_visit(pedestrian(22222222)).await.unwrap();

  let records = s.list_visits().await.unwrap();
  assert_eq!(records.len(), 2);
  assert_eq!(records[0].visit.id, second.visit.id);
  assert_eq!(records[1].visit.id, first.visit.id);
  assert_eq!(records[0].entity_name, "MIDME");
  assert_eq!(records[0].company_name.as_deref(), Some("Acme C.A."));
}

#[tokio::test]
async fn history_returns_none_for_unknown_dni() {
  let s = store().await;
  assert!(s.find_visitor_history(99999999).await.unwrap().is_none());
}

#[tokio::test]
async fn history_is_capped_at_five_visits() {
  let s = store().await;

  for _ in 0..6 {
    s.register_visit(pedestrian(12345678)).await.unwrap();
  }

  let history = s.find_visitor_history(12345678).await.unwrap().unwrap();
  assert_eq!(history.visitor.dni, 12345678);
  assert_eq!(history.company_name.as_deref(), Some("Acme C.A."));
  assert_eq!(history.visits.len(), 5);
}

// ─── Exit marking ────────────────────────────────────────────────────────────

#[tokio::test]
async fn mark_exit_closes_the_visit() {
  let s = store().await;
  let reg = s.register_visit(pedestrian(12345678)).await.unwrap();

  let closed = s.mark_exit(reg.visit.id).await.unwrap();
  assert!(closed.exit_at.is_some());
  assert!(!closed.is_active());
}

#[tokio::test]
async fn mark_exit_overwrites_a_previous_exit() {
  let s = store().await;
  let reg = s.register_visit(pedestrian(12345678)).await.unwrap();

  let first = s.mark_exit(reg.visit.id).await.unwrap();
  let second = s.mark_exit(reg.visit.id).await.unwrap();
  assert!(second.exit_at.unwrap() >= first.exit_at.unwrap());
}

#[tokio::test]
async fn mark_exit_unknown_visit_fails() {
  let s = store().await;
  let err = s.mark_exit(4242).await.unwrap_err();
  assert!(matches!(err, Error::VisitNotFound(4242)));
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_totals_and_entity_series() {
  let s = store().await;

  let reg = s.register_visit(pedestrian(11111111)).await.unwrap();
  s.register_visit(pedestrian(11111111)).await.unwrap();
  s.register_visit(pedestrian(22222222)).await.unwrap();
  s.mark_exit(reg.visit.id).await.unwrap();

  let out = s
    .dashboard_stats(TimeRange::Day, Metric::Entities)
    .await
    .unwrap();
  assert_eq!(out.stats.total_visits, 3);
  assert_eq!(out.stats.active_visits, 2);
  assert_eq!(out.stats.unique_visitors, 2);

  let sum: u64 = out.charts.main.iter().map(|p| p.count).sum();
  assert_eq!(sum, 3);
  assert_eq!(out.charts.by_entity[0].label, "MIDME");
}

#[tokio::test]
async fn dashboard_all_range_is_unbounded() {
  let s = store().await;

  let mut request = pedestrian(11111111);
  request.visit_date = "2020-01-01".parse().unwrap();
  s.register_visit(request).await.unwrap();

  let day = s
    .dashboard_stats(TimeRange::Day, Metric::Visits)
    .await
    .unwrap();
  assert_eq!(day.stats.total_visits, 0);

  let all = s
    .dashboard_stats(TimeRange::All, Metric::Visits)
    .await
    .unwrap();
  assert_eq!(all.stats.total_visits, 1);
}

// ─── Deletes ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_visitor_removes_visits_and_history() {
  let s = store().await;

  let reg = s.register_visit(vehicular(12345678)).await.unwrap();
  s.delete_visitor(reg.visitor.id).await.unwrap();

  assert!(s.find_visitor_history(12345678).await.unwrap().is_none());
  assert!(s.list_visits().await.unwrap().is_empty());
}

#[tokio::test]
async fn bulk_delete_skips_unknown_ids() {
  let s = store().await;

  let a = s.register_visit(pedestrian(11111111)).await.unwrap();
  let b = s.register_visit(pedestrian(22222222)).await.unwrap();

  s.delete_visitors(vec![a.visitor.id, b.visitor.id, 9999])
    .await
    .unwrap();
  assert!(s.list_visits().await.unwrap().is_empty());
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_user() {
  let s = store().await;

  let user = s
    .create_user(NewUser {
      username: "porteria1".into(),
      password_hash: "$argon2id$fake".into(),
      first_name: "Luis".into(),
      last_name: "Gómez".into(),
      role: Role::Operator,
    })
    .await
    .unwrap()
    .expect("username free");
  assert_eq!(user.role, Role::Operator);

  let found = s.find_user("porteria1").await.unwrap().unwrap();
  assert_eq!(found.user.id, user.id);
  assert_eq!(found.password_hash, "$argon2id$fake");

  assert!(s.find_user("nadie").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;

  let new_user = || NewUser {
    username: "porteria1".into(),
    password_hash: "$argon2id$fake".into(),
    first_name: "Luis".into(),
    last_name: "Gómez".into(),
    role: Role::Admin,
  };

  assert!(s.create_user(new_user()).await.unwrap().is_some());
  assert!(s.create_user(new_user()).await.unwrap().is_none());
}
