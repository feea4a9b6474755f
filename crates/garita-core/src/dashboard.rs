//! Dashboard aggregation: time-range bucketing and group-counts.
//!
//! The store fetches one [`StatRow`] per visit inside the selected time
//! range; everything else is computed here so the grouping logic stays
//! independent of SQL.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel label for visits whose grouping dimension is absent
/// (no direction or no area on the visit).
const NONE_LABEL: &str = "none";

// ─── Query parameters ────────────────────────────────────────────────────────

/// Lower-bound selector on the visit date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
  Day,
  Week,
  Month,
  #[default]
  All,
}

impl TimeRange {
  /// Earliest visit date included, or `None` for an unbounded range.
  pub fn lower_bound(self, now: DateTime<Utc>) -> Option<NaiveDate> {
    match self {
      TimeRange::Day => Some(now.date_naive()),
      TimeRange::Week => Some((now - Duration::days(7)).date_naive()),
      TimeRange::Month => Some(
        now
          .date_naive()
          .checked_sub_months(Months::new(1))
          .unwrap_or(NaiveDate::MIN),
      ),
      TimeRange::All => None,
    }
  }
}

/// Grouping dimension for the main chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
  #[default]
  Visits,
  Entities,
  Directions,
  Departments,
  Areas,
}

// ─── Inputs and outputs ──────────────────────────────────────────────────────

/// One visit flattened to the attributes the dashboard groups on.
#[derive(Debug, Clone)]
pub struct StatRow {
  pub visit_date:   NaiveDate,
  pub entity_name:  String,
  pub unit_name:    String,
  pub direction_name: Option<String>,
  pub area_name:      Option<String>,
  pub visitor_id:   i64,
  pub visitor_name: String,
  /// Exit timestamp not yet recorded.
  pub active:       bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
  pub label: String,
  pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
  pub total_visits:    u64,
  pub active_visits:   u64,
  pub unique_visitors: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
  /// Group-count for the requested [`Metric`], descending by count.
  pub main: Vec<ChartPoint>,
  pub by_entity: Vec<ChartPoint>,
  pub by_unit:   Vec<ChartPoint>,
  /// Top 5 most frequent visitors by full name.
  pub top_visitors: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
  pub stats:  Totals,
  pub charts: Charts,
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Count occurrences per label, sorted descending by count. Ties break on
/// label order so the output is stable.
fn tally<I: IntoIterator<Item = String>>(labels: I) -> Vec<ChartPoint> {
  let mut counts: HashMap<String, u64> = HashMap::new();
  for label in labels {
    *counts.entry(label).or_default() += 1;
  }

  let mut points: Vec<ChartPoint> = counts
    .into_iter()
    .map(|(label, count)| ChartPoint { label, count })
    .collect();
  points.sort_by(|a, b| b.count.cmp(&a.count).then(a.label.cmp(&b.label)));
  points
}

/// Compute the full dashboard payload for visits already restricted to the
/// requested time range.
pub fn compute_stats(rows: &[StatRow], metric: Metric) -> DashboardStats {
  let unique_visitors = rows
    .iter()
    .map(|r| r.visitor_id)
    .collect::<std::collections::HashSet<_>>()
    .len() as u64;

  let stats = Totals {
    total_visits: rows.len() as u64,
    active_visits: rows.iter().filter(|r| r.active).count() as u64,
    unique_visitors,
  };

  let main = match metric {
    Metric::Visits => tally(rows.iter().map(|r| r.visit_date.to_string())),
    Metric::Entities => tally(rows.iter().map(|r| r.entity_name.clone())),
    Metric::Directions => tally(rows.iter().map(|r| {
      r.direction_name
        .clone()
        .unwrap_or_else(|| NONE_LABEL.to_string())
    })),
    Metric::Departments => tally(rows.iter().map(|r| r.unit_name.clone())),
    Metric::Areas => tally(
      rows
        .iter()
        .map(|r| r.area_name.clone().unwrap_or_else(|| NONE_LABEL.to_string())),
    ),
  };

  let mut top_visitors = tally(rows.iter().map(|r| r.visitor_name.clone()));
  top_visitors.truncate(5);

  DashboardStats {
    stats,
    charts: Charts {
      main,
      by_entity: tally(rows.iter().map(|r| r.entity_name.clone())),
      by_unit: tally(rows.iter().map(|r| r.unit_name.clone())),
      top_visitors,
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn row(date: &str, entity: &str, visitor: i64, active: bool) -> StatRow {
    StatRow {
      visit_date: date.parse().unwrap(),
      entity_name: entity.to_string(),
      unit_name: "Despacho".to_string(),
      direction_name: None,
      area_name: None,
      visitor_id: visitor,
      visitor_name: format!("Visitor {visitor}"),
      active,
    }
  }

  #[test]
  fn totals_count_visits_active_and_unique() {
    let rows = vec![
      row("2026-08-30", "MIDME", 1, true),
      row("2026-08-30", "MIDME", 1, false),
      row("2026-08-29", "CVM", 2, true),
    ];

    let stats = compute_stats(&rows, Metric::Visits).stats;
    assert_eq!(stats.total_visits, 3);
    assert_eq!(stats.active_visits, 2);
    assert_eq!(stats.unique_visitors, 2);
  }

  #[test]
  fn entity_series_sums_to_total() {
    let rows = vec![
      row("2026-08-30", "MIDME", 1, true),
      row("2026-08-30", "MIDME", 2, true),
      row("2026-08-30", "CVM", 3, false),
    ];

    let out = compute_stats(&rows, Metric::Entities);
    let sum: u64 = out.charts.main.iter().map(|p| p.count).sum();
    assert_eq!(sum, out.stats.total_visits);
    // descending by count
    assert_eq!(out.charts.main[0].label, "MIDME");
    assert_eq!(out.charts.main[0].count, 2);
  }

  #[test]
  fn missing_direction_groups_under_none() {
    let rows = vec![row("2026-08-30", "MIDME", 1, true)];
    let out = compute_stats(&rows, Metric::Directions);
    assert_eq!(out.charts.main[0].label, "none");
  }

  #[test]
  fn top_visitors_capped_at_five() {
    let rows: Vec<StatRow> = (1..=7)
      .map(|i| row("2026-08-30", "MIDME", i, false))
      .collect();
    let out = compute_stats(&rows, Metric::Visits);
    assert_eq!(out.charts.top_visitors.len(), 5);
  }

  #[test]
  fn ties_break_on_label_for_stable_output() {
    let rows = vec![
      row("2026-08-30", "B", 1, false),
      row("2026-08-30", "A", 2, false),
    ];
    let out = compute_stats(&rows, Metric::Entities);
    assert_eq!(out.charts.main[0].label, "A");
    assert_eq!(out.charts.main[1].label, "B");
  }

  #[test]
  fn time_range_bounds() {
    let now: DateTime<Utc> = "2026-08-30T12:00:00Z".parse().unwrap();

    assert_eq!(
      TimeRange::Day.lower_bound(now),
      Some("2026-08-30".parse().unwrap())
    );
    assert_eq!(
      TimeRange::Week.lower_bound(now),
      Some("2026-08-23".parse().unwrap())
    );
    assert_eq!(
      TimeRange::Month.lower_bound(now),
      Some("2026-07-30".parse().unwrap())
    );
    assert_eq!(TimeRange::All.lower_bound(now), None);
  }
}
