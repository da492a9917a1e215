// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly aggregation.
//!
//! Two read modes produce the same numbers for a caught-up week:
//! - [`WeeklyGrid::from_records`] trusts the persisted weekly records
//! - [`recompute_week`] rebuilds one user's week from raw workouts
//!
//! Neither mode writes anything. A week without a persisted record reads as
//! zero.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{WeekBucket, WeeklyRecord, WeeklyTotals, WorkoutEvent, WorkoutKind};
use crate::services::classifier::WorkoutClassifier;
use crate::services::dedup::{collapse_weekly_records, count_strength_sessions};
use crate::services::weeks::canonical_monday;
use crate::time_utils::CivilClock;

/// Points a single event may contribute. Negative or non-finite values
/// contribute nothing.
fn countable_points(event: &WorkoutEvent) -> f64 {
    if event.points.is_finite() && event.points > 0.0 {
        event.points
    } else {
        0.0
    }
}

// Persisted totals are float sums written by another process.
const POINTS_TOLERANCE: f64 = 1e-6;

/// Whether two totals describe the same week.
pub fn totals_agree(a: &WeeklyTotals, b: &WeeklyTotals) -> bool {
    a.strength_sessions_count == b.strength_sessions_count
        && (a.cardio_points_total - b.cardio_points_total).abs() < POINTS_TOLERANCE
}

/// Totals for all events (any user) whose civil day falls inside `window`.
pub fn aggregate(
    events: &[WorkoutEvent],
    window: &WeekBucket,
    classifier: &WorkoutClassifier,
    clock: &CivilClock,
) -> WeeklyTotals {
    let in_window: Vec<&WorkoutEvent> = events
        .iter()
        .filter(|e| window.contains(clock.civil_date(e.timestamp)))
        .collect();

    let cardio_points_total = in_window
        .iter()
        .filter(|e| classifier.classify(&e.category_id) == WorkoutKind::Cardio)
        .map(|e| countable_points(e))
        .sum();

    let strength_sessions_count =
        count_strength_sessions(in_window.iter().copied(), classifier, clock) as u32;

    WeeklyTotals {
        cardio_points_total,
        strength_sessions_count,
    }
}

/// One user's totals for one challenge week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekCell {
    pub week_number: u32,
    /// Canonical persisted record for this week, if any
    pub weekly_record_id: Option<String>,
    #[serde(flatten)]
    pub totals: WeeklyTotals,
}

/// Per-user, per-week totals read from persisted weekly records.
#[derive(Debug, Clone, Default)]
pub struct WeeklyGrid {
    weeks: Vec<WeekBucket>,
    cells: HashMap<String, BTreeMap<u32, WeekCell>>,
}

impl WeeklyGrid {
    /// Collapse duplicate records and place each canonical record in its
    /// challenge week. Records outside the challenge weeks are ignored.
    pub fn from_records(records: Vec<WeeklyRecord>, weeks: &[WeekBucket]) -> Self {
        let week_by_monday: HashMap<NaiveDate, u32> = weeks
            .iter()
            .map(|w| (canonical_monday(w.start_date), w.week_number))
            .collect();

        let mut cells: HashMap<String, BTreeMap<u32, WeekCell>> = HashMap::new();
        let mut outside = 0usize;

        for record in collapse_weekly_records(records) {
            let Some(&week_number) = week_by_monday.get(&canonical_monday(record.start_date))
            else {
                outside += 1;
                continue;
            };

            cells.entry(record.user_id.clone()).or_default().insert(
                week_number,
                WeekCell {
                    week_number,
                    weekly_record_id: Some(record.id.clone()),
                    totals: record.totals(),
                },
            );
        }

        if outside > 0 {
            tracing::debug!(outside, "Ignored weekly records outside challenge weeks");
        }

        Self {
            weeks: weeks.to_vec(),
            cells,
        }
    }

    pub fn weeks(&self) -> &[WeekBucket] {
        &self.weeks
    }

    /// Cell for one user and week; zero totals when nothing was persisted.
    pub fn cell(&self, user_id: &str, week_number: u32) -> WeekCell {
        self.cells
            .get(user_id)
            .and_then(|by_week| by_week.get(&week_number))
            .cloned()
            .unwrap_or(WeekCell {
                week_number,
                weekly_record_id: None,
                totals: WeeklyTotals::default(),
            })
    }

    /// One cell per challenge week, in week order.
    pub fn user_cells(&self, user_id: &str) -> Vec<WeekCell> {
        self.weeks
            .iter()
            .map(|w| self.cell(user_id, w.week_number))
            .collect()
    }

    /// Sum over all challenge weeks.
    pub fn cumulative(&self, user_id: &str) -> WeeklyTotals {
        let mut total = WeeklyTotals::default();
        if let Some(by_week) = self.cells.get(user_id) {
            for cell in by_week.values() {
                total.accumulate(&cell.totals);
            }
        }
        total
    }
}

/// Activity on a single civil day, as recomputed from raw workouts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBreakdown {
    pub date: NaiveDate,
    pub cardio_points: f64,
    pub cardio_workouts: u32,
    pub strength_workouts: u32,
    /// Whether this day credits a strength session
    pub strength_session: bool,
    /// Workouts whose category could not be classified
    pub unclassified_workouts: u32,
}

impl DayBreakdown {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            cardio_points: 0.0,
            cardio_workouts: 0,
            strength_workouts: 0,
            strength_session: false,
            unclassified_workouts: 0,
        }
    }
}

/// Result of recomputing one user's week from raw workouts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRecompute {
    pub totals: WeeklyTotals,
    /// One entry per civil day in the window, in date order
    pub days: Vec<DayBreakdown>,
}

/// Recompute one user's totals for `window` from raw workouts.
pub fn recompute_week(
    user_id: &str,
    events: &[WorkoutEvent],
    window: &WeekBucket,
    classifier: &WorkoutClassifier,
    clock: &CivilClock,
) -> WeekRecompute {
    let mine: Vec<WorkoutEvent> = events
        .iter()
        .filter(|e| e.user_id == user_id)
        .cloned()
        .collect();

    let mut days: BTreeMap<NaiveDate, DayBreakdown> = window
        .start_date
        .iter_days()
        .take_while(|d| *d <= window.end_date)
        .map(|d| (d, DayBreakdown::empty(d)))
        .collect();

    for event in &mine {
        let Some(day) = days.get_mut(&clock.civil_date(event.timestamp)) else {
            continue;
        };
        match classifier.classify(&event.category_id) {
            WorkoutKind::Cardio => {
                day.cardio_points += countable_points(event);
                day.cardio_workouts += 1;
            }
            WorkoutKind::Strength => {
                day.strength_workouts += 1;
                day.strength_session = true;
            }
            WorkoutKind::Unknown => {
                tracing::debug!(
                    workout_id = %event.id,
                    category_id = %event.category_id,
                    "Skipping unclassified workout"
                );
                day.unclassified_workouts += 1;
            }
        }
    }

    WeekRecompute {
        totals: aggregate(&mine, window, classifier, clock),
        days: days.into_values().collect(),
    }
}
