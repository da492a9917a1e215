// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Deduplication rules.
//!
//! Two independent collapses:
//! - strength workouts: at most one credited session per user per civil day
//! - weekly records: at most one row per user per canonical Monday

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::models::{WeeklyRecord, WorkoutEvent, WorkoutKind};
use crate::services::classifier::WorkoutClassifier;
use crate::services::weeks::canonical_monday;
use crate::time_utils::CivilClock;

/// Distinct `(user_id, civil_day)` pairs with at least one strength workout.
pub fn strength_session_days<'a, I>(
    events: I,
    classifier: &WorkoutClassifier,
    clock: &CivilClock,
) -> BTreeSet<(String, NaiveDate)>
where
    I: IntoIterator<Item = &'a WorkoutEvent>,
{
    events
        .into_iter()
        .filter(|e| classifier.classify(&e.category_id) == WorkoutKind::Strength)
        .map(|e| (e.user_id.clone(), clock.civil_date(e.timestamp)))
        .collect()
}

/// Number of credited strength sessions in `events`.
pub fn count_strength_sessions<'a, I>(
    events: I,
    classifier: &WorkoutClassifier,
    clock: &CivilClock,
) -> usize
where
    I: IntoIterator<Item = &'a WorkoutEvent>,
{
    strength_session_days(events, classifier, clock).len()
}

/// Collapse weekly records to one per `(user_id, canonical Monday)`.
///
/// Records are ordered by ascending `start_date` (stable for equal dates) and
/// the first record of each key wins. Duplicates are dropped, never summed.
pub fn collapse_weekly_records(mut records: Vec<WeeklyRecord>) -> Vec<WeeklyRecord> {
    records.sort_by_key(|r| r.start_date);

    let mut seen: HashSet<(String, NaiveDate)> = HashSet::with_capacity(records.len());
    let mut discarded = Vec::new();
    let mut kept = Vec::with_capacity(records.len());

    for record in records {
        let key = (record.user_id.clone(), canonical_monday(record.start_date));
        if seen.insert(key) {
            kept.push(record);
        } else {
            discarded.push(record.id);
        }
    }

    if !discarded.is_empty() {
        tracing::warn!(
            kept = kept.len(),
            discarded = ?discarded,
            "Dropped duplicate weekly records"
        );
    }

    kept
}
