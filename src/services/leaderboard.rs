// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Leaderboard ranking.
//!
//! All sorts are stable: equal scores keep their input order (roster order
//! for points, first-recorded order for benchmarks).

use std::collections::HashMap;

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{BenchmarkRecord, Feedback, WeeklyTotals};
use crate::time_utils::format_utc_rfc3339;

/// Derived score: cardio points plus weighted strength sessions.
pub fn points_for(totals: &WeeklyTotals, strength_session_weight: f64) -> f64 {
    totals.cardio_points_total + f64::from(totals.strength_sessions_count) * strength_session_weight
}

/// One participant's totals going into the points leaderboard.
#[derive(Debug, Clone)]
pub struct LeaderboardInput {
    pub user_id: String,
    pub name: Option<String>,
    pub totals: WeeklyTotals,
    /// Record used for the feedback join (single-week leaderboards only)
    pub weekly_record_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardUser {
    pub name: Option<String>,
    pub strength_workout_count: u32,
}

/// Ranked leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub user: LeaderboardUser,
    pub points: f64,
    pub cardio_points: f64,
    pub weekly_record_id: Option<String>,
    pub feedback: Option<Feedback>,
}

/// Rank participants by derived points, highest first.
///
/// `feedback` is left empty; the caller joins it afterwards.
pub fn rank_by_points(
    inputs: Vec<LeaderboardInput>,
    strength_session_weight: f64,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = inputs
        .into_iter()
        .map(|input| LeaderboardEntry {
            points: points_for(&input.totals, strength_session_weight),
            cardio_points: input.totals.cardio_points_total,
            user: LeaderboardUser {
                name: input.name,
                strength_workout_count: input.totals.strength_sessions_count,
            },
            user_id: input.user_id,
            weekly_record_id: input.weekly_record_id,
            feedback: None,
        })
        .collect();

    entries.sort_by(|a, b| b.points.total_cmp(&a.points));
    entries
}

fn is_better(candidate: f64, current: f64, is_lower_better: bool) -> bool {
    if is_lower_better {
        candidate < current
    } else {
        candidate > current
    }
}

/// Keep each user's single best record.
///
/// Equal values keep the earlier record. The result is in fetch order of the
/// kept records; records with non-finite values are dropped.
pub fn best_records(records: Vec<BenchmarkRecord>, is_lower_better: bool) -> Vec<BenchmarkRecord> {
    let mut best: HashMap<String, (usize, BenchmarkRecord)> = HashMap::new();

    for (position, record) in records.into_iter().enumerate() {
        if !record.value.is_finite() {
            tracing::debug!(record_id = %record.id, "Skipping non-finite benchmark value");
            continue;
        }
        match best.get(&record.user_id) {
            Some((_, current)) if !is_better(record.value, current.value, is_lower_better) => {}
            _ => {
                best.insert(record.user_id.clone(), (position, record));
            }
        }
    }

    let mut kept: Vec<(usize, BenchmarkRecord)> = best.into_values().collect();
    kept.sort_by_key(|(position, _)| *position);
    kept.into_iter().map(|(_, record)| record).collect()
}

/// Ranked benchmark row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRankEntry {
    /// 1-based position
    pub rank: u32,
    pub user_id: String,
    pub user: BenchmarkUser,
    pub record_id: String,
    pub value: f64,
    pub recorded_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkUser {
    pub name: Option<String>,
}

/// Rank each user's best record by value.
///
/// Ascending when lower is better, descending otherwise; ties keep the
/// first-recorded order.
pub fn rank_by_value(
    records: Vec<BenchmarkRecord>,
    is_lower_better: bool,
    names: &HashMap<String, String>,
) -> Vec<BenchmarkRankEntry> {
    let mut best = best_records(records, is_lower_better);
    if is_lower_better {
        best.sort_by(|a, b| a.value.total_cmp(&b.value));
    } else {
        best.sort_by(|a, b| b.value.total_cmp(&a.value));
    }

    best.into_iter()
        .zip(1u32..)
        .map(|(record, rank)| BenchmarkRankEntry {
            rank,
            user: BenchmarkUser {
                name: names.get(&record.user_id).cloned(),
            },
            user_id: record.user_id,
            record_id: record.id,
            value: record.value,
            recorded_at: format_utc_rfc3339(record.recorded_at),
        })
        .collect()
}
