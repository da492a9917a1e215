// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly summary models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Persisted per-user, per-week summary row.
///
/// Written by the ingestion system; this service only reads it. The store may
/// hold more than one row for the same canonical week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRecord {
    /// Record ID (also used as document ID and as the feedback join key)
    pub id: String,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub cardio_points_total: f64,
    #[serde(default)]
    pub strength_sessions_count: u32,
}

impl WeeklyRecord {
    pub fn totals(&self) -> WeeklyTotals {
        WeeklyTotals {
            cardio_points_total: self.cardio_points_total.max(0.0),
            strength_sessions_count: self.strength_sessions_count,
        }
    }
}

/// A civil-calendar week of a challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WeekBucket {
    /// 1-based week number
    pub week_number: u32,
    /// "M.D-M.D"
    pub label: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub start_date: NaiveDate,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub end_date: NaiveDate,
}

impl WeekBucket {
    /// Whether `date` falls inside this bucket (inclusive on both ends).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Aggregated totals for one user in one week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTotals {
    pub cardio_points_total: f64,
    pub strength_sessions_count: u32,
}

impl WeeklyTotals {
    /// Add another week's totals into this one.
    pub fn accumulate(&mut self, other: &WeeklyTotals) {
        self.cardio_points_total += other.cardio_points_total;
        self.strength_sessions_count += other.strength_sessions_count;
    }
}
