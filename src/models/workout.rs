// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Raw workout events and the category/type lookup tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A logged workout, produced by the external logging system.
///
/// Never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEvent {
    /// Workout ID (also used as document ID)
    pub id: String,
    /// Owner
    pub user_id: String,
    /// Workout category (resolved to a type through [`WorkoutCategory`])
    pub category_id: String,
    /// When the workout happened
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Points credited for this workout (cardio only)
    #[serde(default)]
    pub points: f64,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

/// Workout category row: `category_id -> type_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutCategory {
    pub id: String,
    pub type_id: String,
    #[serde(default)]
    pub name: String,
}

/// Workout type row: `type_id -> type_name` ("CARDIO", "STRENGTH", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutType {
    pub id: String,
    pub name: String,
}

/// Coarse workout type used for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkoutKind {
    Cardio,
    Strength,
    Unknown,
}

impl WorkoutKind {
    /// Parse a type name. Anything other than cardio/strength is `None`.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("CARDIO") {
            Some(WorkoutKind::Cardio)
        } else if name.eq_ignore_ascii_case("STRENGTH") {
            Some(WorkoutKind::Strength)
        } else {
            None
        }
    }
}
