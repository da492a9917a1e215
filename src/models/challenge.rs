// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge and roster models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A fitness challenge. Immutable once its dates are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    /// Challenge ID (also used as document ID)
    pub id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// First civil day of the challenge
    pub start_date: NaiveDate,
    /// Last civil day of the challenge (inclusive)
    pub end_date: NaiveDate,
}

/// Participant status value marking an active roster entry.
pub const STATUS_ACTIVE: &str = "active";

/// A user's membership in a challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub challenge_id: String,
    pub user_id: String,
    /// "active", "dropped", ...
    #[serde(default = "default_status")]
    pub status: String,
    /// When the user joined (ISO 8601); the roster is ordered by this.
    #[serde(default)]
    pub joined_at: String,
}

fn default_status() -> String {
    STATUS_ACTIVE.to_string()
}

impl Participant {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_ACTIVE)
    }
}
