// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coach feedback attached to a weekly record.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Feedback row, keyed by `(weekly_record_id, challenge_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Feedback {
    pub id: String,
    pub weekly_record_id: String,
    pub challenge_id: String,
    #[serde(default)]
    pub coach_id: Option<String>,
    #[serde(default)]
    pub coach_feedback: Option<String>,
    #[serde(default)]
    pub ai_feedback: Option<String>,
    /// Last update timestamp (ISO 8601)
    #[serde(default)]
    pub updated_at: String,
}
