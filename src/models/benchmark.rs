// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Benchmark definitions and recorded results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A benchmark exercise within a challenge (e.g. "1km row").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub id: String,
    pub challenge_id: String,
    pub name: String,
    /// Display unit ("s", "kg", "reps")
    #[serde(default)]
    pub unit: Option<String>,
    /// Time-based benchmarks rank ascending
    #[serde(default)]
    pub is_lower_better: bool,
}

/// One recorded result for a benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub id: String,
    pub benchmark_id: String,
    pub user_id: String,
    pub value: f64,
    pub recorded_at: DateTime<Utc>,
}
