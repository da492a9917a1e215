// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregator;
pub mod cache;
pub mod classifier;
pub mod dashboard;
pub mod dedup;
pub mod leaderboard;
pub mod weeks;

pub use cache::ReferenceCache;
pub use classifier::WorkoutClassifier;
pub use dashboard::DashboardService;
