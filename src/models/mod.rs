// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod benchmark;
pub mod challenge;
pub mod feedback;
pub mod user;
pub mod weekly;
pub mod workout;

pub use benchmark::{Benchmark, BenchmarkRecord};
pub use challenge::{Challenge, Participant};
pub use feedback::Feedback;
pub use user::User;
pub use weekly::{WeekBucket, WeeklyRecord, WeeklyTotals};
pub use workout::{WorkoutCategory, WorkoutEvent, WorkoutKind, WorkoutType};
