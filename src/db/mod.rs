//! Database layer.
//!
//! The engine only reads from the store; rows are written by the ingestion
//! system and the admin CRUD surface.

pub mod firestore;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

pub use self::firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{
    Benchmark, BenchmarkRecord, Challenge, Feedback, Participant, User, WeeklyRecord,
    WorkoutCategory, WorkoutEvent, WorkoutType,
};

/// Collection names as constants.
pub mod collections {
    pub const CHALLENGES: &str = "challenges";
    pub const PARTICIPANTS: &str = "challenge_participants";
    pub const USERS: &str = "users";
    pub const WORKOUTS: &str = "workouts";
    pub const WORKOUT_CATEGORIES: &str = "workout_categories";
    pub const WORKOUT_TYPES: &str = "workout_types";
    /// Per-user weekly summaries (written by ingestion)
    pub const WEEKLY_RECORDS: &str = "weekly_records";
    pub const FEEDBACK: &str = "weekly_feedback";
    pub const BENCHMARKS: &str = "benchmarks";
    pub const BENCHMARK_RECORDS: &str = "benchmark_records";
}

/// Read access to challenge data.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>, AppError>;

    /// Roster in ascending `joined_at` order.
    async fn list_participants(&self, challenge_id: &str) -> Result<Vec<Participant>, AppError>;

    async fn get_users(&self, user_ids: &[String]) -> Result<Vec<User>, AppError>;

    /// Workouts of `user_ids` with `from <= timestamp < to`.
    async fn list_workouts(
        &self,
        user_ids: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<WorkoutEvent>, AppError>;

    async fn list_workout_categories(&self) -> Result<Vec<WorkoutCategory>, AppError>;

    async fn list_workout_types(&self) -> Result<Vec<WorkoutType>, AppError>;

    /// Weekly records of `user_ids` whose `start_date` is in `from..=to`.
    async fn list_weekly_records(
        &self,
        user_ids: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WeeklyRecord>, AppError>;

    async fn get_feedback(
        &self,
        weekly_record_id: &str,
        challenge_id: &str,
    ) -> Result<Option<Feedback>, AppError>;

    async fn get_benchmark(&self, benchmark_id: &str) -> Result<Option<Benchmark>, AppError>;

    /// Records in ascending `recorded_at` order.
    async fn list_benchmark_records(
        &self,
        benchmark_id: &str,
    ) -> Result<Vec<BenchmarkRecord>, AppError>;
}
