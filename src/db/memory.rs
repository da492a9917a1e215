// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for local development and tests.
//!
//! Rows keep insertion order, which stands in for the store's fetch order
//! wherever the trait does not specify one.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::db::ChallengeStore;
use crate::error::AppError;
use crate::models::{
    Benchmark, BenchmarkRecord, Challenge, Feedback, Participant, User, WeeklyRecord,
    WorkoutCategory, WorkoutEvent, WorkoutType,
};

#[derive(Default)]
struct Tables {
    challenges: Vec<Challenge>,
    participants: Vec<Participant>,
    users: Vec<User>,
    workouts: Vec<WorkoutEvent>,
    categories: Vec<WorkoutCategory>,
    types: Vec<WorkoutType>,
    weekly_records: Vec<WeeklyRecord>,
    feedback: Vec<Feedback>,
    benchmarks: Vec<Benchmark>,
    benchmark_records: Vec<BenchmarkRecord>,
}

/// Store backed by in-memory tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

fn poisoned() -> AppError {
    AppError::Database("memory store lock poisoned".to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables.write().map_err(|_| poisoned())
    }

    // ─── Seeding ─────────────────────────────────────────────────

    /// Insert or replace a challenge.
    pub fn put_challenge(&self, challenge: Challenge) -> Result<(), AppError> {
        let mut tables = self.write()?;
        tables.challenges.retain(|c| c.id != challenge.id);
        tables.challenges.push(challenge);
        Ok(())
    }

    pub fn add_participant(&self, participant: Participant) -> Result<(), AppError> {
        self.write()?.participants.push(participant);
        Ok(())
    }

    pub fn put_user(&self, user: User) -> Result<(), AppError> {
        let mut tables = self.write()?;
        tables.users.retain(|u| u.id != user.id);
        tables.users.push(user);
        Ok(())
    }

    pub fn add_workout(&self, workout: WorkoutEvent) -> Result<(), AppError> {
        self.write()?.workouts.push(workout);
        Ok(())
    }

    pub fn add_category(&self, category: WorkoutCategory) -> Result<(), AppError> {
        self.write()?.categories.push(category);
        Ok(())
    }

    pub fn add_workout_type(&self, workout_type: WorkoutType) -> Result<(), AppError> {
        self.write()?.types.push(workout_type);
        Ok(())
    }

    /// Append a weekly record. Duplicates for the same week are allowed, as
    /// they are in the real store.
    pub fn add_weekly_record(&self, record: WeeklyRecord) -> Result<(), AppError> {
        self.write()?.weekly_records.push(record);
        Ok(())
    }

    pub fn add_feedback(&self, feedback: Feedback) -> Result<(), AppError> {
        self.write()?.feedback.push(feedback);
        Ok(())
    }

    pub fn put_benchmark(&self, benchmark: Benchmark) -> Result<(), AppError> {
        let mut tables = self.write()?;
        tables.benchmarks.retain(|b| b.id != benchmark.id);
        tables.benchmarks.push(benchmark);
        Ok(())
    }

    pub fn add_benchmark_record(&self, record: BenchmarkRecord) -> Result<(), AppError> {
        self.write()?.benchmark_records.push(record);
        Ok(())
    }
}

#[async_trait]
impl ChallengeStore for MemoryStore {
    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>, AppError> {
        Ok(self
            .read()?
            .challenges
            .iter()
            .find(|c| c.id == challenge_id)
            .cloned())
    }

    async fn list_participants(&self, challenge_id: &str) -> Result<Vec<Participant>, AppError> {
        let mut roster: Vec<Participant> = self
            .read()?
            .participants
            .iter()
            .filter(|p| p.challenge_id == challenge_id)
            .cloned()
            .collect();
        roster.sort_by(|a, b| a.joined_at.cmp(&b.joined_at));
        Ok(roster)
    }

    async fn get_users(&self, user_ids: &[String]) -> Result<Vec<User>, AppError> {
        Ok(self
            .read()?
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn list_workouts(
        &self,
        user_ids: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<WorkoutEvent>, AppError> {
        Ok(self
            .read()?
            .workouts
            .iter()
            .filter(|w| user_ids.contains(&w.user_id) && from <= w.timestamp && w.timestamp < to)
            .cloned()
            .collect())
    }

    async fn list_workout_categories(&self) -> Result<Vec<WorkoutCategory>, AppError> {
        Ok(self.read()?.categories.clone())
    }

    async fn list_workout_types(&self) -> Result<Vec<WorkoutType>, AppError> {
        Ok(self.read()?.types.clone())
    }

    async fn list_weekly_records(
        &self,
        user_ids: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WeeklyRecord>, AppError> {
        Ok(self
            .read()?
            .weekly_records
            .iter()
            .filter(|r| user_ids.contains(&r.user_id) && from <= r.start_date && r.start_date <= to)
            .cloned()
            .collect())
    }

    async fn get_feedback(
        &self,
        weekly_record_id: &str,
        challenge_id: &str,
    ) -> Result<Option<Feedback>, AppError> {
        Ok(self
            .read()?
            .feedback
            .iter()
            .find(|f| f.weekly_record_id == weekly_record_id && f.challenge_id == challenge_id)
            .cloned())
    }

    async fn get_benchmark(&self, benchmark_id: &str) -> Result<Option<Benchmark>, AppError> {
        Ok(self
            .read()?
            .benchmarks
            .iter()
            .find(|b| b.id == benchmark_id)
            .cloned())
    }

    async fn list_benchmark_records(
        &self,
        benchmark_id: &str,
    ) -> Result<Vec<BenchmarkRecord>, AppError> {
        let mut records: Vec<BenchmarkRecord> = self
            .read()?
            .benchmark_records
            .iter()
            .filter(|r| r.benchmark_id == benchmark_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.recorded_at);
        Ok(records)
    }
}
