// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides read operations for:
//! - Challenges and rosters
//! - Workouts and the category/type tables
//! - Weekly records and their coach feedback
//! - Benchmarks and benchmark records

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::db::{collections, ChallengeStore};
use crate::error::AppError;
use crate::models::{
    Benchmark, BenchmarkRecord, Challenge, Feedback, Participant, User, WeeklyRecord,
    WorkoutCategory, WorkoutEvent, WorkoutType,
};

// Firestore limits `IN` filters to 30 values.
const IN_FILTER_LIMIT: usize = 30;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Create or replace a document.
    ///
    /// The service never writes in its read path; this exists for seeding the
    /// emulator and for admin tooling.
    pub async fn upsert_document<T>(
        &self,
        collection: &str,
        document_id: &str,
        object: &T,
    ) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(document_id)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Fetch one document by ID.
    async fn get_by_id<T>(&self, collection: &str, document_id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(document_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch a whole (small) collection.
    async fn list_all<T>(&self, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl ChallengeStore for FirestoreDb {
    // ─── Challenge Operations ────────────────────────────────────

    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>, AppError> {
        self.get_by_id(collections::CHALLENGES, challenge_id).await
    }

    async fn list_participants(&self, challenge_id: &str) -> Result<Vec<Participant>, AppError> {
        let challenge_id = challenge_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PARTICIPANTS)
            .filter(move |q| q.for_all([q.field("challenge_id").eq(challenge_id.clone())]))
            .order_by([("joined_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_users(&self, user_ids: &[String]) -> Result<Vec<User>, AppError> {
        let client = self.get_client()?;
        let mut users = Vec::with_capacity(user_ids.len());

        for chunk in user_ids.chunks(IN_FILTER_LIMIT) {
            let ids = chunk.to_vec();
            let mut found: Vec<User> = client
                .fluent()
                .select()
                .from(collections::USERS)
                .filter(move |q| q.for_all([q.field("id").is_in(ids.clone())]))
                .obj()
                .query()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            users.append(&mut found);
        }

        Ok(users)
    }

    // ─── Workout Operations ──────────────────────────────────────

    async fn list_workouts(
        &self,
        user_ids: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<WorkoutEvent>, AppError> {
        let client = self.get_client()?;
        // Workout timestamps are stored as native Firestore timestamps.
        let from = firestore::FirestoreTimestamp(from);
        let to = firestore::FirestoreTimestamp(to);
        let mut workouts = Vec::new();

        for chunk in user_ids.chunks(IN_FILTER_LIMIT) {
            let ids = chunk.to_vec();
            let (from, to) = (from.clone(), to.clone());
            let mut found: Vec<WorkoutEvent> = client
                .fluent()
                .select()
                .from(collections::WORKOUTS)
                .filter(move |q| {
                    q.for_all([
                        q.field("user_id").is_in(ids.clone()),
                        q.field("timestamp").greater_than_or_equal(from.clone()),
                        q.field("timestamp").less_than(to.clone()),
                    ])
                })
                .order_by([("timestamp", firestore::FirestoreQueryDirection::Ascending)])
                .obj()
                .query()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            workouts.append(&mut found);
        }

        tracing::debug!(
            users = user_ids.len(),
            workouts = workouts.len(),
            "Fetched workouts"
        );
        Ok(workouts)
    }

    async fn list_workout_categories(&self) -> Result<Vec<WorkoutCategory>, AppError> {
        self.list_all(collections::WORKOUT_CATEGORIES).await
    }

    async fn list_workout_types(&self) -> Result<Vec<WorkoutType>, AppError> {
        self.list_all(collections::WORKOUT_TYPES).await
    }

    // ─── Weekly Record Operations ────────────────────────────────

    async fn list_weekly_records(
        &self,
        user_ids: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WeeklyRecord>, AppError> {
        let client = self.get_client()?;
        // Dates are stored as "YYYY-MM-DD" strings.
        let from = from.to_string();
        let to = to.to_string();
        let mut records = Vec::new();

        for chunk in user_ids.chunks(IN_FILTER_LIMIT) {
            let ids = chunk.to_vec();
            let (from, to) = (from.clone(), to.clone());
            let mut found: Vec<WeeklyRecord> = client
                .fluent()
                .select()
                .from(collections::WEEKLY_RECORDS)
                .filter(move |q| {
                    q.for_all([
                        q.field("user_id").is_in(ids.clone()),
                        q.field("start_date").greater_than_or_equal(from.clone()),
                        q.field("start_date").less_than_or_equal(to.clone()),
                    ])
                })
                .order_by([("start_date", firestore::FirestoreQueryDirection::Ascending)])
                .obj()
                .query()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            records.append(&mut found);
        }

        Ok(records)
    }

    async fn get_feedback(
        &self,
        weekly_record_id: &str,
        challenge_id: &str,
    ) -> Result<Option<Feedback>, AppError> {
        let weekly_record_id = weekly_record_id.to_string();
        let challenge_id = challenge_id.to_string();
        let found: Vec<Feedback> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::FEEDBACK)
            .filter(move |q| {
                q.for_all([
                    q.field("weekly_record_id").eq(weekly_record_id.clone()),
                    q.field("challenge_id").eq(challenge_id.clone()),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(found.into_iter().next())
    }

    // ─── Benchmark Operations ────────────────────────────────────

    async fn get_benchmark(&self, benchmark_id: &str) -> Result<Option<Benchmark>, AppError> {
        self.get_by_id(collections::BENCHMARKS, benchmark_id).await
    }

    async fn list_benchmark_records(
        &self,
        benchmark_id: &str,
    ) -> Result<Vec<BenchmarkRecord>, AppError> {
        let benchmark_id = benchmark_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::BENCHMARK_RECORDS)
            .filter(move |q| q.for_all([q.field("benchmark_id").eq(benchmark_id.clone())]))
            .order_by([("recorded_at", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
