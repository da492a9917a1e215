// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use challenge_tracker::config::Config;
use challenge_tracker::db::{ChallengeStore, FirestoreDb, MemoryStore};
use challenge_tracker::error::AppError;
use challenge_tracker::middleware::create_jwt;
use challenge_tracker::models::{
    Benchmark, BenchmarkRecord, Challenge, Feedback, Participant, User, WeeklyRecord,
    WorkoutCategory, WorkoutEvent, WorkoutType,
};
use challenge_tracker::routes::create_router;
use challenge_tracker::AppState;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Challenge seeded by [`seeded_store`]: Wed 2024-01-10 through Sun
/// 2024-02-04, four Monday-aligned weeks starting 2024-01-08.
#[allow(dead_code)]
pub const CHALLENGE_ID: &str = "winter-2024";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

// ─── Fixture builders ────────────────────────────────────────

#[allow(dead_code)]
pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

#[allow(dead_code)]
pub fn parse_time(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .unwrap()
        .with_timezone(&Utc)
}

#[allow(dead_code)]
pub fn workout(id: &str, user: &str, category: &str, at: DateTime<Utc>, points: f64) -> WorkoutEvent {
    WorkoutEvent {
        id: id.to_string(),
        user_id: user.to_string(),
        category_id: category.to_string(),
        timestamp: at,
        points,
        duration_minutes: Some(45),
    }
}

#[allow(dead_code)]
pub fn weekly_record(id: &str, user: &str, start: &str, cardio: f64, strength: u32) -> WeeklyRecord {
    let start = date(start);
    WeeklyRecord {
        id: id.to_string(),
        user_id: user.to_string(),
        start_date: start,
        end_date: start + chrono::Duration::days(6),
        cardio_points_total: cardio,
        strength_sessions_count: strength,
    }
}

#[allow(dead_code)]
pub fn participant(challenge: &str, user: &str, status: &str, joined: &str) -> Participant {
    Participant {
        challenge_id: challenge.to_string(),
        user_id: user.to_string(),
        status: status.to_string(),
        joined_at: joined.to_string(),
    }
}

/// Category "run" is cardio, "lift" is strength, "yoga" has a type the
/// engine does not classify.
#[allow(dead_code)]
pub fn seed_reference_tables(store: &MemoryStore) {
    for (id, name) in [("t-cardio", "CARDIO"), ("t-strength", "STRENGTH"), ("t-flex", "FLEXIBILITY")] {
        store
            .add_workout_type(WorkoutType {
                id: id.to_string(),
                name: name.to_string(),
            })
            .unwrap();
    }
    for (id, type_id) in [("run", "t-cardio"), ("lift", "t-strength"), ("yoga", "t-flex")] {
        store
            .add_category(WorkoutCategory {
                id: id.to_string(),
                type_id: type_id.to_string(),
                name: id.to_string(),
            })
            .unwrap();
    }
}

/// Standard fixture.
///
/// Roster (join order): alice, bob, cara (dropped), dan (no records).
///
/// | user  | week 1           | week 2                       |
/// |-------|------------------|------------------------------|
/// | alice | 100 cardio, 2 str| 30 cardio, 1 str             |
/// | bob   | 150 cardio       | 10 cardio (plus a duplicate) |
/// | cara  | 500 cardio       |                              |
///
/// Alice's raw workouts reproduce her week-1 record exactly; her week-3
/// workouts have no persisted record.
#[allow(dead_code)]
pub fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    seed_reference_tables(&store);

    store
        .put_challenge(Challenge {
            id: CHALLENGE_ID.to_string(),
            title: "Winter Challenge".to_string(),
            start_date: date("2024-01-10"),
            end_date: date("2024-02-04"),
        })
        .unwrap();

    for (user, name, status, joined) in [
        ("alice", "Alice", "active", "2024-01-01T00:00:00Z"),
        ("bob", "Bob", "active", "2024-01-02T00:00:00Z"),
        ("cara", "Cara", "dropped", "2024-01-03T00:00:00Z"),
        ("dan", "Dan", "active", "2024-01-04T00:00:00Z"),
    ] {
        store
            .add_participant(participant(CHALLENGE_ID, user, status, joined))
            .unwrap();
        store
            .put_user(User {
                id: user.to_string(),
                name: name.to_string(),
                email: None,
            })
            .unwrap();
    }

    for record in [
        weekly_record("alice-w1", "alice", "2024-01-08", 100.0, 2),
        weekly_record("bob-w1", "bob", "2024-01-08", 150.0, 0),
        weekly_record("cara-w1", "cara", "2024-01-08", 500.0, 0),
        weekly_record("alice-w2", "alice", "2024-01-15", 30.0, 1),
        // Duplicate pair for the same canonical week; the earlier start wins.
        weekly_record("bob-w2-late", "bob", "2024-01-16", 999.0, 9),
        weekly_record("bob-w2", "bob", "2024-01-15", 10.0, 0),
    ] {
        store.add_weekly_record(record).unwrap();
    }

    store
        .add_feedback(Feedback {
            id: "fb-1".to_string(),
            weekly_record_id: "alice-w1".to_string(),
            challenge_id: CHALLENGE_ID.to_string(),
            coach_id: Some("coach-1".to_string()),
            coach_feedback: Some("Great week".to_string()),
            ai_feedback: None,
            updated_at: "2024-01-15T09:00:00Z".to_string(),
        })
        .unwrap();

    for w in [
        // Week 1, matching alice-w1
        workout("a1", "alice", "run", parse_time("2024-01-09T01:00:00Z"), 100.0),
        workout("a2", "alice", "lift", parse_time("2024-01-10T01:00:00Z"), 0.0),
        workout("a3", "alice", "lift", parse_time("2024-01-10T03:00:00Z"), 0.0),
        workout("a4", "alice", "lift", parse_time("2024-01-11T01:00:00Z"), 0.0),
        // Week 3, never persisted
        workout("a5", "alice", "run", parse_time("2024-01-22T01:00:00Z"), 10.5),
        workout("a6", "alice", "run", parse_time("2024-01-27T01:00:00Z"), 4.25),
        workout("a7", "alice", "lift", parse_time("2024-01-23T01:00:00Z"), 0.0),
        workout("a8", "alice", "lift", parse_time("2024-01-23T09:00:00Z"), 0.0),
        workout("a9", "alice", "yoga", parse_time("2024-01-24T01:00:00Z"), 8.0),
    ] {
        store.add_workout(w).unwrap();
    }

    store
        .put_benchmark(Benchmark {
            id: "bm-5k".to_string(),
            challenge_id: CHALLENGE_ID.to_string(),
            name: "5k run".to_string(),
            unit: Some("s".to_string()),
            is_lower_better: true,
        })
        .unwrap();
    store
        .put_benchmark(Benchmark {
            id: "bm-elsewhere".to_string(),
            challenge_id: "summer-2024".to_string(),
            name: "Deadlift".to_string(),
            unit: Some("kg".to_string()),
            is_lower_better: false,
        })
        .unwrap();
    for (id, user, value, at) in [
        ("b1", "alice", 1500.0, "2024-01-12T00:00:00Z"),
        ("b2", "alice", 1450.0, "2024-01-19T00:00:00Z"),
        ("b3", "bob", 1450.0, "2024-01-20T00:00:00Z"),
        ("b4", "cara", 1600.0, "2024-01-13T00:00:00Z"),
        // Not on the roster
        ("b5", "zed", 1000.0, "2024-01-14T00:00:00Z"),
    ] {
        store
            .add_benchmark_record(BenchmarkRecord {
                id: id.to_string(),
                benchmark_id: "bm-5k".to_string(),
                user_id: user.to_string(),
                value,
                recorded_at: parse_time(at),
            })
            .unwrap();
    }

    Arc::new(store)
}

// ─── Apps ────────────────────────────────────────────────────

/// Create a test app over the standard fixture.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_store(seeded_store(), Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_store(
    store: Arc<dyn ChallengeStore>,
    config: Config,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, store).expect("valid test config"));
    (create_router(state.clone()), state)
}

/// Create a test app whose store is an offline Firestore client.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_store(Arc::new(FirestoreDb::new_mock()), Config::test_default())
}

/// Create a coach JWT signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(coach_id: &str) -> String {
    create_jwt(coach_id, &Config::test_default().jwt_signing_key).unwrap()
}

/// Authenticated GET; returns status, headers and the parsed JSON body
/// (`Null` for an empty or non-JSON body).
#[allow(dead_code)]
pub async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, HeaderMap, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", create_test_jwt("coach-1")))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

#[allow(dead_code)]
pub async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, HeaderMap, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, headers, body)
}

// ─── Instrumented store ──────────────────────────────────────

/// Store wrapper that can inject feedback failures and slow calls. It counts
/// challenge reads and tracks how many feedback lookups overlap.
#[allow(dead_code)]
pub struct InstrumentedStore {
    pub inner: Arc<MemoryStore>,
    pub failing_feedback: HashSet<String>,
    /// Per weekly record delay before a feedback lookup answers
    pub feedback_delay: HashMap<String, Duration>,
    /// Delay for every other feedback lookup
    pub feedback_latency: Option<Duration>,
    pub roster_delay: Option<Duration>,
    pub challenge_reads: AtomicUsize,
    feedback_in_flight: AtomicUsize,
    feedback_peak: AtomicUsize,
}

/// Decrements the in-flight count even when a timed-out lookup is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(in_flight: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(in_flight)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[allow(dead_code)]
impl InstrumentedStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            failing_feedback: HashSet::new(),
            feedback_delay: HashMap::new(),
            feedback_latency: None,
            roster_delay: None,
            challenge_reads: AtomicUsize::new(0),
            feedback_in_flight: AtomicUsize::new(0),
            feedback_peak: AtomicUsize::new(0),
        }
    }

    pub fn challenge_reads(&self) -> usize {
        self.challenge_reads.load(Ordering::SeqCst)
    }

    /// Highest number of feedback lookups seen running at once.
    pub fn peak_feedback_in_flight(&self) -> usize {
        self.feedback_peak.load(Ordering::SeqCst)
    }

    pub fn feedback_in_flight(&self) -> usize {
        self.feedback_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChallengeStore for InstrumentedStore {
    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>, AppError> {
        self.challenge_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_challenge(challenge_id).await
    }

    async fn list_participants(&self, challenge_id: &str) -> Result<Vec<Participant>, AppError> {
        if let Some(delay) = self.roster_delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.list_participants(challenge_id).await
    }

    async fn get_users(&self, user_ids: &[String]) -> Result<Vec<User>, AppError> {
        self.inner.get_users(user_ids).await
    }

    async fn list_workouts(
        &self,
        user_ids: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<WorkoutEvent>, AppError> {
        self.inner.list_workouts(user_ids, from, to).await
    }

    async fn list_workout_categories(&self) -> Result<Vec<WorkoutCategory>, AppError> {
        self.inner.list_workout_categories().await
    }

    async fn list_workout_types(&self) -> Result<Vec<WorkoutType>, AppError> {
        self.inner.list_workout_types().await
    }

    async fn list_weekly_records(
        &self,
        user_ids: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WeeklyRecord>, AppError> {
        self.inner.list_weekly_records(user_ids, from, to).await
    }

    async fn get_feedback(
        &self,
        weekly_record_id: &str,
        challenge_id: &str,
    ) -> Result<Option<Feedback>, AppError> {
        let _guard = InFlight::enter(&self.feedback_in_flight, &self.feedback_peak);
        let delay = self
            .feedback_delay
            .get(weekly_record_id)
            .copied()
            .or(self.feedback_latency);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_feedback.contains(weekly_record_id) {
            return Err(AppError::Database("feedback backend unavailable".to_string()));
        }
        self.inner.get_feedback(weekly_record_id, challenge_id).await
    }

    async fn get_benchmark(&self, benchmark_id: &str) -> Result<Option<Benchmark>, AppError> {
        self.inner.get_benchmark(benchmark_id).await
    }

    async fn list_benchmark_records(
        &self,
        benchmark_id: &str,
    ) -> Result<Vec<BenchmarkRecord>, AppError> {
        self.inner.list_benchmark_records(benchmark_id).await
    }
}
