// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard service.
//!
//! Handles one request end to end:
//! 1. Validate input and load the challenge (fail fast)
//! 2. Read roster, records and workouts concurrently, each under a timeout
//! 3. Aggregate, rank and join feedback
//! 4. Return the response payload
//!
//! Any store failure fails the whole request; partial totals are never
//! returned. Feedback lookups are the exception: a failed lookup degrades to
//! `null` for that entry only.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use futures_util::{stream, StreamExt};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::ChallengeStore;
use crate::error::{AppError, Result};
use crate::models::{Challenge, Feedback, Participant, WeekBucket, WeeklyTotals};
use crate::services::aggregator::{recompute_week, totals_agree, WeekRecompute, WeeklyGrid};
use crate::services::cache::ReferenceCache;
use crate::services::classifier::WorkoutClassifier;
use crate::services::leaderboard::{
    points_for, rank_by_points, rank_by_value, BenchmarkRankEntry, LeaderboardEntry,
    LeaderboardInput,
};
use crate::services::weeks::{all_weeks, week_number_of};
use crate::time_utils::CivilClock;
use crate::AppState;

// ─── Payloads ────────────────────────────────────────────────

/// Weekly chart payload.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyChartResponse {
    pub weeks: Vec<WeekBucket>,
    /// Cardio points per user, one value per week
    pub cardio_data: Vec<UserSeries<f64>>,
    /// Credited strength sessions per user, one value per week
    pub strength_data: Vec<UserSeries<u32>>,
    pub users: Vec<ChartUser>,
    pub challenge_period: ChallengePeriod,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "camelCase")]
pub struct UserSeries<T> {
    pub user_id: String,
    pub name: Option<String>,
    pub values: Vec<T>,
    pub total: T,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "camelCase")]
pub struct ChartUser {
    pub id: String,
    pub name: Option<String>,
    pub active: bool,
    /// Canonical weekly record per week (`null` when none was persisted)
    pub weekly_record_ids: Vec<Option<String>>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "camelCase")]
pub struct ChallengePeriod {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub start_date: NaiveDate,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub end_date: NaiveDate,
    pub total_weeks: u32,
    /// Week containing today, if today is within the challenge
    pub current_week: Option<u32>,
}

/// Today-count payload.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TodayCountResponse {
    /// Distinct participants with at least one workout today
    pub count: u32,
    /// Participant count
    pub total: u32,
}

/// Fresh per-day detail for one user's week.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWeekDetail {
    pub user_id: String,
    pub name: Option<String>,
    pub week: WeekBucket,
    pub recomputed: WeekRecompute,
    pub points: f64,
    /// Totals from the canonical persisted record, if any
    pub persisted: Option<WeeklyTotals>,
    pub weekly_record_id: Option<String>,
    /// Whether the persisted record agrees with the recomputation
    pub in_sync: bool,
}

#[derive(Debug, Serialize)]
pub struct BenchmarkSummary {
    pub id: String,
    pub name: String,
    pub unit: Option<String>,
    pub is_lower_better: bool,
}

#[derive(Debug, Serialize)]
pub struct BenchmarkLeaderboardResponse {
    pub benchmark: BenchmarkSummary,
    pub entries: Vec<BenchmarkRankEntry>,
}

// ─── Service ─────────────────────────────────────────────────

/// Request-scoped view over the shared state.
pub struct DashboardService<'a> {
    store: &'a dyn ChallengeStore,
    cache: &'a ReferenceCache,
    clock: CivilClock,
    strength_session_weight: f64,
    store_timeout: Duration,
    feedback_concurrency: usize,
}

impl<'a> DashboardService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self {
            store: state.store.as_ref(),
            cache: &state.reference_cache,
            clock: state.clock,
            strength_session_weight: state.config.strength_session_weight,
            store_timeout: state.config.store_timeout,
            feedback_concurrency: state.config.feedback_concurrency.max(1),
        }
    }

    /// Run a store call under the request timeout.
    async fn timed<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| AppError::Timeout(operation.to_string()))?
    }

    /// Load and validate a challenge.
    pub async fn load_challenge(&self, challenge_id: &str) -> Result<Challenge> {
        let challenge_id = challenge_id.trim();
        if challenge_id.is_empty() {
            return Err(AppError::BadRequest("challenge_id is required".to_string()));
        }

        if let Some(challenge) = self.cache.challenge(challenge_id) {
            return Ok(challenge);
        }

        let challenge = self
            .timed("get_challenge", self.store.get_challenge(challenge_id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Challenge {} not found", challenge_id)))?;

        if challenge.end_date < challenge.start_date {
            return Err(AppError::BadRequest(format!(
                "Challenge {} ends before it starts",
                challenge_id
            )));
        }

        self.cache.store_challenge(&challenge);
        Ok(challenge)
    }

    async fn load_classifier(&self) -> Result<Arc<WorkoutClassifier>> {
        if let Some(classifier) = self.cache.classifier() {
            return Ok(classifier);
        }

        let (categories, types) = tokio::try_join!(
            self.timed("list_workout_categories", self.store.list_workout_categories()),
            self.timed("list_workout_types", self.store.list_workout_types()),
        )?;

        let classifier = Arc::new(WorkoutClassifier::from_maps(&categories, &types));
        tracing::debug!(
            categories = classifier.category_count(),
            "Loaded workout classifier"
        );
        self.cache.store_classifier(Arc::clone(&classifier));
        Ok(classifier)
    }

    async fn load_roster(&self, challenge_id: &str, active_only: bool) -> Result<Vec<Participant>> {
        let mut roster = self
            .timed("list_participants", self.store.list_participants(challenge_id))
            .await?;
        if active_only {
            roster.retain(Participant::is_active);
        }

        // A user listed twice keeps their first roster position.
        let mut seen = HashSet::new();
        roster.retain(|p| seen.insert(p.user_id.clone()));
        Ok(roster)
    }

    async fn load_names(&self, user_ids: &[String]) -> Result<HashMap<String, String>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = self.timed("get_users", self.store.get_users(user_ids)).await?;
        Ok(users.into_iter().map(|u| (u.id, u.name)).collect())
    }

    async fn load_grid(
        &self,
        user_ids: &[String],
        weeks: &[WeekBucket],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<WeeklyGrid> {
        if user_ids.is_empty() {
            return Ok(WeeklyGrid::from_records(Vec::new(), weeks));
        }
        let records = self
            .timed(
                "list_weekly_records",
                self.store.list_weekly_records(user_ids, from, to),
            )
            .await?;
        Ok(WeeklyGrid::from_records(records, weeks))
    }

    fn challenge_weeks(challenge: &Challenge) -> Vec<WeekBucket> {
        all_weeks(challenge.start_date, challenge.end_date)
    }

    fn week_bucket(challenge: &Challenge, weeks: &[WeekBucket], week_number: u32) -> Result<WeekBucket> {
        week_number
            .checked_sub(1)
            .and_then(|i| weeks.get(i as usize))
            .cloned()
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Week {} is outside challenge {} ({} weeks)",
                    week_number,
                    challenge.id,
                    weeks.len()
                ))
            })
    }

    /// Week containing today's civil date, if within the challenge.
    fn current_week(&self, challenge: &Challenge, weeks: &[WeekBucket], now: DateTime<Utc>) -> Option<u32> {
        let today = self.clock.today(now);
        if today > challenge.end_date {
            return None;
        }
        week_number_of(challenge.start_date, today).filter(|n| (*n as usize) <= weeks.len())
    }

    // ─── Weekly chart ────────────────────────────────────────

    /// Per-user weekly cardio points and strength sessions from persisted
    /// weekly records.
    pub async fn weekly_chart(
        &self,
        challenge_id: &str,
        active_only: bool,
        now: DateTime<Utc>,
    ) -> Result<WeeklyChartResponse> {
        let challenge = self.load_challenge(challenge_id).await?;
        let weeks = Self::challenge_weeks(&challenge);
        let roster = self.load_roster(&challenge.id, active_only).await?;
        let user_ids: Vec<String> = roster.iter().map(|p| p.user_id.clone()).collect();

        let (grid, names) = match (weeks.first(), weeks.last()) {
            (Some(first), Some(last)) => tokio::try_join!(
                self.load_grid(&user_ids, &weeks, first.start_date, last.end_date),
                self.load_names(&user_ids),
            )?,
            _ => (WeeklyGrid::default(), HashMap::new()),
        };

        let mut cardio_data = Vec::with_capacity(roster.len());
        let mut strength_data = Vec::with_capacity(roster.len());
        let mut users = Vec::with_capacity(roster.len());

        for participant in &roster {
            let user_id = &participant.user_id;
            let name = names.get(user_id).cloned();
            let cells = grid.user_cells(user_id);
            let total = grid.cumulative(user_id);

            cardio_data.push(UserSeries {
                user_id: user_id.clone(),
                name: name.clone(),
                values: cells.iter().map(|c| c.totals.cardio_points_total).collect(),
                total: total.cardio_points_total,
            });
            strength_data.push(UserSeries {
                user_id: user_id.clone(),
                name: name.clone(),
                values: cells.iter().map(|c| c.totals.strength_sessions_count).collect(),
                total: total.strength_sessions_count,
            });
            users.push(ChartUser {
                id: user_id.clone(),
                name,
                active: participant.is_active(),
                weekly_record_ids: cells.into_iter().map(|c| c.weekly_record_id).collect(),
            });
        }

        tracing::info!(
            challenge_id = %challenge.id,
            weeks = weeks.len(),
            users = users.len(),
            "Built weekly chart"
        );

        Ok(WeeklyChartResponse {
            challenge_period: ChallengePeriod {
                start_date: challenge.start_date,
                end_date: challenge.end_date,
                total_weeks: weeks.len() as u32,
                current_week: self.current_week(&challenge, &weeks, now),
            },
            weeks,
            cardio_data,
            strength_data,
            users,
        })
    }

    // ─── Points leaderboard ──────────────────────────────────

    /// Rank participants by points, cumulative or for a single week.
    ///
    /// Feedback is joined only for single-week leaderboards, where an entry
    /// maps to one weekly record.
    pub async fn leaderboard(
        &self,
        challenge_id: &str,
        week: Option<u32>,
        active_only: bool,
    ) -> Result<Vec<LeaderboardEntry>> {
        let challenge = self.load_challenge(challenge_id).await?;
        let weeks = Self::challenge_weeks(&challenge);
        let selected = week
            .map(|n| Self::week_bucket(&challenge, &weeks, n))
            .transpose()?;

        let roster = self.load_roster(&challenge.id, active_only).await?;
        let user_ids: Vec<String> = roster.iter().map(|p| p.user_id.clone()).collect();

        let (from, to) = match (&selected, weeks.first(), weeks.last()) {
            (Some(bucket), _, _) => (bucket.start_date, bucket.end_date),
            (None, Some(first), Some(last)) => (first.start_date, last.end_date),
            _ => return Ok(Vec::new()),
        };

        let (grid, names) = tokio::try_join!(
            self.load_grid(&user_ids, &weeks, from, to),
            self.load_names(&user_ids),
        )?;

        let inputs = user_ids
            .iter()
            .map(|user_id| {
                let (totals, weekly_record_id) = match &selected {
                    Some(bucket) => {
                        let cell = grid.cell(user_id, bucket.week_number);
                        (cell.totals, cell.weekly_record_id)
                    }
                    None => (grid.cumulative(user_id), None),
                };
                LeaderboardInput {
                    user_id: user_id.clone(),
                    name: names.get(user_id).cloned(),
                    totals,
                    weekly_record_id,
                }
            })
            .collect();

        let mut entries = rank_by_points(inputs, self.strength_session_weight);
        if selected.is_some() {
            self.join_feedback(&mut entries, &challenge.id).await;
        }

        tracing::info!(
            challenge_id = %challenge.id,
            week = ?week,
            entries = entries.len(),
            "Built leaderboard"
        );
        Ok(entries)
    }

    /// Attach feedback to each entry with a weekly record.
    ///
    /// Lookups run through a bounded limiter and keep entry order. A failed or
    /// timed-out lookup leaves that entry's feedback empty.
    async fn join_feedback(&self, entries: &mut [LeaderboardEntry], challenge_id: &str) {
        let store = self.store;
        let timeout = self.store_timeout;
        let record_ids: Vec<Option<String>> =
            entries.iter().map(|e| e.weekly_record_id.clone()).collect();

        let found: Vec<Option<Feedback>> = stream::iter(record_ids)
            .map(|record_id| async move {
                let record_id = record_id?;
                match tokio::time::timeout(timeout, store.get_feedback(&record_id, challenge_id))
                    .await
                {
                    Ok(Ok(feedback)) => feedback,
                    Ok(Err(e)) => {
                        tracing::warn!(
                            weekly_record_id = %record_id,
                            error = %e,
                            "Feedback lookup failed"
                        );
                        None
                    }
                    Err(_) => {
                        tracing::warn!(weekly_record_id = %record_id, "Feedback lookup timed out");
                        None
                    }
                }
            })
            .buffered(self.feedback_concurrency)
            .collect()
            .await;

        for (entry, feedback) in entries.iter_mut().zip(found) {
            entry.feedback = feedback;
        }
    }

    // ─── Today count ─────────────────────────────────────────

    /// Active participants with at least one workout on today's civil date.
    pub async fn today_count(&self, challenge_id: &str, now: DateTime<Utc>) -> Result<TodayCountResponse> {
        let challenge = self.load_challenge(challenge_id).await?;
        let roster = self.load_roster(&challenge.id, true).await?;
        let total = roster.len() as u32;
        if roster.is_empty() {
            return Ok(TodayCountResponse { count: 0, total });
        }

        let user_ids: Vec<String> = roster.into_iter().map(|p| p.user_id).collect();
        let today = self.clock.today(now);
        let (from, to) = self.clock.range(today, today);
        let workouts = self
            .timed("list_workouts", self.store.list_workouts(&user_ids, from, to))
            .await?;

        let active_today: HashSet<&str> = workouts
            .iter()
            .filter(|w| self.clock.civil_date(w.timestamp) == today)
            .map(|w| w.user_id.as_str())
            .collect();

        tracing::debug!(
            challenge_id = %challenge.id,
            %today,
            count = active_today.len(),
            total,
            "Counted today's active participants"
        );

        Ok(TodayCountResponse {
            count: active_today.len() as u32,
            total,
        })
    }

    // ─── Single-week recompute ───────────────────────────────

    /// Recompute one user's week from raw workouts and compare it with the
    /// persisted record.
    pub async fn user_week_detail(
        &self,
        challenge_id: &str,
        user_id: &str,
        week_number: u32,
    ) -> Result<UserWeekDetail> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::BadRequest("user_id is required".to_string()));
        }

        let challenge = self.load_challenge(challenge_id).await?;
        let weeks = Self::challenge_weeks(&challenge);
        let bucket = Self::week_bucket(&challenge, &weeks, week_number)?;

        let roster = self.load_roster(&challenge.id, false).await?;
        if !roster.iter().any(|p| p.user_id == user_id) {
            return Err(AppError::NotFound(format!(
                "User {} is not in challenge {}",
                user_id, challenge.id
            )));
        }

        let user_ids = vec![user_id.to_string()];
        let (from, to) = self.clock.range(bucket.start_date, bucket.end_date);
        let (classifier, workouts, grid, names) = tokio::try_join!(
            self.load_classifier(),
            self.timed("list_workouts", self.store.list_workouts(&user_ids, from, to)),
            self.load_grid(&user_ids, &weeks, bucket.start_date, bucket.end_date),
            self.load_names(&user_ids),
        )?;

        let recomputed = recompute_week(user_id, &workouts, &bucket, &classifier, &self.clock);
        let cell = grid.cell(user_id, bucket.week_number);
        let persisted = cell.weekly_record_id.as_ref().map(|_| cell.totals);
        let in_sync = totals_agree(&persisted.unwrap_or_default(), &recomputed.totals);

        if !in_sync {
            tracing::info!(
                challenge_id = %challenge.id,
                user_id,
                week = bucket.week_number,
                persisted = ?persisted,
                recomputed = ?recomputed.totals,
                "Persisted weekly record differs from raw workouts"
            );
        }

        Ok(UserWeekDetail {
            user_id: user_id.to_string(),
            name: names.get(user_id).cloned(),
            points: points_for(&recomputed.totals, self.strength_session_weight),
            week: bucket,
            recomputed,
            persisted,
            weekly_record_id: cell.weekly_record_id,
            in_sync,
        })
    }

    // ─── Benchmark leaderboard ───────────────────────────────

    /// Rank participants by their best benchmark result.
    pub async fn benchmark_leaderboard(
        &self,
        challenge_id: &str,
        benchmark_id: &str,
    ) -> Result<BenchmarkLeaderboardResponse> {
        let benchmark_id = benchmark_id.trim();
        if benchmark_id.is_empty() {
            return Err(AppError::BadRequest("benchmark_id is required".to_string()));
        }

        let challenge = self.load_challenge(challenge_id).await?;
        let benchmark = self
            .timed("get_benchmark", self.store.get_benchmark(benchmark_id))
            .await?
            .filter(|b| b.challenge_id == challenge.id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Benchmark {} not found in challenge {}",
                    benchmark_id, challenge.id
                ))
            })?;

        let (roster, mut records) = tokio::try_join!(
            self.load_roster(&challenge.id, false),
            self.timed(
                "list_benchmark_records",
                self.store.list_benchmark_records(&benchmark.id)
            ),
        )?;

        let members: HashSet<&str> = roster.iter().map(|p| p.user_id.as_str()).collect();
        records.retain(|r| members.contains(r.user_id.as_str()));

        let mut user_ids: Vec<String> = Vec::new();
        for record in &records {
            if !user_ids.contains(&record.user_id) {
                user_ids.push(record.user_id.clone());
            }
        }
        let names = self.load_names(&user_ids).await?;
        let entries = rank_by_value(records, benchmark.is_lower_better, &names);

        tracing::info!(
            challenge_id = %challenge.id,
            benchmark_id = %benchmark.id,
            entries = entries.len(),
            "Built benchmark leaderboard"
        );

        Ok(BenchmarkLeaderboardResponse {
            benchmark: BenchmarkSummary {
                id: benchmark.id,
                name: benchmark.name,
                unit: benchmark.unit,
                is_lower_better: benchmark.is_lower_better,
            },
            entries,
        })
    }

    /// Drop cached reference data for a challenge.
    pub fn invalidate(&self, challenge_id: &str) {
        self.cache.invalidate_challenge(challenge_id.trim());
    }
}
