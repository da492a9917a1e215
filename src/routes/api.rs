// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated coaches.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthCoach;
use crate::services::dashboard::{
    BenchmarkLeaderboardResponse, DashboardService, TodayCountResponse, UserWeekDetail,
    WeeklyChartResponse,
};
use crate::services::leaderboard::LeaderboardEntry;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/challenges/{challenge_id}/workouts/weekly-chart",
            get(get_weekly_chart),
        )
        .route(
            "/api/challenges/{challenge_id}/workouts/leaderboard",
            get(get_leaderboard),
        )
        .route(
            "/api/challenges/{challenge_id}/workouts/today-count",
            get(get_today_count),
        )
        .route(
            "/api/challenges/{challenge_id}/users/{user_id}/weeks/{week_number}",
            get(get_user_week),
        )
        .route(
            "/api/challenges/{challenge_id}/benchmarks/{benchmark_id}/leaderboard",
            get(get_benchmark_leaderboard),
        )
        .route(
            "/api/challenges/{challenge_id}/cache/invalidate",
            post(invalidate_cache),
        )
}

fn validate_params<T: Validate>(query: &T) -> Result<()> {
    query
        .validate()
        .map_err(|e| AppError::BadRequest(format!("Invalid parameters: {}", e)))
}

// ─── Weekly Chart ────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct WeeklyChartQuery {
    /// Only include participants with active status
    #[serde(default)]
    active_only: bool,
}

async fn get_weekly_chart(
    State(state): State<Arc<AppState>>,
    Extension(coach): Extension<AuthCoach>,
    Path(challenge_id): Path<String>,
    Query(params): Query<WeeklyChartQuery>,
) -> Result<Json<WeeklyChartResponse>> {
    tracing::debug!(
        coach_id = %coach.coach_id,
        challenge_id = %challenge_id,
        active_only = params.active_only,
        "Fetching weekly chart"
    );

    let chart = DashboardService::new(&state)
        .weekly_chart(&challenge_id, params.active_only, chrono::Utc::now())
        .await?;
    Ok(Json(chart))
}

// ─── Points Leaderboard ──────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
struct LeaderboardQuery {
    /// Single challenge week; cumulative when absent
    #[validate(range(min = 1))]
    week: Option<u32>,
    #[serde(default)]
    active_only: bool,
}

async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Extension(coach): Extension<AuthCoach>,
    Path(challenge_id): Path<String>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    validate_params(&params)?;
    tracing::debug!(
        coach_id = %coach.coach_id,
        challenge_id = %challenge_id,
        week = ?params.week,
        "Fetching leaderboard"
    );

    let entries = DashboardService::new(&state)
        .leaderboard(&challenge_id, params.week, params.active_only)
        .await?;
    Ok(Json(entries))
}

// ─── Today Count ─────────────────────────────────────────────

async fn get_today_count(
    State(state): State<Arc<AppState>>,
    Path(challenge_id): Path<String>,
) -> Result<Json<TodayCountResponse>> {
    let count = DashboardService::new(&state)
        .today_count(&challenge_id, chrono::Utc::now())
        .await?;
    Ok(Json(count))
}

// ─── User Week Detail ────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
struct UserWeekPath {
    challenge_id: String,
    #[validate(length(min = 1))]
    user_id: String,
    #[validate(range(min = 1))]
    week_number: u32,
}

async fn get_user_week(
    State(state): State<Arc<AppState>>,
    Extension(coach): Extension<AuthCoach>,
    Path(path): Path<UserWeekPath>,
) -> Result<Json<UserWeekDetail>> {
    validate_params(&path)?;
    tracing::debug!(
        coach_id = %coach.coach_id,
        challenge_id = %path.challenge_id,
        user_id = %path.user_id,
        week = path.week_number,
        "Recomputing user week"
    );

    let detail = DashboardService::new(&state)
        .user_week_detail(&path.challenge_id, &path.user_id, path.week_number)
        .await?;
    Ok(Json(detail))
}

// ─── Benchmark Leaderboard ───────────────────────────────────

async fn get_benchmark_leaderboard(
    State(state): State<Arc<AppState>>,
    Path((challenge_id, benchmark_id)): Path<(String, String)>,
) -> Result<Json<BenchmarkLeaderboardResponse>> {
    let leaderboard = DashboardService::new(&state)
        .benchmark_leaderboard(&challenge_id, &benchmark_id)
        .await?;
    Ok(Json(leaderboard))
}

// ─── Cache ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct InvalidateResponse {
    pub success: bool,
    pub challenge_id: String,
}

/// Drop cached challenge metadata and category maps, e.g. after an admin
/// edit to the challenge dates.
async fn invalidate_cache(
    State(state): State<Arc<AppState>>,
    Extension(coach): Extension<AuthCoach>,
    Path(challenge_id): Path<String>,
) -> Result<Json<InvalidateResponse>> {
    if challenge_id.trim().is_empty() {
        return Err(AppError::BadRequest("challenge_id is required".to_string()));
    }
    tracing::info!(
        coach_id = %coach.coach_id,
        challenge_id = %challenge_id,
        "Invalidating reference cache"
    );

    DashboardService::new(&state).invalidate(&challenge_id);
    Ok(Json(InvalidateResponse {
        success: true,
        challenge_id,
    }))
}
