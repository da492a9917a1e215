// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Challenge-Tracker: weekly workout aggregation for fitness challenges
//!
//! This crate provides the backend API behind the coach dashboard: weekly
//! cardio and strength charts, points and benchmark leaderboards, and
//! per-week recomputation from raw workouts.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::{Config, ConfigError};
use db::ChallengeStore;
use services::ReferenceCache;
use time_utils::CivilClock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ChallengeStore>,
    /// Civil-day conversions for the configured offset
    pub clock: CivilClock,
    pub reference_cache: ReferenceCache,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ChallengeStore>) -> Result<Self, ConfigError> {
        config.validate()?;
        let clock = config.clock().ok_or_else(|| {
            ConfigError::Invalid(
                "CHALLENGE_UTC_OFFSET_HOURS",
                config.utc_offset_hours.to_string(),
            )
        })?;
        let reference_cache = ReferenceCache::new(config.reference_cache_ttl);

        Ok(Self {
            config,
            store,
            clock,
            reference_cache,
        })
    }
}
