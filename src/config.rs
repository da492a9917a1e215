//! Application configuration loaded from environment variables.
//!
//! Everything here is read once at startup and is read-only afterwards.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::time_utils::CivilClock;

/// Points credited per strength session when ranking alongside cardio points.
pub const DEFAULT_STRENGTH_SESSION_WEIGHT: f64 = 20.0;
/// Challenges run on Korean civil days.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FEEDBACK_CONCURRENCY: usize = 5;
pub const DEFAULT_REFERENCE_CACHE_TTL_SECS: u64 = 300;

/// Which store implementation backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// In-process store, empty at startup. Local development only.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL (allowed CORS origin)
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Store implementation
    pub store_backend: StoreBackend,

    // --- Aggregation policy ---
    /// Fixed UTC offset (hours) defining civil days
    pub utc_offset_hours: i32,
    /// Points per credited strength session
    pub strength_session_weight: f64,

    // --- Resource limits ---
    /// Timeout applied to every store call
    pub store_timeout: Duration,
    /// Maximum in-flight feedback lookups per request
    pub feedback_concurrency: usize,
    /// TTL for cached challenge metadata and category maps (zero disables)
    pub reference_cache_ttl: Duration,

    // --- Secrets ---
    /// JWT signing key for coach session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            strength_session_weight: DEFAULT_STRENGTH_SESSION_WEIGHT,
            store_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
            feedback_concurrency: DEFAULT_FEEDBACK_CONCURRENCY,
            reference_cache_ttl: Duration::from_secs(DEFAULT_REFERENCE_CACHE_TTL_SECS),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

impl Config {
    /// Config used by tests.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let config = Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_or("PORT", 8080)?,
            store_backend: match env::var("STORE_BACKEND") {
                Ok(raw) => raw.parse()?,
                Err(_) => StoreBackend::Firestore,
            },
            utc_offset_hours: parse_or("CHALLENGE_UTC_OFFSET_HOURS", DEFAULT_UTC_OFFSET_HOURS)?,
            strength_session_weight: parse_or(
                "STRENGTH_SESSION_WEIGHT",
                DEFAULT_STRENGTH_SESSION_WEIGHT,
            )?,
            store_timeout: Duration::from_secs(parse_or(
                "STORE_TIMEOUT_SECS",
                DEFAULT_STORE_TIMEOUT_SECS,
            )?),
            feedback_concurrency: parse_or("FEEDBACK_CONCURRENCY", DEFAULT_FEEDBACK_CONCURRENCY)?,
            reference_cache_ttl: Duration::from_secs(parse_or(
                "REFERENCE_CACHE_TTL_SECS",
                DEFAULT_REFERENCE_CACHE_TTL_SECS,
            )?),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock().is_none() {
            return Err(ConfigError::Invalid(
                "CHALLENGE_UTC_OFFSET_HOURS",
                self.utc_offset_hours.to_string(),
            ));
        }
        if !self.strength_session_weight.is_finite() || self.strength_session_weight < 0.0 {
            return Err(ConfigError::Invalid(
                "STRENGTH_SESSION_WEIGHT",
                self.strength_session_weight.to_string(),
            ));
        }
        if self.feedback_concurrency == 0 {
            return Err(ConfigError::Invalid("FEEDBACK_CONCURRENCY", "0".to_string()));
        }
        if self.store_timeout.is_zero() {
            return Err(ConfigError::Invalid("STORE_TIMEOUT_SECS", "0".to_string()));
        }
        Ok(())
    }

    /// Civil clock for the configured offset, `None` if the offset is invalid.
    pub fn clock(&self) -> Option<CivilClock> {
        CivilClock::from_hours(self.utc_offset_hours)
    }
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
