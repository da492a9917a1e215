// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Short-TTL cache for reference data.
//!
//! Only inputs that do not change as workouts are logged live here: challenge
//! metadata and the category/type tables. Totals and leaderboards are always
//! computed fresh.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::models::Challenge;
use crate::services::classifier::WorkoutClassifier;

#[derive(Clone)]
struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// Cache owned by the application state and passed by reference.
pub struct ReferenceCache {
    ttl: Duration,
    challenges: DashMap<String, Entry<Challenge>>,
    // Single slot; keyed by unit so it shares the dashmap entry API.
    classifier: DashMap<(), Entry<Arc<WorkoutClassifier>>>,
}

impl ReferenceCache {
    /// A zero `ttl` disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            challenges: DashMap::new(),
            classifier: DashMap::new(),
        }
    }

    fn is_fresh<T>(&self, entry: &Entry<T>) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }

    pub fn challenge(&self, challenge_id: &str) -> Option<Challenge> {
        let entry = self.challenges.get(challenge_id)?;
        if self.is_fresh(entry.value()) {
            Some(entry.value.clone())
        } else {
            drop(entry);
            self.challenges.remove(challenge_id);
            None
        }
    }

    pub fn store_challenge(&self, challenge: &Challenge) {
        if self.ttl.is_zero() {
            return;
        }
        self.challenges.insert(
            challenge.id.clone(),
            Entry {
                value: challenge.clone(),
                stored_at: Instant::now(),
            },
        );
    }

    pub fn classifier(&self) -> Option<Arc<WorkoutClassifier>> {
        let entry = self.classifier.get(&())?;
        if self.is_fresh(entry.value()) {
            Some(Arc::clone(&entry.value))
        } else {
            drop(entry);
            self.classifier.remove(&());
            None
        }
    }

    pub fn store_classifier(&self, classifier: Arc<WorkoutClassifier>) {
        if self.ttl.is_zero() {
            return;
        }
        self.classifier.insert(
            (),
            Entry {
                value: classifier,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop everything cached for one challenge, plus the shared category
    /// tables (they may have been edited alongside the challenge).
    pub fn invalidate_challenge(&self, challenge_id: &str) {
        let had_challenge = self.challenges.remove(challenge_id).is_some();
        self.classifier.clear();
        tracing::info!(
            challenge_id,
            had_challenge,
            "Invalidated reference cache for challenge"
        );
    }

    pub fn clear(&self) {
        self.challenges.clear();
        self.classifier.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn challenge(id: &str) -> Challenge {
        Challenge {
            id: id.to_string(),
            title: "Winter".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
        }
    }

    #[test]
    fn test_store_and_invalidate_challenge() {
        let cache = ReferenceCache::new(Duration::from_secs(60));
        cache.store_challenge(&challenge("c1"));
        cache.store_challenge(&challenge("c2"));
        cache.store_classifier(Arc::new(WorkoutClassifier::default()));

        assert_eq!(cache.challenge("c1"), Some(challenge("c1")));

        cache.invalidate_challenge("c1");
        assert!(cache.challenge("c1").is_none());
        assert!(cache.challenge("c2").is_some());
        assert!(cache.classifier().is_none());
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let cache = ReferenceCache::new(Duration::ZERO);
        cache.store_challenge(&challenge("c1"));
        cache.store_classifier(Arc::new(WorkoutClassifier::default()));
        assert!(cache.challenge("c1").is_none());
        assert!(cache.classifier().is_none());
    }

    #[test]
    fn test_expired_entries_are_evicted() {
        let cache = ReferenceCache::new(Duration::from_millis(1));
        cache.store_challenge(&challenge("c1"));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.challenge("c1").is_none());
    }

    #[test]
    fn test_clear() {
        let cache = ReferenceCache::new(Duration::from_secs(60));
        cache.store_challenge(&challenge("c1"));
        cache.clear();
        assert!(cache.challenge("c1").is_none());
    }
}
