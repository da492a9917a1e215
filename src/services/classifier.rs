// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout classification: category -> type -> cardio/strength.

use std::collections::HashMap;

use crate::models::{WorkoutCategory, WorkoutKind, WorkoutType};

/// Two-hop lookup from a workout category to its coarse kind.
#[derive(Debug, Clone, Default)]
pub struct WorkoutClassifier {
    category_types: HashMap<String, String>,
    type_kinds: HashMap<String, WorkoutKind>,
}

impl WorkoutClassifier {
    /// Build the lookup tables from the raw category and type rows.
    ///
    /// Types other than cardio/strength are left out, so their categories
    /// classify as unknown.
    pub fn from_maps(categories: &[WorkoutCategory], types: &[WorkoutType]) -> Self {
        let category_types = categories
            .iter()
            .map(|c| (c.id.clone(), c.type_id.clone()))
            .collect();
        let type_kinds = types
            .iter()
            .filter_map(|t| WorkoutKind::from_type_name(&t.name).map(|kind| (t.id.clone(), kind)))
            .collect();

        Self {
            category_types,
            type_kinds,
        }
    }

    /// Kind of a category, `None` if either hop is missing.
    pub fn lookup(&self, category_id: &str) -> Option<WorkoutKind> {
        let type_id = self.category_types.get(category_id)?;
        self.type_kinds.get(type_id).copied()
    }

    /// Kind of a category, `Unknown` if it cannot be resolved.
    pub fn classify(&self, category_id: &str) -> WorkoutKind {
        self.lookup(category_id).unwrap_or(WorkoutKind::Unknown)
    }

    pub fn category_count(&self) -> usize {
        self.category_types.len()
    }
}
