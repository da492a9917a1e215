// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge week calculator.
//!
//! Weeks run Monday through Sunday in civil dates. Week 1 starts on the
//! Monday on or before the challenge start; the final week is clamped to the
//! challenge end.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::models::WeekBucket;
use crate::time_utils::month_day_label;

const DAYS_PER_WEEK: i64 = 7;

/// The Monday on or before `date`.
pub fn canonical_monday(date: NaiveDate) -> NaiveDate {
    let days_back = match date.weekday() {
        Weekday::Sun => 6,
        weekday => i64::from(weekday.num_days_from_monday()),
    };
    date - Duration::days(days_back)
}

/// 1-based week number of `target`, or `None` if it precedes week 1.
pub fn week_number_of(challenge_start: NaiveDate, target: NaiveDate) -> Option<u32> {
    let first_monday = canonical_monday(challenge_start);
    let days = (target - first_monday).num_days();
    if days < 0 {
        return None;
    }
    u32::try_from(days / DAYS_PER_WEEK + 1).ok()
}

/// Full Monday–Sunday bucket containing `target`.
///
/// Not clamped to any challenge end; use [`all_weeks`] for the clamped final
/// week.
pub fn week_of(challenge_start: NaiveDate, target: NaiveDate) -> Option<WeekBucket> {
    let week_number = week_number_of(challenge_start, target)?;
    let start = canonical_monday(challenge_start)
        + Duration::days(i64::from(week_number - 1) * DAYS_PER_WEEK);
    Some(bucket(week_number, start, start + Duration::days(DAYS_PER_WEEK - 1)))
}

/// All week buckets of a challenge, in order.
///
/// Empty when `challenge_end` precedes week 1.
pub fn all_weeks(challenge_start: NaiveDate, challenge_end: NaiveDate) -> Vec<WeekBucket> {
    let mut weeks = Vec::new();
    let mut start = canonical_monday(challenge_start);
    let mut week_number = 1;

    while start <= challenge_end {
        let end = (start + Duration::days(DAYS_PER_WEEK - 1)).min(challenge_end);
        weeks.push(bucket(week_number, start, end));
        start += Duration::days(DAYS_PER_WEEK);
        week_number += 1;
    }

    weeks
}

fn bucket(week_number: u32, start_date: NaiveDate, end_date: NaiveDate) -> WeekBucket {
    WeekBucket {
        week_number,
        label: format!(
            "{}-{}",
            month_day_label(start_date),
            month_day_label(end_date)
        ),
        start_date,
        end_date,
    }
}
