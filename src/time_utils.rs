// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.
//!
//! Every civil-day boundary in the crate goes through [`CivilClock`]: workout
//! timestamps and week windows are both converted with the same offset, so a
//! workout logged at 23:30 local time is never bucketed into the next day.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, SecondsFormat, Utc,
};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Converts between instants and civil dates in one fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilClock {
    offset: FixedOffset,
}

impl CivilClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Clock for a whole-hour offset east of UTC (e.g. `9` for KST).
    ///
    /// Returns `None` if the offset is out of range (|hours| >= 24).
    pub fn from_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours.checked_mul(3600)?).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Civil date of an instant.
    pub fn civil_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// The instant at which `date` begins (civil midnight).
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let utc = local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        utc.and_utc()
    }

    /// Half-open instant range `[from, to)` covering the civil dates
    /// `start..=end`.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.day_start(start), self.day_start(end + Duration::days(1)))
    }

    /// Today's civil date as of `now`.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.civil_date(now)
    }
}

impl Default for CivilClock {
    /// UTC+9, the offset challenges are run in.
    fn default() -> Self {
        Self::new(FixedOffset::east_opt(9 * 3600).unwrap_or_else(|| Utc.fix()))
    }
}

/// Short "M.D" label for a civil date, without zero padding.
pub fn month_day_label(date: NaiveDate) -> String {
    format!("{}.{}", date.month(), date.day())
}
