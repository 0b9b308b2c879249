//! Trash retention policy: purge cutoff and the days-left countdown.
//!
//! Everything here is a pure function of its inputs so the countdown and the
//! sweep cutoff can be tested without a clock.

use serde::Serialize;

/// Default retention window for trashed tasks, in days.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Cutoff timestamp for a sweep: rows with `deleted_at` strictly older than
/// this are purge-eligible.
pub fn purge_cutoff(now_ms: i64, retention_days: i64) -> i64 {
    now_ms - retention_days * DAY_MS
}

/// Days until a trashed task is permanently deleted, rounded up.
///
/// Zero or negative means the task is past (or within a day of) its purge
/// deadline.
pub fn days_until_purge(deleted_at_ms: i64, now_ms: i64, retention_days: i64) -> i64 {
    let remaining_ms = deleted_at_ms + retention_days * DAY_MS - now_ms;
    if remaining_ms > 0 {
        (remaining_ms + DAY_MS - 1) / DAY_MS
    } else {
        // Truncating division rounds toward zero, which is ceil for negatives.
        remaining_ms / DAY_MS
    }
}

/// Urgency tier for the trash countdown indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionTier {
    /// Zero or fewer days remain; the next sweep may remove the row.
    Imminent,
    /// One to three days remain.
    Warning,
    /// More than three days remain.
    Notice,
}

/// Countdown state for one trashed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetentionStatus {
    pub days_left: i64,
    pub tier: RetentionTier,
}

impl RetentionStatus {
    /// Human-readable countdown label, singular/plural as appropriate.
    pub fn label(&self) -> String {
        match self.tier {
            RetentionTier::Imminent => "Will be permanently deleted soon".to_string(),
            _ => format!(
                "{} day{} left until permanent deletion",
                self.days_left,
                if self.days_left == 1 { "" } else { "s" }
            ),
        }
    }
}

/// Compute the countdown state for a trashed task.
pub fn retention_status(deleted_at_ms: i64, now_ms: i64, retention_days: i64) -> RetentionStatus {
    let days_left = days_until_purge(deleted_at_ms, now_ms, retention_days);
    let tier = if days_left <= 0 {
        RetentionTier::Imminent
    } else if days_left <= 3 {
        RetentionTier::Warning
    } else {
        RetentionTier::Notice
    };
    RetentionStatus { days_left, tier }
}
