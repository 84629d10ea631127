//! Error types for unlock-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::{TimeOfDay, Weekday};

/// Failure reported by a calendar collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Authentication or permission failure (bad token, calendar not shared).
    #[error("Calendar access denied: {0}")]
    Access(String),

    /// Network failure, rate limiting or provider outage.
    #[error("Calendar temporarily unavailable: {0}")]
    Transient(String),

    /// The provider answered with something we cannot interpret.
    #[error("Malformed calendar data: {0}")]
    Malformed(String),
}

/// One cell where the rows disagree with the day intervals they were built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub weekday: Weekday,
    pub at: TimeOfDay,
    pub expected_open: bool,
    pub actual_open: bool,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} expected={} actual={}",
            self.weekday,
            self.at,
            u8::from(self.expected_open),
            u8::from(self.actual_open)
        )
    }
}

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(
        "This week needs {needed} unlock intervals but the controller supports only {max}; \
         standardize event times or reduce variability"
    )]
    TooManyIntervals { needed: usize, max: usize },

    #[error("Internal consistency failure: {detail}")]
    InternalConsistency {
        detail: String,
        mismatches: Vec<Mismatch>,
    },
}

impl ScheduleError {
    /// True for errors caused by caller input rather than collaborators or defects.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ScheduleError::InvalidDate(_)
                | ScheduleError::InvalidTimezone(_)
                | ScheduleError::InvalidConfig(_)
                | ScheduleError::TooManyIntervals { .. }
        )
    }

    pub(crate) fn consistency(detail: impl Into<String>, mismatches: Vec<Mismatch>) -> Self {
        ScheduleError::InternalConsistency {
            detail: detail.into(),
            mismatches,
        }
    }
}

/// A malformed event. Skipped with a warning; never aborts a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Skipped event '{summary}': end {end} is not after start {start}")]
pub struct InvalidEvent {
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
