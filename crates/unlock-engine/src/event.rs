//! Raw calendar events as handed over by a calendar source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One concrete event occurrence. Recurrence is already expanded.
///
/// All-day events carry the instants of local midnight at the start date and
/// at the (exclusive) end date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
}

impl RawEvent {
    pub fn timed(summary: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            summary: summary.into(),
            start,
            end,
            all_day: false,
        }
    }

    pub fn all_day(summary: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            summary: summary.into(),
            start,
            end,
            all_day: true,
        }
    }

    /// Whether a source should hand this event over for `[time_min, time_max)`.
    ///
    /// Malformed events (`end <= start`) are kept when they start in range so
    /// the normalizer can report them.
    pub fn is_relevant(&self, time_min: DateTime<Utc>, time_max: DateTime<Utc>) -> bool {
        if self.end <= self.start {
            self.start >= time_min && self.start < time_max
        } else {
            self.start < time_max && self.end > time_min
        }
    }
}

/// What an all-day event means for the door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllDayPolicy {
    /// Unlock `[00:00, 24:00)` on every day the event covers.
    FullUnlock,
    /// Leave the door schedule untouched.
    #[default]
    Ignore,
}

impl std::str::FromStr for AllDayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full-unlock" | "full_unlock" | "unlock" => Ok(AllDayPolicy::FullUnlock),
            "ignore" | "ignored" => Ok(AllDayPolicy::Ignore),
            other => Err(format!(
                "unknown all-day policy '{}' (expected full-unlock or ignore)",
                other
            )),
        }
    }
}
