//! Sunday-to-Saturday scheduling window.
//!
//! The window starts at local midnight of the Sunday on or before the
//! reference date and ends seven calendar days later. Both ends are computed
//! from local dates, so a DST transition inside the week does not shift the
//! Saturday boundary.

use chrono::{DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::types::Weekday;

/// Minutes to unlock early and relock late around every timed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub before_min: u32,
    pub after_min: u32,
}

impl Padding {
    pub const NONE: Padding = Padding {
        before_min: 0,
        after_min: 0,
    };

    pub fn new(before_min: u32, after_min: u32) -> Self {
        Self {
            before_min,
            after_min,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.before_min == 0 && self.after_min == 0
    }

    pub fn before(&self) -> Duration {
        Duration::minutes(i64::from(self.before_min))
    }

    pub fn after(&self) -> Duration {
        Duration::minutes(i64::from(self.after_min))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    start_date: NaiveDate,
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    padding: Padding,
}

impl Window {
    /// Window containing `reference`.
    pub fn containing(reference: NaiveDate, tz: Tz, padding: Padding) -> Self {
        let start_date = week_start(reference);
        let end_date = start_date + Days::new(7);
        Self {
            start_date,
            start: local_midnight(start_date, tz),
            end: local_midnight(end_date, tz),
            padding,
        }
    }

    /// Window containing today's date in `tz`.
    pub fn current(tz: Tz, padding: Padding) -> Self {
        Self::containing(Utc::now().with_timezone(&tz).date_naive(), tz, padding)
    }

    /// Window for an optional `YYYY-MM-DD` reference, defaulting to today.
    pub fn from_arg(reference: Option<&str>, tz: Tz, padding: Padding) -> Result<Self> {
        match reference {
            Some(raw) => Ok(Self::containing(parse_date(raw)?, tz, padding)),
            None => Ok(Self::current(tz, padding)),
        }
    }

    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn timezone(&self) -> Tz {
        self.start.timezone()
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Same dates and timezone, different padding.
    pub fn with_padding(&self, padding: Padding) -> Self {
        Self {
            padding,
            ..self.clone()
        }
    }

    /// The concrete date that maps to `day` in this window.
    pub fn date_of(&self, day: Weekday) -> NaiveDate {
        self.start_date + Days::new(day.index() as u64)
    }

    /// The seven dates of the window, Sunday first.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        Weekday::ALL.iter().map(|d| self.date_of(*d))
    }

    /// Range to request from the calendar. Widened by the padding so events
    /// just outside the window whose padding reaches into it are included.
    pub fn fetch_range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.start.with_timezone(&Utc) - self.padding.after(),
            self.end.with_timezone(&Utc) + self.padding.before(),
        )
    }
}

/// Most recent Sunday on or before `reference`.
pub fn week_start(reference: NaiveDate) -> NaiveDate {
    reference - Days::new(u64::from(reference.weekday().num_days_from_sunday()))
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(raw.to_string()))
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse()
        .map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))
}

/// First instant of `date` in `tz`.
///
/// Ambiguous midnights take the earlier instant. When midnight falls in a
/// DST gap the first valid minute after it is used.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    let mut candidate = midnight;
    // DST gaps are at most a few hours.
    for _ in 0..=(24 * 60) {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(t) => return t,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => candidate += Duration::minutes(1),
        }
    }
    tz.from_utc_datetime(&midnight)
}
