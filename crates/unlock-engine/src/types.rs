//! Value types shared by every stage of the decomposition.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Day of the week in table column order: Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    /// Column index, `Sun = 0 .. Sat = 6`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Weekday> {
        Self::ALL.get(index).copied()
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Weekday::Sun => "Sun",
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Sun => Weekday::Sun,
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Minutes after local midnight. `1440` is the terminal `24:00` boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MINUTES_PER_DAY: u16 = 1440;
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(Self::MINUTES_PER_DAY);

    /// `None` past `24:00`.
    pub fn from_minutes(minutes: u16) -> Option<TimeOfDay> {
        (minutes <= Self::MINUTES_PER_DAY).then_some(TimeOfDay(minutes))
    }

    /// `None` for anything that is not a valid clock time or exactly `24:00`.
    pub fn hm(hour: u16, minute: u16) -> Option<TimeOfDay> {
        if minute >= 60 {
            return None;
        }
        Self::from_minutes(hour.checked_mul(60)?.checked_add(minute)?)
    }

    /// Clamps to the day range, for arithmetic that may run past either end.
    pub fn saturating_from(minutes: i64) -> TimeOfDay {
        TimeOfDay(minutes.clamp(0, i64::from(Self::MINUTES_PER_DAY)) as u16)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> String {
        t.to_string()
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = String;

    /// Accepts `HH:MM`, with `24:00` as the end of day.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got '{}'", s))?;
        let hour: u16 = h.parse().map_err(|_| format!("bad hour in '{}'", s))?;
        let minute: u16 = m.parse().map_err(|_| format!("bad minute in '{}'", s))?;
        TimeOfDay::hm(hour, minute).ok_or_else(|| format!("time out of range: '{}'", s))
    }
}

/// Half-open `[start, end)` range of clock times within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeInterval {
    /// `None` unless `start < end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Option<TimeInterval> {
        (start < end).then_some(TimeInterval { start, end })
    }

    pub const FULL_DAY: TimeInterval = TimeInterval {
        start: TimeOfDay::MIDNIGHT,
        end: TimeOfDay::END_OF_DAY,
    };

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }

    /// True when `[start, end)` lies entirely inside this interval.
    pub fn covers(&self, start: TimeOfDay, end: TimeOfDay) -> bool {
        self.start <= start && end <= self.end
    }

    pub fn contains(&self, t: TimeOfDay) -> bool {
        self.start <= t && t < self.end
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Status of one weekday within one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CellStatus {
    Open,
    /// Reserved for multi-week aggregation, where dates sharing a weekday can
    /// disagree. The concrete dates live in the schedule's exceptions.
    Partial,
    #[default]
    Closed,
}

impl CellStatus {
    pub fn from_open(open: bool) -> CellStatus {
        if open {
            CellStatus::Open
        } else {
            CellStatus::Closed
        }
    }
}

/// Per-weekday statuses of one row, indexed by [`Weekday::index`].
pub type StatusVector = [CellStatus; 7];
