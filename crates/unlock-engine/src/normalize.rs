//! Event normalization: raw events → day-local fragments.
//!
//! Each event is padded, clipped to the window, and split at every local
//! midnight it crosses. Fragments are kept at minute resolution with the
//! start rounded down and the end rounded up, so the door is never locked
//! during any part of an event.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Offset, Timelike, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::InvalidEvent;
use crate::event::{AllDayPolicy, RawEvent};
use crate::types::{TimeInterval, TimeOfDay, Weekday};
use crate::window::{local_midnight, Window};

/// Unordered fragments per weekday, indexed by [`Weekday::index`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayFragments {
    days: [Vec<TimeInterval>; 7],
}

impl DayFragments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, day: Weekday, interval: TimeInterval) {
        self.days[day.index()].push(interval);
    }

    pub fn get(&self, day: Weekday) -> &[TimeInterval] {
        &self.days[day.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.days.iter().map(Vec::len).sum()
    }

    /// Add every fragment of `other`.
    pub fn extend_from(&mut self, other: &DayFragments) {
        for (mine, theirs) in self.days.iter_mut().zip(&other.days) {
            mine.extend_from_slice(theirs);
        }
    }
}

/// Fragments plus the events that were skipped as malformed.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub fragments: DayFragments,
    pub warnings: Vec<InvalidEvent>,
}

/// Normalize `events` into per-weekday fragments for `window`.
///
/// The window's padding widens every timed event; all-day events follow
/// `policy` and are never padded. Malformed events (`end <= start`) are
/// skipped and reported in [`Normalized::warnings`].
pub fn normalize(events: &[RawEvent], window: &Window, policy: AllDayPolicy) -> Normalized {
    let mut out = Normalized::default();

    for event in events {
        if event.end <= event.start {
            out.warnings.push(InvalidEvent {
                summary: event.summary.clone(),
                start: event.start,
                end: event.end,
            });
            continue;
        }

        if event.all_day {
            match policy {
                AllDayPolicy::FullUnlock => push_all_day(&mut out.fragments, event, window),
                AllDayPolicy::Ignore => {
                    debug!(summary = %event.summary, "ignoring all-day event");
                }
            }
        } else {
            push_timed(&mut out.fragments, event, window);
        }
    }

    out
}

fn push_timed(fragments: &mut DayFragments, event: &RawEvent, window: &Window) {
    let padding = window.padding();
    let start = (event.start - padding.before()).max(window.start().with_timezone(&Utc));
    let end = (event.end + padding.after()).min(window.end().with_timezone(&Utc));
    if end <= start {
        return;
    }

    let tz = window.timezone();
    for (date, interval) in split_by_day(start, end, tz) {
        if let Some(day) = day_in_window(window, date) {
            fragments.push(day, interval);
        }
    }
}

fn push_all_day(fragments: &mut DayFragments, event: &RawEvent, window: &Window) {
    let tz = window.timezone();
    let first = event.start.with_timezone(&tz).date_naive();
    let local_end = event.end.with_timezone(&tz);
    // Exclusive end date; a non-midnight end still covers its own date.
    let last = if local_end.time() == chrono::NaiveTime::MIN {
        local_end.date_naive()
    } else {
        local_end.date_naive() + Days::new(1)
    };

    let mut date = first;
    while date < last {
        if let Some(day) = day_in_window(window, date) {
            fragments.push(day, TimeInterval::FULL_DAY);
        }
        date = date + Days::new(1);
    }
}

/// Split the absolute range `[start, end)` at local midnights.
///
/// Each piece is returned with its local date. A piece that runs to the next
/// midnight ends at `24:00`. A piece that lives through a fall-back
/// transition covers both passes of the repeated clock hour.
pub fn split_by_day(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: Tz,
) -> Vec<(NaiveDate, TimeInterval)> {
    let mut pieces = Vec::new();
    let end_local = end.with_timezone(&tz);
    let mut cursor = start.with_timezone(&tz);

    while cursor < end_local {
        let date = cursor.date_naive();
        let next_midnight = local_midnight(date + Days::new(1), tz);
        let (piece_end, mut to) = if end_local >= next_midnight {
            (next_midnight, TimeOfDay::END_OF_DAY)
        } else {
            (end_local, ceil_minute(&end_local))
        };
        let mut from = floor_minute(&cursor);
        if let Some((repeat_start, repeat_end)) = repeated_hour(&cursor, &piece_end, tz) {
            from = from.min(repeat_start);
            to = to.max(repeat_end);
        }
        if let Some(interval) = TimeInterval::new(from, to) {
            pieces.push((date, interval));
        }
        cursor = next_midnight;
    }

    pieces
}

/// Clock range shown twice when the UTC offset steps back inside
/// `[from, to)`, or `None` when it does not.
fn repeated_hour(from: &DateTime<Tz>, to: &DateTime<Tz>, tz: Tz) -> Option<(TimeOfDay, TimeOfDay)> {
    let (mut lo, mut hi) = (from.timestamp(), (*to - Duration::seconds(1)).timestamp());
    if hi <= lo {
        return None;
    }
    let offset_at = |secs: i64| {
        DateTime::from_timestamp(secs, 0).map(|t| t.with_timezone(&tz).offset().fix())
    };
    let before = offset_at(lo)?;
    let after = offset_at(hi)?;
    if after.local_minus_utc() >= before.local_minus_utc() {
        return None;
    }

    // First second on the new offset.
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if offset_at(mid)? == before {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let switch = DateTime::from_timestamp(hi, 0)?;
    let resumed = switch.with_timezone(&tz);
    let left = switch.with_timezone(&before);
    let repeat_end = if left.date_naive() > resumed.date_naive() {
        TimeOfDay::END_OF_DAY
    } else {
        floor_minute(&left)
    };
    Some((floor_minute(&resumed), repeat_end))
}

fn floor_minute<T: Timelike>(t: &T) -> TimeOfDay {
    TimeOfDay::saturating_from(i64::from(t.hour() * 60 + t.minute()))
}

fn ceil_minute<T: Timelike>(t: &T) -> TimeOfDay {
    let whole = i64::from(t.hour() * 60 + t.minute());
    let partial = t.second() > 0 || t.nanosecond() > 0;
    TimeOfDay::saturating_from(whole + i64::from(partial))
}

fn day_in_window(window: &Window, date: NaiveDate) -> Option<Weekday> {
    let offset = (date - window.start_date()).num_days();
    if (0..7).contains(&offset) {
        Some(Weekday::from(date.weekday()))
    } else {
        None
    }
}
