//! Per-day interval merging.
//!
//! Sorts a day's fragments by start time, then merges overlapping or
//! touching fragments into one run. Intervals that end exactly where the
//! next begins leave no gap, so they are merged too.

use serde::{Deserialize, Serialize};

use crate::normalize::DayFragments;
use crate::types::{TimeInterval, TimeOfDay, Weekday};

/// Disjoint, non-touching, sorted intervals per weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayIntervals {
    days: [Vec<TimeInterval>; 7],
}

impl DayIntervals {
    /// Merge every day of `fragments`.
    pub fn from_fragments(fragments: &DayFragments) -> Self {
        let mut out = Self::default();
        for day in Weekday::ALL {
            out.days[day.index()] = merge_day(fragments.get(day));
        }
        out
    }

    /// Build from arbitrary per-day lists, merging each.
    pub fn from_days<I>(days: I) -> Self
    where
        I: IntoIterator<Item = (Weekday, Vec<TimeInterval>)>,
    {
        let mut fragments = DayFragments::new();
        for (day, intervals) in days {
            for interval in intervals {
                fragments.push(day, interval);
            }
        }
        Self::from_fragments(&fragments)
    }

    pub fn get(&self, day: Weekday) -> &[TimeInterval] {
        &self.days[day.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[TimeInterval])> + '_ {
        Weekday::ALL
            .iter()
            .map(move |day| (*day, self.days[day.index()].as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }

    /// Whether `day` is open on the whole segment `[start, end)`.
    ///
    /// Segments produced from the boundary set never straddle an interval
    /// edge, so "covered" and "intersects" agree for them.
    pub fn is_open(&self, day: Weekday, start: TimeOfDay, end: TimeOfDay) -> bool {
        self.get(day).iter().any(|iv| iv.covers(start, end))
    }

    /// Whether `day` is open at the minute starting at `t`.
    pub fn is_open_at(&self, day: Weekday, t: TimeOfDay) -> bool {
        self.get(day).iter().any(|iv| iv.contains(t))
    }

    /// True when every open minute of `self` is also open in `other`.
    pub fn is_subset_of(&self, other: &DayIntervals) -> bool {
        Weekday::ALL.iter().all(|day| {
            self.get(*day)
                .iter()
                .all(|iv| other.get(*day).iter().any(|o| o.covers(iv.start(), iv.end())))
        })
    }
}

/// Merge one day's fragments into sorted, disjoint, non-touching intervals.
pub fn merge_day(fragments: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut sorted = fragments.to_vec();
    sorted.sort_by_key(|iv| (iv.start(), iv.end()));

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        if let Some(last) = merged.last_mut() {
            if iv.start() <= last.end() {
                // Overlapping or touching; extend the current run.
                if iv.end() > last.end() {
                    if let Some(extended) = TimeInterval::new(last.start(), iv.end()) {
                        *last = extended;
                    }
                }
                continue;
            }
        }
        merged.push(iv);
    }
    merged
}
