//! Week-wide time-of-day boundaries.

use crate::merge::DayIntervals;
use crate::types::TimeOfDay;

/// Sorted, distinct boundaries of every interval on every day, plus the
/// `00:00` and `24:00` sentinels.
///
/// Consecutive boundaries delimit atomic segments: within one segment every
/// weekday is either open throughout or closed throughout.
pub fn collect_boundaries(days: &DayIntervals) -> Vec<TimeOfDay> {
    let mut boundaries = vec![TimeOfDay::MIDNIGHT, TimeOfDay::END_OF_DAY];
    for (_, intervals) in days.iter() {
        for iv in intervals {
            boundaries.push(iv.start());
            boundaries.push(iv.end());
        }
    }
    boundaries.sort_unstable();
    boundaries.dedup();
    boundaries
}

/// Consecutive boundary pairs `(b_i, b_{i+1})`.
pub fn segments(boundaries: &[TimeOfDay]) -> impl Iterator<Item = (TimeOfDay, TimeOfDay)> + '_ {
    boundaries.windows(2).map(|w| (w[0], w[1]))
}
