//! Padding-aware row optimization.
//!
//! Padding turns each event's unlock window into a range of acceptable
//! windows: the door must be open for the event itself (the *required*
//! intervals) and may be open anywhere inside the padded envelope (the
//! *allowed* intervals), never outside it.
//!
//! The maximal-interval builder works on the allowed intervals exactly. The
//! optimizer instead treats every run's start and end as movable within
//! that slack and snaps them onto as few distinct times of day as possible.
//! Fewer distinct boundaries across the week means fewer atomic segments
//! and, in practice, fewer rows. Closed gaps inside one allowed run are
//! collapsed, since padding already closes them.
//!
//! With zero padding the allowed and required intervals coincide and the
//! output equals the maximal-interval result.

use std::collections::BTreeSet;

use tracing::debug;

use crate::builder::{build_rows, unlock_row_count, ScheduleRow};
use crate::error::{Result, ScheduleError};
use crate::merge::DayIntervals;
use crate::types::{TimeInterval, TimeOfDay, Weekday};

/// Rows produced by the optimizer together with the day intervals they encode.
#[derive(Debug, Clone, PartialEq)]
pub struct Optimized {
    /// Snapped intervals; always `required ⊆ days ⊆ allowed`.
    pub days: DayIntervals,
    pub rows: Vec<ScheduleRow>,
    /// False when snapping did not beat the maximal-interval rows and those
    /// were returned instead.
    pub improved: bool,
}

/// Inclusive range of acceptable positions for one run endpoint.
#[derive(Debug, Clone, Copy)]
struct Slack {
    lo: TimeOfDay,
    hi: TimeOfDay,
}

#[derive(Debug, Clone, Copy)]
struct FlexRun {
    day: Weekday,
    start: Slack,
    end: Slack,
}

/// Build rows for `required` using the slack up to `allowed`.
///
/// Fails with [`ScheduleError::InternalConsistency`] if `required` is not
/// contained in `allowed`, which would mean the caller padded incorrectly.
pub fn optimize(required: &DayIntervals, allowed: &DayIntervals) -> Result<Optimized> {
    if !required.is_subset_of(allowed) {
        return Err(ScheduleError::consistency(
            "required intervals are not contained in the padded intervals",
            Vec::new(),
        ));
    }

    let baseline = build_rows(allowed);
    let runs = flex_runs(required, allowed);
    let points = stab(&runs);

    let snapped = DayIntervals::from_days(runs.iter().filter_map(|run| {
        let start = latest_point(&points, run.start)?;
        let end = earliest_point(&points, run.end)?;
        Some((run.day, vec![TimeInterval::new(start, end)?]))
    }));
    let rows = build_rows(&snapped);

    debug!(
        baseline_rows = baseline.len(),
        optimized_rows = rows.len(),
        boundary_points = points.len(),
        "optimizer finished"
    );

    let key = |r: &[ScheduleRow]| (r.len(), unlock_row_count(r));
    if key(rows.as_slice()) < key(baseline.as_slice()) {
        Ok(Optimized {
            days: snapped,
            rows,
            improved: true,
        })
    } else {
        Ok(Optimized {
            days: allowed.clone(),
            rows: baseline,
            improved: false,
        })
    }
}

/// One flexible run per allowed run that contains required time.
fn flex_runs(required: &DayIntervals, allowed: &DayIntervals) -> Vec<FlexRun> {
    let mut runs = Vec::new();
    for (day, envelopes) in allowed.iter() {
        for envelope in envelopes {
            let inside: Vec<&TimeInterval> = required
                .get(day)
                .iter()
                .filter(|r| envelope.covers(r.start(), r.end()))
                .collect();
            let (Some(first), Some(last)) = (inside.first(), inside.last()) else {
                // Padding spilled in from outside the window; nothing is required here.
                continue;
            };
            runs.push(FlexRun {
                day,
                start: Slack {
                    lo: envelope.start(),
                    hi: first.start(),
                },
                end: Slack {
                    lo: last.end(),
                    hi: envelope.end(),
                },
            });
        }
    }
    runs
}

/// Fewest points such that every slack range contains at least one.
///
/// `00:00` and `24:00` are boundaries regardless, so they are seeded for
/// free. The rest is the classic greedy stabbing by right end.
fn stab(runs: &[FlexRun]) -> BTreeSet<TimeOfDay> {
    let mut points: BTreeSet<TimeOfDay> = [TimeOfDay::MIDNIGHT, TimeOfDay::END_OF_DAY].into();

    let mut ranges: Vec<Slack> = runs.iter().flat_map(|r| [r.start, r.end]).collect();
    ranges.sort_by_key(|s| (s.hi, s.lo));

    for range in ranges {
        if points.range(range.lo..=range.hi).next().is_none() {
            points.insert(range.hi);
        }
    }
    points
}

/// Latest chosen point inside `slack`: starts unlock as late as possible.
fn latest_point(points: &BTreeSet<TimeOfDay>, slack: Slack) -> Option<TimeOfDay> {
    points
        .range(slack.lo..=slack.hi)
        .next_back()
        .copied()
}

/// Earliest chosen point inside `slack`: ends relock as early as possible.
fn earliest_point(points: &BTreeSet<TimeOfDay>, slack: Slack) -> Option<TimeOfDay> {
    points
        .range(slack.lo..=slack.hi)
        .next()
        .copied()
}
