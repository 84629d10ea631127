//! Round-trip verification of produced rows.
//!
//! Rebuilds the open/closed status of every weekday from the rows and
//! compares it with the day intervals the rows were built from. Any
//! disagreement is a defect in decomposition, never a user error, and is
//! reported as [`ScheduleError::InternalConsistency`].

use crate::builder::ScheduleRow;
use crate::error::{Mismatch, Result, ScheduleError};
use crate::merge::DayIntervals;
use crate::schedule::ExceptionEntry;
use crate::types::{CellStatus, TimeOfDay, Weekday};
use crate::window::Window;

/// Mismatches reported in one error, at most.
const MAX_REPORTED: usize = 20;

/// Check that `rows` tile `[00:00, 24:00)` and reproduce `expected` exactly.
///
/// `Partial` cells are resolved through `exceptions` using the concrete date
/// `window` assigns to each weekday; an unresolved `Partial` cell is itself a
/// consistency failure.
pub fn verify_rows(
    rows: &[ScheduleRow],
    expected: &DayIntervals,
    exceptions: &[ExceptionEntry],
    window: &Window,
) -> Result<()> {
    check_coverage(rows)?;

    let mut points: Vec<TimeOfDay> = rows.iter().map(ScheduleRow::start).collect();
    for (_, intervals) in expected.iter() {
        for iv in intervals {
            points.push(iv.start());
            points.push(iv.end());
        }
    }
    points.retain(|t| *t < TimeOfDay::END_OF_DAY);
    points.sort_unstable();
    points.dedup();

    let mut mismatches = Vec::new();
    for day in Weekday::ALL {
        for &at in &points {
            let expected_open = expected.is_open_at(day, at);
            let actual_open = row_open_at(rows, day, at, exceptions, window)?;
            if expected_open != actual_open {
                mismatches.push(Mismatch {
                    weekday: day,
                    at,
                    expected_open,
                    actual_open,
                });
                if mismatches.len() >= MAX_REPORTED {
                    break;
                }
            }
        }
        if mismatches.len() >= MAX_REPORTED {
            break;
        }
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        let summary = mismatches
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(ScheduleError::consistency(
            format!("rows do not match day intervals: {}", summary),
            mismatches,
        ))
    }
}

/// Check `lower ⊆ days ⊆ upper`: the rows never lock during an event and
/// never unlock outside the padding.
pub fn verify_bounds(days: &DayIntervals, lower: &DayIntervals, upper: &DayIntervals) -> Result<()> {
    if !lower.is_subset_of(days) {
        return Err(ScheduleError::consistency(
            "rows leave part of an event locked",
            Vec::new(),
        ));
    }
    if !days.is_subset_of(upper) {
        return Err(ScheduleError::consistency(
            "rows unlock beyond the configured padding",
            Vec::new(),
        ));
    }
    Ok(())
}

/// Rows must start at 00:00, end at 24:00, abut each other, and differ from
/// their neighbour.
fn check_coverage(rows: &[ScheduleRow]) -> Result<()> {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        return Err(ScheduleError::consistency("no rows produced", Vec::new()));
    };
    if first.start() != TimeOfDay::MIDNIGHT || last.end() != TimeOfDay::END_OF_DAY {
        return Err(ScheduleError::consistency(
            format!("rows span {}..{} instead of the full day", first.start(), last.end()),
            Vec::new(),
        ));
    }
    for pair in rows.windows(2) {
        if pair[0].end() != pair[1].start() {
            return Err(ScheduleError::consistency(
                format!(
                    "gap or overlap between rows {} and {}",
                    pair[0].interval, pair[1].interval
                ),
                Vec::new(),
            ));
        }
        if pair[0].cells == pair[1].cells {
            return Err(ScheduleError::consistency(
                format!(
                    "adjacent rows {} and {} share a status vector",
                    pair[0].interval, pair[1].interval
                ),
                Vec::new(),
            ));
        }
    }
    Ok(())
}

fn row_open_at(
    rows: &[ScheduleRow],
    day: Weekday,
    at: TimeOfDay,
    exceptions: &[ExceptionEntry],
    window: &Window,
) -> Result<bool> {
    let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.interval.contains(at)) else {
        return Ok(false);
    };
    match row.status(day) {
        CellStatus::Open => Ok(true),
        CellStatus::Closed => Ok(false),
        CellStatus::Partial => {
            let date = window.date_of(day);
            exceptions
                .iter()
                .find(|e| e.row == index && e.date == date)
                .map(|e| e.status == CellStatus::Open)
                .ok_or_else(|| {
                    ScheduleError::consistency(
                        format!("partial cell {} {} has no exception for {}", day, row.interval, date),
                        Vec::new(),
                    )
                })
        }
    }
}
