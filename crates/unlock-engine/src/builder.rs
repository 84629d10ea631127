//! Maximal-interval row construction.
//!
//! Every atomic segment between consecutive boundaries gets one status
//! vector (open/closed per weekday). Runs of adjacent segments with equal
//! vectors collapse into a single row. The result covers `[00:00, 24:00)`
//! without gaps or overlaps, and no row can grow in either direction
//! without changing some weekday's status.

use serde::{Deserialize, Serialize};

use crate::boundary::{collect_boundaries, segments};
use crate::merge::DayIntervals;
use crate::types::{CellStatus, StatusVector, TimeInterval, TimeOfDay, Weekday};

/// One output row: a time range shared by all weekdays plus their statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub interval: TimeInterval,
    pub cells: StatusVector,
}

impl ScheduleRow {
    pub fn start(&self) -> TimeOfDay {
        self.interval.start()
    }

    pub fn end(&self) -> TimeOfDay {
        self.interval.end()
    }

    pub fn status(&self, day: Weekday) -> CellStatus {
        self.cells[day.index()]
    }

    /// Rows with any open cell are the ones a door controller must be
    /// programmed with; all-closed rows are implicit.
    pub fn is_unlock(&self) -> bool {
        self.cells.iter().any(|c| *c == CellStatus::Open)
    }

    pub fn open_days(&self) -> impl Iterator<Item = Weekday> + '_ {
        Weekday::ALL
            .iter()
            .copied()
            .filter(move |d| self.status(*d) == CellStatus::Open)
    }
}

/// Status vector of `[start, end)`, which must not straddle any interval edge.
pub fn status_vector(days: &DayIntervals, start: TimeOfDay, end: TimeOfDay) -> StatusVector {
    let mut cells = [CellStatus::Closed; 7];
    for day in Weekday::ALL {
        cells[day.index()] = CellStatus::from_open(days.is_open(day, start, end));
    }
    cells
}

/// Build the minimal row set for `days` under the maximal-interval policy.
pub fn build_rows(days: &DayIntervals) -> Vec<ScheduleRow> {
    let boundaries = collect_boundaries(days);
    let mut rows: Vec<ScheduleRow> = Vec::with_capacity(boundaries.len());

    for (start, end) in segments(&boundaries) {
        let cells = status_vector(days, start, end);
        if let Some(last) = rows.last_mut() {
            if last.cells == cells {
                if let Some(grown) = TimeInterval::new(last.start(), end) {
                    last.interval = grown;
                }
                continue;
            }
        }
        if let Some(interval) = TimeInterval::new(start, end) {
            rows.push(ScheduleRow { interval, cells });
        }
    }

    rows
}

/// Number of rows carrying at least one open cell.
pub fn unlock_row_count(rows: &[ScheduleRow]) -> usize {
    rows.iter().filter(|r| r.is_unlock()).count()
}
