//! End-to-end schedule generation.
//!
//! normalize → merge → build (maximal or optimized) → verify.
//!
//! Every call owns all of its intermediate structures, so concurrent
//! requests with different settings never share state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::builder::{build_rows, unlock_row_count, ScheduleRow};
use crate::error::{InvalidEvent, Result, ScheduleError};
use crate::event::{AllDayPolicy, RawEvent};
use crate::merge::DayIntervals;
use crate::normalize::normalize;
use crate::optimize::optimize;
use crate::source::CalendarSource;
use crate::types::{CellStatus, Weekday};
use crate::verify::{verify_bounds, verify_rows};
use crate::window::{Padding, Window};

/// Interval slots on a typical door controller.
pub const DEFAULT_MAX_INTERVALS: usize = 8;

/// Which row construction produced a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Maximal,
    Optimized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    pub optimize: bool,
    pub all_day: AllDayPolicy,
    /// Unlock rows the controller can hold.
    pub max_intervals: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            optimize: false,
            all_day: AllDayPolicy::default(),
            max_intervals: DEFAULT_MAX_INTERVALS,
        }
    }
}

/// A concrete date whose cell in `row` is `Partial`, with its actual status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionEntry {
    pub date: NaiveDate,
    pub weekday: Weekday,
    /// Index into [`WeeklySchedule::rows`].
    pub row: usize,
    pub status: CellStatus,
}

/// Result of one schedule computation.
#[derive(Debug, Clone)]
pub struct WeeklySchedule {
    pub window: Window,
    pub mode: BuildMode,
    pub rows: Vec<ScheduleRow>,
    /// Always empty for a single-week window.
    pub exceptions: Vec<ExceptionEntry>,
    /// The day intervals the rows were verified against.
    pub days: DayIntervals,
    pub warnings: Vec<InvalidEvent>,
}

impl WeeklySchedule {
    pub fn unlock_rows(&self) -> impl Iterator<Item = &ScheduleRow> + '_ {
        self.rows.iter().filter(|r| r.is_unlock())
    }

    pub fn unlock_row_count(&self) -> usize {
        unlock_row_count(&self.rows)
    }
}

/// Build and verify the weekly schedule for `events`.
///
/// The window's padding widens timed events. In default mode the rows encode
/// the padded intervals exactly; if they need more unlock rows than
/// `options.max_intervals`, the optimizer is tried before giving up with
/// [`ScheduleError::TooManyIntervals`].
pub fn generate(
    events: &[RawEvent],
    window: &Window,
    options: &GenerateOptions,
) -> Result<WeeklySchedule> {
    let unpadded = normalize(events, &window.with_padding(Padding::NONE), options.all_day);
    for invalid in &unpadded.warnings {
        warn!(%invalid, "skipping malformed event");
    }
    let required = DayIntervals::from_fragments(&unpadded.fragments);
    // Padded time always includes the event itself.
    let allowed = if window.padding().is_zero() {
        required.clone()
    } else {
        let mut padded = normalize(events, window, options.all_day).fragments;
        padded.extend_from(&unpadded.fragments);
        DayIntervals::from_fragments(&padded)
    };

    let (mode, days, rows) = if options.optimize {
        optimized(&required, &allowed)?
    } else {
        let rows = build_rows(&allowed);
        let needed = unlock_row_count(&rows);
        if needed > options.max_intervals {
            info!(
                needed,
                max = options.max_intervals,
                "maximal decomposition exceeds controller slots; retrying with optimizer"
            );
            optimized(&required, &allowed)?
        } else {
            (BuildMode::Maximal, allowed, rows)
        }
    };

    let needed = unlock_row_count(&rows);
    if needed > options.max_intervals {
        return Err(ScheduleError::TooManyIntervals {
            needed,
            max: options.max_intervals,
        });
    }

    let exceptions = Vec::new();
    verify_rows(&rows, &days, &exceptions, window)?;
    debug!(rows = rows.len(), unlock_rows = needed, ?mode, "schedule verified");

    Ok(WeeklySchedule {
        window: window.clone(),
        mode,
        rows,
        exceptions,
        days,
        warnings: unpadded.warnings,
    })
}

fn optimized(
    required: &DayIntervals,
    allowed: &DayIntervals,
) -> Result<(BuildMode, DayIntervals, Vec<ScheduleRow>)> {
    let result = optimize(required, allowed)?;
    verify_bounds(&result.days, required, allowed)?;
    let mode = if result.improved {
        BuildMode::Optimized
    } else {
        BuildMode::Maximal
    };
    Ok((mode, result.days, result.rows))
}

/// Fetch the window's events from `source` and generate the schedule.
///
/// Collaborator failures propagate unchanged as [`ScheduleError::Source`].
pub async fn run(
    source: &dyn CalendarSource,
    calendar_id: &str,
    window: &Window,
    options: &GenerateOptions,
) -> Result<WeeklySchedule> {
    let (time_min, time_max) = window.fetch_range();
    let events = source.fetch_events(calendar_id, time_min, time_max).await?;
    info!(
        calendar_id,
        events = events.len(),
        window_start = %window.start(),
        "fetched calendar events"
    );
    generate(&events, window, options)
}
