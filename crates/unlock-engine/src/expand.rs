//! Recurrence expansion for calendar exports that still carry RRULEs.
//!
//! Live calendar APIs expand recurring events server-side; exported event
//! files usually do not. Wraps the `rrule` crate to turn an event's
//! `recurrence` lines (RRULE, EXDATE, RDATE) into concrete occurrence
//! starts inside a fetch range.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rrule::RRuleSet;

use crate::error::SourceError;

/// Upper bound on raw instances per rule, before range filtering.
const MAX_INSTANCES: u16 = 500;

/// Expand `recurrence` starting at local `dtstart` in `timezone`.
///
/// Returns the UTC start of every occurrence whose span
/// `[start, start + duration)` overlaps `[time_min, time_max)`, sorted.
///
/// # Errors
/// Returns `SourceError::Malformed` if the timezone is unknown or the rule
/// lines do not parse.
pub fn expand_recurrence(
    recurrence: &[String],
    dtstart: NaiveDateTime,
    timezone: &str,
    duration: Duration,
    time_min: DateTime<Utc>,
    time_max: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>, SourceError> {
    let _tz: chrono_tz::Tz = timezone
        .parse()
        .map_err(|_| SourceError::Malformed(format!("invalid timezone: {}", timezone)))?;

    let lines: Vec<&str> = recurrence
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Ok(Vec::new());
    }

    // "2026-01-05T08:00:00" → iCalendar "20260105T080000".
    let dtstart_ical = dtstart.format("%Y%m%dT%H%M%S");
    let rrule_text = format!("DTSTART;TZID={}:{}\n{}", timezone, dtstart_ical, lines.join("\n"));

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| SourceError::Malformed(format!("invalid recurrence: {}", e)))?;

    // Occurrences that start before the range may still overlap it.
    let after = (time_min - duration).with_timezone(&rrule::Tz::UTC);
    let before = time_max.with_timezone(&rrule::Tz::UTC);
    let instances = rrule_set.after(after).before(before).all(MAX_INSTANCES);

    let mut starts: Vec<DateTime<Utc>> = instances
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc))
        .filter(|start| *start < time_max && *start + duration > time_min)
        .collect();
    starts.sort();
    starts.dedup();
    Ok(starts)
}
