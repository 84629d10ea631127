//! Calendar collaborators.
//!
//! A [`CalendarSource`] hands the engine concrete, recurrence-expanded
//! events for a time range. Google Calendar's event resource shape is the
//! common wire format: both the live API client and exported JSON files
//! parse through [`GoogleEvent`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::warn;

use crate::error::SourceError;
use crate::event::RawEvent;
use crate::expand::expand_recurrence;
use crate::window::local_midnight;

#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Concrete event occurrences overlapping `[time_min, time_max)`.
    async fn fetch_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>, SourceError>;
}

/// `start` / `end` of a Google Calendar event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    pub date_time: Option<DateTime<FixedOffset>>,
    pub date: Option<NaiveDate>,
    pub time_zone: Option<String>,
}

/// The subset of a Google Calendar event resource the engine needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
    #[serde(default)]
    pub recurrence: Vec<String>,
}

impl GoogleEvent {
    fn title(&self) -> String {
        self.summary.clone().unwrap_or_else(|| "(no title)".to_string())
    }

    /// Convert to raw events inside `[time_min, time_max)`.
    ///
    /// All-day dates are anchored at local midnight in `tz`. Recurring
    /// events are expanded; cancelled events and events with neither a
    /// `dateTime` nor a `date` pair yield nothing.
    pub fn to_raw_events(
        &self,
        tz: Tz,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>, SourceError> {
        if self.status.as_deref() == Some("cancelled") {
            return Ok(Vec::new());
        }
        let title = self.title();

        let events = match (&self.start, &self.end) {
            (
                EventTime {
                    date_time: Some(start),
                    time_zone,
                    ..
                },
                EventTime {
                    date_time: Some(end),
                    ..
                },
            ) => {
                let start = start.with_timezone(&Utc);
                let end = end.with_timezone(&Utc);
                if self.recurrence.is_empty() {
                    vec![RawEvent::timed(title, start, end)]
                } else {
                    let rule_tz = time_zone.clone().unwrap_or_else(|| tz.name().to_string());
                    let rule_tz_parsed: Tz = rule_tz.parse().unwrap_or(tz);
                    let dtstart = start.with_timezone(&rule_tz_parsed).naive_local();
                    let duration = end - start;
                    expand_recurrence(&self.recurrence, dtstart, &rule_tz, duration, time_min, time_max)?
                        .into_iter()
                        .map(|s| RawEvent::timed(title.clone(), s, s + duration))
                        .collect()
                }
            }
            (
                EventTime {
                    date: Some(start), ..
                },
                EventTime { date: Some(end), .. },
            ) => {
                let days = (*end - *start).num_days().max(0) as u64;
                let span = |first: NaiveDate| {
                    RawEvent::all_day(
                        title.clone(),
                        local_midnight(first, tz).with_timezone(&Utc),
                        local_midnight(first + Days::new(days), tz).with_timezone(&Utc),
                    )
                };
                if self.recurrence.is_empty() {
                    vec![span(*start)]
                } else {
                    let dtstart = start.and_time(chrono::NaiveTime::MIN);
                    let duration = chrono::Duration::days(days as i64);
                    expand_recurrence(&self.recurrence, dtstart, tz.name(), duration, time_min, time_max)?
                        .into_iter()
                        .map(|s| span(s.with_timezone(&tz).date_naive()))
                        .collect()
                }
            }
            _ => {
                warn!(summary = %title, "event has no usable start/end; skipping");
                Vec::new()
            }
        };

        Ok(events
            .into_iter()
            .filter(|e| e.is_relevant(time_min, time_max))
            .collect())
    }
}

/// Either a full `events.list` response or a bare array of events.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventsDocument {
    Page { items: Vec<GoogleEvent> },
    List(Vec<GoogleEvent>),
}

/// Parse a Google Calendar events JSON document.
pub fn parse_events_json(json: &str) -> Result<Vec<GoogleEvent>, SourceError> {
    let doc: EventsDocument =
        serde_json::from_str(json).map_err(|e| SourceError::Malformed(e.to_string()))?;
    Ok(match doc {
        EventsDocument::Page { items } => items,
        EventsDocument::List(items) => items,
    })
}

/// Convert parsed Google events into raw events within the range.
pub fn to_raw_events(
    events: &[GoogleEvent],
    tz: Tz,
    time_min: DateTime<Utc>,
    time_max: DateTime<Utc>,
) -> Result<Vec<RawEvent>, SourceError> {
    let mut out = Vec::new();
    for event in events {
        out.extend(event.to_raw_events(tz, time_min, time_max)?);
    }
    out.sort_by_key(|e| (e.start, e.end));
    Ok(out)
}

/// Events from a Google Calendar JSON export on disk.
///
/// The calendar id is ignored: the file is the calendar.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    tz: Tz,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>, tz: Tz) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            tz,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CalendarSource for JsonFileSource {
    async fn fetch_events(
        &self,
        _calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>, SourceError> {
        let json = std::fs::read_to_string(&self.path).map_err(|e| {
            let message = format!("{}: {}", self.path.display(), e);
            match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    SourceError::Access(message)
                }
                _ => SourceError::Transient(message),
            }
        })?;
        let events = parse_events_json(&json)?;
        to_raw_events(&events, self.tz, time_min, time_max)
    }
}

/// Fixed in-memory events, filtered by range on every fetch.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    events: Vec<RawEvent>,
}

impl MemorySource {
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self { events }
    }
}

#[async_trait]
impl CalendarSource for MemorySource {
    async fn fetch_events(
        &self,
        _calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>, SourceError> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.is_relevant(time_min, time_max))
            .cloned()
            .collect())
    }
}
