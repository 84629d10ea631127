//! # unlock-engine
//!
//! Weekly door unlock schedules from calendar events.
//!
//! A door controller holds a small table of rows, each a time-of-day range
//! with an open/closed flag per weekday. This crate turns one week of
//! calendar events into such a table, proves the table reproduces the
//! events exactly, and renders it for the controller and for people.
//!
//! ## Modules
//!
//! - [`window`] — Sunday-to-Saturday window, padding, local midnights
//! - [`event`] — Raw events and the all-day policy
//! - [`normalize`] — Events → day-local minute fragments
//! - [`merge`] — Fragments → disjoint intervals per weekday
//! - [`boundary`] — Global boundary set and elementary segments
//! - [`builder`] — Segments → merged schedule rows
//! - [`optimize`] — Fewer rows by using the padding as slack
//! - [`verify`] — Round-trip check of rows against intervals
//! - [`schedule`] — The end-to-end pipeline
//! - [`source`] — Calendar collaborators and the Google event format
//! - [`expand`] — RRULE expansion for exported calendars
//! - [`report`] — CSV, text and HTML rendering
//! - [`config`] — Environment-driven settings
//! - [`error`] — Error types

pub mod boundary;
pub mod builder;
pub mod config;
pub mod error;
pub mod event;
pub mod expand;
pub mod merge;
pub mod normalize;
pub mod optimize;
pub mod report;
pub mod schedule;
pub mod source;
pub mod types;
pub mod verify;
pub mod window;

pub use builder::{build_rows, ScheduleRow};
pub use config::Settings;
pub use error::{InvalidEvent, ScheduleError, SourceError};
pub use event::{AllDayPolicy, RawEvent};
pub use merge::DayIntervals;
pub use schedule::{generate, run, BuildMode, GenerateOptions, WeeklySchedule};
pub use source::{CalendarSource, JsonFileSource, MemorySource};
pub use types::{CellStatus, TimeInterval, TimeOfDay, Weekday};
pub use window::{Padding, Window};
