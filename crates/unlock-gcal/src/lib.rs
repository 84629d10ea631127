//! # unlock-gcal
//!
//! Google Calendar as a [`CalendarSource`](unlock_engine::CalendarSource).
//!
//! Events are listed with `singleEvents=true`, so Google expands recurring
//! events server-side and the engine only ever sees concrete occurrences.
//!
//! ## Modules
//!
//! - [`auth`] — Credential discovery
//! - [`service_account`] — JWT bearer sign-in for service account keys
//! - [`client`] — Paged `events.list` client

pub mod auth;
pub mod client;
pub mod service_account;

pub use auth::{load_credentials, AccessToken, Credentials, TOKEN_ENV};
pub use client::{GoogleCalendarClient, DEFAULT_BASE_URL};
pub use service_account::{ServiceAccountAuth, ServiceAccountKey, CALENDAR_READONLY_SCOPE};
