//! Application state for the HTTP server.

use std::sync::Arc;

use unlock_engine::{CalendarSource, Settings};

/// Shared, read-only state. Every request builds its own schedule.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub source: Arc<dyn CalendarSource>,
}

impl AppState {
    pub fn new(settings: Settings, source: Arc<dyn CalendarSource>) -> Self {
        Self {
            settings: Arc::new(settings),
            source,
        }
    }
}
