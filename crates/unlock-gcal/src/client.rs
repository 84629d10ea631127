//! Google Calendar `events.list` client.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info};
use unlock_engine::source::{to_raw_events, GoogleEvent};
use unlock_engine::{CalendarSource, RawEvent, SourceError};

use crate::auth::{load_credentials, AccessToken, Credentials};
use crate::service_account::{ServiceAccountAuth, ServiceAccountKey};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Events requested per page; the API maximum is 2500.
const PAGE_SIZE: &str = "250";

/// Pages after which a listing is abandoned as runaway.
const MAX_PAGES: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<GoogleEvent>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Calendar source backed by the Google Calendar REST API.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: String,
    auth: Auth,
    tz: Tz,
}

#[derive(Debug, Clone)]
enum Auth {
    Token(AccessToken),
    ServiceAccount(ServiceAccountAuth),
}

impl GoogleCalendarClient {
    /// All-day dates are anchored at local midnight in `tz`.
    pub fn new(token: AccessToken, tz: Tz) -> Self {
        Self::with_auth(Auth::Token(token), tz)
    }

    /// Sign in as a service account, exchanging tokens as they expire.
    pub fn with_service_account(key: ServiceAccountKey, tz: Tz) -> Self {
        Self::with_auth(Auth::ServiceAccount(ServiceAccountAuth::new(key)), tz)
    }

    fn with_auth(auth: Auth, tz: Tz) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            auth,
            tz,
        }
    }

    /// Credentials from `GOOGLE_OAUTH_ACCESS_TOKEN` or `credentials_file`.
    pub fn from_credentials(credentials_file: Option<&Path>, tz: Tz) -> Result<Self, SourceError> {
        let client = match load_credentials(credentials_file, |key| std::env::var(key).ok())? {
            Credentials::Token(token) => Self::new(token, tz),
            Credentials::ServiceAccount(key) => {
                info!(client_email = %key.client_email, "using service account credentials");
                Self::with_service_account(key, tz)
            }
        };
        Ok(client)
    }

    async fn bearer(&self) -> Result<AccessToken, SourceError> {
        match &self.auth {
            Auth::Token(token) => Ok(token.clone()),
            Auth::ServiceAccount(account) => account.token(&self.http).await,
        }
    }

    /// Point the client at another API root, such as a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SourceError::Access(format!("bad calendar API url {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| SourceError::Access(format!("bad calendar API url {}", self.base_url)))?
            .extend(["calendars", calendar_id, "events"]);
        Ok(url)
    }

    async fn fetch_page(
        &self,
        url: &Url,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        page_token: Option<&str>,
    ) -> Result<EventsPage, SourceError> {
        let mut query = vec![
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("maxResults", PAGE_SIZE.to_string()),
            ("timeMin", time_min.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("timeMax", time_max.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let token = self.bearer().await?;
        let response = self
            .http
            .get(url.clone())
            .bearer_auth(token.as_str())
            .query(&query)
            .send()
            .await
            .map_err(|e| SourceError::Transient(format!("calendar request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transient(format!("calendar response interrupted: {}", e)))?;
        serde_json::from_str(&body)
            .map_err(|e| SourceError::Malformed(format!("calendar response: {}", e)))
    }
}

fn status_error(status: StatusCode, body: &str) -> SourceError {
    let detail = format!("calendar API returned {}: {}", status, body.trim());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            SourceError::Access(detail)
        }
        StatusCode::TOO_MANY_REQUESTS => SourceError::Transient(detail),
        s if s.is_server_error() => SourceError::Transient(detail),
        _ => SourceError::Access(detail),
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn fetch_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>, SourceError> {
        let url = self.events_url(calendar_id)?;
        let mut events: Vec<GoogleEvent> = Vec::new();
        let mut page_token: Option<String> = None;

        for page_number in 1..=MAX_PAGES {
            let page = self
                .fetch_page(&url, time_min, time_max, page_token.as_deref())
                .await?;
            debug!(page = page_number, items = page.items.len(), "fetched events page");
            events.extend(page.items);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => {
                    info!(calendar_id, events = events.len(), "listed calendar events");
                    return to_raw_events(&events, self.tz, time_min, time_max);
                }
            }
        }

        Err(SourceError::Malformed(format!(
            "calendar listing did not finish within {} pages",
            MAX_PAGES
        )))
    }
}
