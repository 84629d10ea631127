//! Tests for the Google Calendar client against a mock API server.

use chrono::{DateTime, TimeZone, Utc};
use mockito::Matcher;
use unlock_engine::{CalendarSource, SourceError};
use unlock_gcal::{AccessToken, GoogleCalendarClient, ServiceAccountKey};

// ── Helpers ──────────────────────────────────────────────────────────────

fn range() -> (DateTime<Utc>, DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(2026, 1, 4, 5, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 1, 11, 5, 0, 0).unwrap(),
    )
}

fn client(server: &mockito::ServerGuard) -> GoogleCalendarClient {
    GoogleCalendarClient::new(AccessToken::new("test-token"), chrono_tz::America::New_York)
        .with_base_url(server.url())
}

const PAGE_ONE: &str = r#"{
  "items": [
    {
      "summary": "Choir",
      "start": { "dateTime": "2026-01-06T19:00:00-05:00" },
      "end": { "dateTime": "2026-01-06T21:00:00-05:00" }
    }
  ],
  "nextPageToken": "page-2"
}"#;

const PAGE_TWO: &str = r#"{
  "items": [
    {
      "summary": "Retreat",
      "start": { "date": "2026-01-09" },
      "end": { "date": "2026-01-11" }
    },
    {
      "summary": "Moved",
      "status": "cancelled",
      "start": { "dateTime": "2026-01-07T19:00:00-05:00" },
      "end": { "dateTime": "2026-01-07T21:00:00-05:00" }
    }
  ]
}"#;

// ── Listing ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn pages_are_followed_and_merged() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("GET", "/calendars/primary/events")
        .match_header("authorization", "Bearer test-token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("singleEvents".into(), "true".into()),
            Matcher::UrlEncoded("orderBy".into(), "startTime".into()),
            Matcher::UrlEncoded("timeMin".into(), "2026-01-04T05:00:00Z".into()),
            Matcher::UrlEncoded("timeMax".into(), "2026-01-11T05:00:00Z".into()),
            // No pageToken follows the time range on the first request.
            Matcher::Regex("timeMax=[^&]+$".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PAGE_ONE)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::UrlEncoded("pageToken".into(), "page-2".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(PAGE_TWO)
        .create_async()
        .await;

    let (min, max) = range();
    let events = client(&server).fetch_events("primary", min, max).await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    let summaries: Vec<&str> = events.iter().map(|e| e.summary.as_str()).collect();
    assert_eq!(summaries, vec!["Choir", "Retreat"]);
    assert!(events[1].all_day);
    assert_eq!(events[1].end, Utc.with_ymd_and_hms(2026, 1, 11, 5, 0, 0).unwrap());
}

#[tokio::test]
async fn calendar_ids_are_encoded_in_the_path() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/calendars/family@group.calendar.google.com/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items": []}"#)
        .create_async()
        .await;

    let (min, max) = range();
    let events = client(&server)
        .fetch_events("family@group.calendar.google.com", min, max)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(events.is_empty());
}

// ── Failures ─────────────────────────────────────────────────────────────

async fn failure(status: usize, body: &str) -> SourceError {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .with_status(status)
        .with_body(body)
        .create_async()
        .await;
    let (min, max) = range();
    client(&server)
        .fetch_events("primary", min, max)
        .await
        .unwrap_err()
}

#[tokio::test]
async fn forbidden_is_an_access_error() {
    let err = failure(403, r#"{"error": {"message": "not shared"}}"#).await;
    match err {
        SourceError::Access(msg) => assert!(msg.contains("not shared")),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn missing_calendar_is_an_access_error() {
    assert!(matches!(failure(404, "").await, SourceError::Access(_)));
}

#[tokio::test]
async fn rate_limit_and_outages_are_transient() {
    assert!(matches!(failure(429, "").await, SourceError::Transient(_)));
    assert!(matches!(failure(503, "").await, SourceError::Transient(_)));
}

#[tokio::test]
async fn bad_json_is_malformed() {
    assert!(matches!(failure(200, "<html>").await, SourceError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_server_is_transient() {
    let client = GoogleCalendarClient::new(AccessToken::new("t"), chrono_tz::UTC)
        .with_base_url("http://127.0.0.1:9");
    let (min, max) = range();
    let err = client.fetch_events("primary", min, max).await.unwrap_err();
    assert!(matches!(err, SourceError::Transient(_)));
}

// ── Service accounts ─────────────────────────────────────────────────────

const TEST_KEY_PEM: &str = include_str!("fixtures/test_key.pem");

fn service_account(server: &mockito::ServerGuard) -> GoogleCalendarClient {
    let key: ServiceAccountKey = serde_json::from_value(serde_json::json!({
        "type": "service_account",
        "client_email": "door@hall.iam.gserviceaccount.com",
        "private_key": TEST_KEY_PEM,
        "token_uri": format!("{}/token", server.url()),
    }))
    .unwrap();
    GoogleCalendarClient::with_service_account(key, chrono_tz::America::New_York)
        .with_base_url(server.url())
}

#[tokio::test]
async fn service_account_exchanges_assertion_once() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "grant_type".into(),
                "urn:ietf:params:oauth:grant-type:jwt-bearer".into(),
            ),
            Matcher::Regex("assertion=[A-Za-z0-9_-]+\\.[A-Za-z0-9_-]+\\.[A-Za-z0-9_-]+".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "sa-token", "expires_in": 3599, "token_type": "Bearer"}"#)
        .expect(1)
        .create_async()
        .await;
    let events = server
        .mock("GET", "/calendars/primary/events")
        .match_header("authorization", "Bearer sa-token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(PAGE_TWO)
        .expect(2)
        .create_async()
        .await;

    let client = service_account(&server);
    let (min, max) = range();
    client.fetch_events("primary", min, max).await.unwrap();
    let listed = client.fetch_events("primary", min, max).await.unwrap();

    token.assert_async().await;
    events.assert_async().await;
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn refused_service_account_is_an_access_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/token")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "invalid_grant", "error_description": "Invalid JWT Signature."}"#)
        .create_async()
        .await;
    let calendar = server
        .mock("GET", "/calendars/primary/events")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (min, max) = range();
    let err = service_account(&server)
        .fetch_events("primary", min, max)
        .await
        .unwrap_err();

    calendar.assert_async().await;
    match err {
        SourceError::Access(msg) => assert!(msg.contains("invalid_grant")),
        other => panic!("unexpected {other:?}"),
    }
}
