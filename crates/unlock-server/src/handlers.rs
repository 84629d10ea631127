//! HTTP request handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use unlock_engine::report::ScheduleReport;
use unlock_engine::{run, WeeklySchedule, Window};

use crate::error::AppError;
use crate::page;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct WeekQuery {
    /// Any date in the week, `YYYY-MM-DD`; today when absent.
    pub start_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn schedule_for(state: &AppState, query: &WeekQuery) -> Result<WeeklySchedule, AppError> {
    let settings = &state.settings;
    let start_date = query.start_date.as_deref().filter(|s| !s.trim().is_empty());
    let window = Window::from_arg(start_date, settings.tz, settings.padding)?;
    let schedule = run(
        state.source.as_ref(),
        &settings.calendar_id,
        &window,
        &settings.generate_options(),
    )
    .await?;
    Ok(schedule)
}

pub async fn week_api(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<ScheduleReport>, AppError> {
    let schedule = schedule_for(&state, &query).await?;
    Ok(Json(ScheduleReport::from(&schedule)))
}

pub async fn week_page(State(state): State<AppState>, Query(query): Query<WeekQuery>) -> Response {
    let requested = query.start_date.clone().unwrap_or_default();
    match schedule_for(&state, &query).await {
        Ok(schedule) => {
            let start = schedule.window.start_date().to_string();
            Html(page::render(&start, Ok(&schedule))).into_response()
        }
        Err(err) => {
            err.log();
            let status: StatusCode = err.status();
            let message = err.0.to_string();
            (status, Html(page::render(&requested, Err(&message)))).into_response()
        }
    }
}
