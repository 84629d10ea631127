//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use unlock_engine::ScheduleError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub struct AppError(pub ScheduleError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ScheduleError::InvalidDate(_)
            | ScheduleError::InvalidTimezone(_)
            | ScheduleError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            ScheduleError::TooManyIntervals { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ScheduleError::Source(_) => StatusCode::BAD_GATEWAY,
            ScheduleError::InternalConsistency { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ApiError {
        let code = match &self.0 {
            ScheduleError::InvalidDate(_) => "INVALID_DATE",
            ScheduleError::InvalidTimezone(_) | ScheduleError::InvalidConfig(_) => "BAD_REQUEST",
            ScheduleError::TooManyIntervals { .. } => "TOO_MANY_INTERVALS",
            ScheduleError::Source(_) => "CALENDAR_UNAVAILABLE",
            ScheduleError::InternalConsistency { .. } => "INTERNAL_ERROR",
        };
        ApiError::new(code, self.0.to_string())
    }

    /// Server-side failures at error level, caller mistakes at warn.
    pub fn log(&self) {
        if self.status().is_server_error() {
            error!(error = %self.0, "schedule request failed");
        } else {
            warn!(error = %self.0, "schedule request rejected");
        }
    }
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.body())).into_response()
    }
}
