//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    activity::{format_seconds, ActivityView},
    error::GatewayError,
    state::TimerState,
};

/// Body of `POST /timer/start`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartTimerRequest {
    pub duration: i32,
}

/// Body of `POST /notifications`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleNotificationRequest {
    pub seconds: f64,
    pub title: String,
    pub body: String,
}

/// Response for timer operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerState,
    /// Remaining time as `HH:MM:SS`
    pub display: String,
}

impl TimerResponse {
    pub fn new(message: String, timer: TimerState) -> Self {
        Self {
            status: timer.phase().to_string(),
            message,
            timestamp: Utc::now(),
            display: format_seconds(timer.seconds),
            timer,
        }
    }
}

/// Response for `POST /timer/start`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartTimerResponse {
    pub activity_id: String,
    #[serde(flatten)]
    pub response: TimerResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivityView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelledResponse {
    pub cancelled: usize,
}

/// Server status with the latest timer snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerState,
    pub display: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body returned for failed operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Gateway error rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            GatewayError::InvalidDuration(_) => StatusCode::BAD_REQUEST,
            GatewayError::ActivityNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::TimerAlreadyActive(_)
            | GatewayError::AlreadyPaused
            | GatewayError::NotPaused => StatusCode::CONFLICT,
            GatewayError::Notification(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::WorkerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!("Request failed with {}: {}", status, self.0);

        let body = ErrorResponse {
            status: "error".to_string(),
            code: self.0.code().to_string(),
            message: self.0.to_string(),
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}
