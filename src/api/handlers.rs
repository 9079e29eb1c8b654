//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::{stream, Stream};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    activity::format_seconds,
    gateway::TimerGateway,
    state::AppState,
};
use super::responses::{
    ActivitiesResponse, ApiError, CancelledResponse, HealthResponse, NotificationResponse,
    NotificationsResponse, ScheduleNotificationRequest, StartTimerRequest, StartTimerResponse,
    StatusResponse, TimerResponse,
};

/// Handle POST /timer/start - Start a countdown
pub async fn start_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartTimerRequest>,
) -> Result<(StatusCode, Json<StartTimerResponse>), ApiError> {
    let activity_id = state.gateway.start_timer(request.duration).await?;
    let timer = state.gateway.get_timer_state().await?;
    state.record_action("start");
    info!("Start endpoint called - timer {} running", activity_id);

    Ok((
        StatusCode::CREATED,
        Json(StartTimerResponse {
            activity_id,
            response: TimerResponse::new(
                format!("Timer started for {}", format_seconds(request.duration)),
                timer,
            ),
        }),
    ))
}

/// Handle POST /timer/:activity_id/pause - Pause the countdown
pub async fn pause_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    let timer = state.gateway.pause(&activity_id).await?;
    state.record_action("pause");
    info!("Pause endpoint called - timer {} paused", activity_id);
    Ok(Json(TimerResponse::new("Timer paused".to_string(), timer)))
}

/// Handle POST /timer/:activity_id/resume - Resume a paused countdown
pub async fn resume_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    let timer = state.gateway.resume(&activity_id).await?;
    state.record_action("resume");
    info!("Resume endpoint called - timer {} resumed", activity_id);
    Ok(Json(TimerResponse::new("Timer resumed".to_string(), timer)))
}

/// Handle POST /timer/:activity_id/end - End the countdown
pub async fn end_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(activity_id): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    let timer = state.gateway.end(&activity_id).await?;
    state.record_action("end");
    info!("End endpoint called - timer {} ended", activity_id);
    Ok(Json(TimerResponse::new("Timer ended".to_string(), timer)))
}

/// Handle GET /timer/state - Return the current timer snapshot
pub async fn timer_state_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerResponse>, ApiError> {
    let timer = state.gateway.get_timer_state().await?;
    Ok(Json(TimerResponse::new("Current timer state".to_string(), timer)))
}

/// Handle GET /timer/events - Stream lifecycle events, countdown ticks and
/// fired notifications as server-sent events
pub async fn timer_events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    info!("Event stream opened");

    let lifecycle = broadcast_events("timer", state.events_tx.subscribe());
    let delivered = broadcast_events("notification", state.delivered_tx.subscribe());
    let ticks = stream::unfold(state.timer_update_tx.subscribe(), |mut rx| async move {
        if rx.changed().await.is_err() {
            return None;
        }
        let event = Event::default().event("tick").json_data(&*rx.borrow_and_update());
        Some((event, rx))
    });

    Sse::new(stream::select(stream::select(lifecycle, delivered), ticks)).keep_alive(KeepAlive::default())
}

/// Named SSE events from a broadcast channel. A lagging client skips what it missed.
fn broadcast_events<T>(
    name: &'static str,
    rx: broadcast::Receiver<T>,
) -> impl Stream<Item = Result<Event, axum::Error>>
where
    T: Clone + Serialize + Send + 'static,
{
    stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(item) => return Some((Event::default().event(name).json_data(&item), rx)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Event stream lagged, skipped {} {} events", skipped, name);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
}

/// Handle GET /activities - List live activities
pub async fn activities_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActivitiesResponse>, ApiError> {
    let activities = state.gateway.list_activities().await?;
    Ok(Json(ActivitiesResponse { activities }))
}

/// Handle POST /notifications - Schedule a notification and record it
pub async fn schedule_notification_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScheduleNotificationRequest>,
) -> Result<(StatusCode, Json<NotificationResponse>), ApiError> {
    let id = state
        .ledger
        .create_and_store(request.seconds, &request.title, &request.body)
        .await?;
    state.record_action("schedule-notification");
    Ok((StatusCode::CREATED, Json(NotificationResponse { id })))
}

/// Handle GET /notifications - List recorded notification ids
pub async fn list_notifications_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let ids = state.ledger.ids().await?;
    Ok(Json(NotificationsResponse { ids }))
}

/// Handle DELETE /notifications/:notification_id - Cancel one notification
pub async fn cancel_notification_handler(
    State(state): State<Arc<AppState>>,
    Path(notification_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.ledger.cancel_by_id(&notification_id).await?;
    state.record_action("cancel-notification");
    Ok(StatusCode::NO_CONTENT)
}

/// Handle DELETE /notifications - Cancel every recorded notification
pub async fn cancel_all_notifications_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CancelledResponse>, ApiError> {
    let cancelled = state.ledger.cancel_all().await?;
    state.record_action("cancel-all-notifications");
    Ok(Json(CancelledResponse { cancelled }))
}

/// Handle GET /status - Return current server status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let timer = state.gateway.get_timer_state().await?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        display: format_seconds(timer.seconds),
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
