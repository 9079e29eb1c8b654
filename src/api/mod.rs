//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/start", post(start_timer_handler))
        .route("/timer/state", get(timer_state_handler))
        .route("/timer/events", get(timer_events_handler))
        .route("/timer/:activity_id/pause", post(pause_timer_handler))
        .route("/timer/:activity_id/resume", post(resume_timer_handler))
        .route("/timer/:activity_id/end", post(end_timer_handler))
        .route("/activities", get(activities_handler))
        .route(
            "/notifications",
            get(list_notifications_handler)
                .post(schedule_notification_handler)
                .delete(cancel_all_notifications_handler),
        )
        .route("/notifications/:notification_id", delete(cancel_notification_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use futures::StreamExt;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::{sync::broadcast, time::timeout};
    use tower::ServiceExt;

    use crate::{
        activity::ActivityRegistry,
        clock::ManualClock,
        gateway::{GatewayHandle, GatewaySettings, GatewayWorker},
        notifications::{LocalNotifier, NotificationLedger},
        store::KvStore,
    };

    fn app() -> (Router, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000.0));
        let (delivered_tx, _) = broadcast::channel(16);
        let notifier = Arc::new(LocalNotifier::new(delivered_tx.clone()));
        let store = KvStore::in_memory();
        let (events_tx, _) = broadcast::channel(16);

        let worker = GatewayWorker::new(
            clock.clone(),
            ActivityRegistry::new(),
            notifier.clone(),
            store.clone(),
            events_tx.clone(),
            GatewaySettings::default(),
        );
        let state = Arc::new(AppState::new(
            20554,
            "127.0.0.1".to_string(),
            GatewayHandle::spawn(worker),
            NotificationLedger::new(notifier, store, clock.clone()),
            events_tx,
            delivered_tx,
        ));

        (create_router(state), clock)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn timer_lifecycle_over_http() {
        let (app, clock) = app();

        let (status, body) = send(&app, "POST", "/timer/start", Some(json!({ "duration": 1500 }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "running");
        assert_eq!(body["display"], "00:25:00");
        let id = body["activityId"].as_str().unwrap().to_string();
        assert_eq!(body["timer"]["activityId"], id.as_str());

        clock.advance(60.0);
        let (status, body) = send(&app, "POST", &format!("/timer/{}/pause", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "paused");
        assert_eq!(body["timer"]["seconds"], 1440);

        let (status, body) = send(&app, "POST", &format!("/timer/{}/pause", id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_PAUSED");

        let (status, body) = send(&app, "POST", &format!("/timer/{}/resume", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "running");

        let (_, body) = send(&app, "GET", "/timer/state", None).await;
        assert_eq!(body["timer"]["seconds"], 1440);
        assert_eq!(body["timer"]["isPaused"], false);

        let (status, body) = send(&app, "POST", &format!("/timer/{}/end", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "idle");
        assert_eq!(body["timer"]["activityId"], "");

        let (_, body) = send(&app, "GET", "/status", None).await;
        assert_eq!(body["last_action"], "end");
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let (app, _) = app();

        let (status, body) = send(&app, "POST", "/timer/start", Some(json!({ "duration": 0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_DURATION");

        let (status, body) = send(&app, "POST", "/timer/missing/end", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");

        send(&app, "POST", "/timer/start", Some(json!({ "duration": 60 }))).await;
        let (status, body) = send(&app, "POST", "/timer/start", Some(json!({ "duration": 60 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "TIMER_ALREADY_ACTIVE");
        assert!(body["message"].as_str().unwrap().starts_with("Failed to start timer"));
    }

    #[tokio::test]
    async fn activities_are_listed() {
        let (app, _) = app();
        let (_, started) = send(&app, "POST", "/timer/start", Some(json!({ "duration": 90 }))).await;

        let (status, body) = send(&app, "GET", "/activities", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["activities"][0]["id"], started["activityId"]);
        assert_eq!(body["activities"][0]["attributes"]["duration"], 90);
        assert_eq!(body["activities"][0]["display"], "00:01:30");
    }

    #[tokio::test]
    async fn event_stream_reports_timer_changes() {
        let (app, _) = app();

        let request = Request::builder().uri("/timer/events").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");
        let mut events = response.into_body().into_data_stream();

        let (_, started) = send(&app, "POST", "/timer/start", Some(json!({ "duration": 90 }))).await;

        let chunk = timeout(Duration::from_secs(2), events.next())
            .await
            .expect("an event should arrive")
            .unwrap()
            .unwrap();
        let text = String::from_utf8(chunk.to_vec()).unwrap();
        assert!(text.starts_with("event: timer\n"));
        assert!(text.contains(r#""type":"started""#));
        assert!(text.contains(started["activityId"].as_str().unwrap()));
    }

    #[tokio::test]
    async fn notifications_can_be_scheduled_and_cancelled() {
        let (app, _) = app();

        let request = json!({ "seconds": 600.0, "title": "Reminder", "body": "Check in" });
        let (status, first) = send(&app, "POST", "/notifications", Some(request.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, second) = send(&app, "POST", "/notifications", Some(request)).await;

        let first_id = first["id"].as_str().unwrap();
        let (status, _) = send(&app, "DELETE", &format!("/notifications/{}", first_id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, "GET", "/notifications", None).await;
        assert_eq!(body["ids"], json!([second["id"]]));

        let (_, body) = send(&app, "DELETE", "/notifications", None).await;
        assert_eq!(body["cancelled"], 1);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
