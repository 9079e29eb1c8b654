//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use super::TimerState;
use crate::{
    gateway::{GatewayHandle, TimerEvent},
    notifications::{DeliveredNotification, NotificationLedger},
};

/// Shared state handed to the HTTP handlers and background tasks
#[derive(Debug)]
pub struct AppState {
    /// Handle to the timer gateway worker
    pub gateway: GatewayHandle,
    /// Client-scheduled notifications
    pub ledger: NotificationLedger,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Timer lifecycle events
    pub events_tx: broadcast::Sender<TimerEvent>,
    /// Notifications as they fire
    pub delivered_tx: broadcast::Sender<DeliveredNotification>,
    /// Latest timer snapshot published by the ticker
    pub timer_update_tx: watch::Sender<TimerState>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerState>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        gateway: GatewayHandle,
        ledger: NotificationLedger,
        events_tx: broadcast::Sender<TimerEvent>,
        delivered_tx: broadcast::Sender<DeliveredNotification>,
    ) -> Self {
        let (timer_update_tx, timer_update_rx) = watch::channel(TimerState::new());

        Self {
            gateway,
            ledger,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            events_tx,
            delivered_tx,
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
        }
    }

    /// Remember the most recent client action
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Publish a fresh timer snapshot to watchers
    pub fn publish_timer_state(&self, timer: TimerState) {
        if let Err(e) = self.timer_update_tx.send(timer) {
            warn!("Failed to send timer update: {}", e);
        }
    }

    pub fn emit(&self, event: TimerEvent) {
        if self.events_tx.send(event).is_err() {
            debug!("No listeners for timer event");
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        activity::ActivityRegistry,
        clock::ManualClock,
        gateway::{GatewaySettings, GatewayWorker},
        notifications::LocalNotifier,
        store::KvStore,
    };

    fn app_state() -> AppState {
        let clock = Arc::new(ManualClock::new(0.0));
        let (delivered_tx, _) = broadcast::channel(8);
        let notifier = Arc::new(LocalNotifier::new(delivered_tx.clone()));
        let store = KvStore::in_memory();
        let (events_tx, _) = broadcast::channel(8);
        let worker = GatewayWorker::new(
            clock.clone(),
            ActivityRegistry::new(),
            notifier.clone(),
            store.clone(),
            events_tx.clone(),
            GatewaySettings::default(),
        );

        AppState::new(
            20554,
            "127.0.0.1".to_string(),
            GatewayHandle::spawn(worker),
            NotificationLedger::new(notifier, store, clock),
            events_tx,
            delivered_tx,
        )
    }

    #[tokio::test]
    async fn records_last_action() {
        let state = app_state();
        assert_eq!(state.get_last_action(), (None, None));

        state.record_action("pause");
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("pause"));
        assert!(time.is_some());
    }

    #[tokio::test]
    async fn published_timer_state_is_visible_to_watchers() {
        let state = app_state();
        let mut rx = state.timer_update_tx.subscribe();

        let timer = TimerState {
            end_time: 100.0,
            seconds: 40,
            is_paused: false,
            activity_id: "a".into(),
            duration: 60,
        };
        state.publish_timer_state(timer.clone());

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), timer);
    }

    #[tokio::test]
    async fn uptime_starts_in_seconds() {
        let state = app_state();
        assert!(state.get_uptime().ends_with('s'));
        assert!(!state.get_uptime().contains('m'));
    }
}
