//! In-process notifier backed by Tokio timers

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use async_trait::async_trait;
use chrono::Utc;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{DeliveredNotification, Notifier};
use crate::error::GatewayError;

/// Fires notifications from sleeping Tokio tasks and broadcasts them
#[derive(Debug, Clone)]
pub struct LocalNotifier {
    pending: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
    delivered_tx: broadcast::Sender<DeliveredNotification>,
}

impl LocalNotifier {
    /// Create a notifier that announces fired notifications on `delivered_tx`
    pub fn new(delivered_tx: broadcast::Sender<DeliveredNotification>) -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            delivered_tx,
        }
    }

    /// Number of notifications that have not fired or been cancelled
    #[cfg(test)]
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Notifier for LocalNotifier {
    async fn schedule(&self, seconds: f64, title: &str, body: &str) -> Result<String, GatewayError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(GatewayError::Notification(format!(
                "invalid delay of {} seconds",
                seconds
            )));
        }

        let id = Uuid::new_v4().to_string();
        let notification = DeliveredNotification {
            id: id.clone(),
            title: title.to_string(),
            body: body.to_string(),
            delivered_at: Utc::now(),
        };

        // Hold the lock across the spawn so the task cannot remove its entry
        // before it has been inserted.
        let mut pending = self
            .pending
            .lock()
            .map_err(|e| GatewayError::Notification(format!("Failed to lock pending notifications: {}", e)))?;

        let task_pending = Arc::clone(&self.pending);
        let delivered_tx = self.delivered_tx.clone();
        let delay = Duration::from_secs_f64(seconds);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if let Ok(mut pending) = task_pending.lock() {
                pending.remove(&notification.id);
            }

            let notification = DeliveredNotification {
                delivered_at: Utc::now(),
                ..notification
            };
            info!("Notification {} delivered: {} - {}", notification.id, notification.title, notification.body);
            if delivered_tx.send(notification).is_err() {
                debug!("No listeners for delivered notification");
            }
        });

        pending.insert(id.clone(), handle);
        info!("Notification scheduled with ID: {} ({:.0}s)", id, seconds);
        Ok(id)
    }

    async fn cancel(&self, id: &str) {
        let handle = match self.pending.lock() {
            Ok(mut pending) => pending.remove(id),
            Err(e) => {
                warn!("Failed to lock pending notifications: {}", e);
                return;
            }
        };

        match handle {
            Some(handle) => {
                handle.abort();
                info!("Notification {} cancelled", id);
            }
            None => debug!("Notification {} was not pending", id),
        }
    }
}
