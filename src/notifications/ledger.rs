//! Ledger of client-scheduled notifications
//!
//! Notifications scheduled through the ledger are stored as a JSON array
//! under [`NOTIFICATIONS_KEY`], so they can be listed and cancelled in bulk
//! later on. Each entry keeps its fire time and text, which lets a restarted
//! process schedule the ones still due.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::Notifier;
use crate::{clock::Clock, error::GatewayError, store::KvStore};

pub const NOTIFICATIONS_KEY: &str = "notifications";

/// A notification recorded in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNotification {
    pub id: String,
    /// Epoch seconds at which the notification fires
    pub fire_at: f64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct NotificationLedger {
    notifier: Arc<dyn Notifier>,
    store: KvStore,
    clock: Arc<dyn Clock>,
    /// Serialises read-modify-write cycles on the stored list
    write_lock: Arc<Mutex<()>>,
}

impl NotificationLedger {
    pub fn new(notifier: Arc<dyn Notifier>, store: KvStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifier,
            store,
            clock,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Schedule a notification and remember it. Nothing stays scheduled if it
    /// cannot be recorded.
    pub async fn create_and_store(&self, seconds: f64, title: &str, body: &str) -> Result<String, GatewayError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await?;
        let fire_at = self.clock.now() + seconds;
        let id = self.notifier.schedule(seconds, title, body).await?;

        entries.push(StoredNotification {
            id: id.clone(),
            fire_at,
            title: title.to_string(),
            body: body.to_string(),
        });
        if let Err(e) = self.store.set_json(NOTIFICATIONS_KEY, &entries).await {
            warn!("Failed to record notification {}, cancelling it: {}", id, e);
            self.notifier.cancel(&id).await;
            return Err(e.into());
        }
        Ok(id)
    }

    /// Cancel one notification and forget it
    pub async fn cancel_by_id(&self, id: &str) -> Result<(), GatewayError> {
        let _guard = self.write_lock.lock().await;

        let entries: Vec<StoredNotification> =
            self.load().await?.into_iter().filter(|entry| entry.id != id).collect();
        self.notifier.cancel(id).await;
        self.store.set_json(NOTIFICATIONS_KEY, &entries).await?;
        Ok(())
    }

    /// Cancel every stored notification, returning how many were cancelled
    pub async fn cancel_all(&self) -> Result<usize, GatewayError> {
        let _guard = self.write_lock.lock().await;

        let entries = self.load().await?;
        for entry in &entries {
            self.notifier.cancel(&entry.id).await;
        }
        self.store
            .set_json(NOTIFICATIONS_KEY, &Vec::<StoredNotification>::new())
            .await?;

        info!("Cancelled {} stored notifications", entries.len());
        Ok(entries.len())
    }

    pub async fn ids(&self) -> Result<Vec<String>, GatewayError> {
        Ok(self.load().await?.into_iter().map(|entry| entry.id).collect())
    }

    /// Reschedule notifications recorded by a previous run.
    ///
    /// Entries whose fire time has passed are dropped. The rest get a new
    /// notification for the time left, stored under its new id. Returns the
    /// number rescheduled.
    pub async fn restore(&self) -> Result<usize, GatewayError> {
        let _guard = self.write_lock.lock().await;

        let entries = self.load().await?;
        if entries.is_empty() {
            return Ok(0);
        }

        let now = self.clock.now();
        let mut kept = Vec::with_capacity(entries.len());
        for entry in entries {
            let remaining = entry.fire_at - now;
            if remaining <= 0.0 {
                info!("Dropping notification {} that was due while stopped", entry.id);
                continue;
            }

            match self.notifier.schedule(remaining, &entry.title, &entry.body).await {
                Ok(id) => {
                    info!("Rescheduled notification {} as {}", entry.id, id);
                    kept.push(StoredNotification { id, ..entry });
                }
                Err(e) => warn!("Failed to reschedule notification {}: {}", entry.id, e),
            }
        }

        if let Err(e) = self.store.set_json(NOTIFICATIONS_KEY, &kept).await {
            for entry in &kept {
                self.notifier.cancel(&entry.id).await;
            }
            return Err(e.into());
        }
        Ok(kept.len())
    }

    async fn load(&self) -> Result<Vec<StoredNotification>, GatewayError> {
        Ok(self.store.get_json(NOTIFICATIONS_KEY).await?.unwrap_or_default())
    }
}
