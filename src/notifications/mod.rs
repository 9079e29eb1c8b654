//! Delayed notifications
//!
//! This module contains the notifier seam used by the gateway to announce
//! timer completion, an in-process implementation, and the ledger that keeps
//! track of notifications scheduled on behalf of clients.

pub mod ledger;
pub mod local;

use std::fmt::Debug;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

pub use ledger::NotificationLedger;
pub use local::LocalNotifier;

/// A notification that has fired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveredNotification {
    pub id: String,
    pub title: String,
    pub body: String,
    pub delivered_at: DateTime<Utc>,
}

/// Schedules one-shot notifications
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    /// Schedule a notification `seconds` from now and return its id
    async fn schedule(&self, seconds: f64, title: &str, body: &str) -> Result<String, GatewayError>;

    /// Cancel a pending notification. Unknown ids are ignored.
    async fn cancel(&self, id: &str);
}
