//! Timer session gateway
//!
//! The gateway is the five-operation boundary host applications talk to.
//! `start_timer` and `get_timer_state` resolve asynchronously with a value or
//! an error; `pause_timer`, `resume_timer` and `end_timer` are fire-and-forget.
//!
//! Every operation is forwarded to a single worker task over one queue, so
//! operations take effect in the order they were submitted.

pub mod handle;
pub mod session;
pub mod worker;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{error::GatewayError, state::TimerState};

pub use handle::GatewayHandle;
pub use session::TimerSession;
pub use worker::GatewayWorker;

/// The boundary exposed to host applications
#[async_trait]
pub trait TimerGateway: Send + Sync {
    /// Start a countdown of `duration` seconds, resolving with the new activity id
    async fn start_timer(&self, duration: i32) -> Result<String, GatewayError>;

    fn pause_timer(&self, activity_id: &str);

    fn resume_timer(&self, activity_id: &str);

    fn end_timer(&self, activity_id: &str);

    async fn get_timer_state(&self) -> Result<TimerState, GatewayError>;
}

/// Lifecycle events published by the gateway and its background tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    Started { activity_id: String, duration: i32 },
    Paused { activity_id: String, seconds: i32 },
    Resumed { activity_id: String, end_time: f64 },
    Ended { activity_id: String },
    Completed { activity_id: String },
}

/// Text and naming used when the gateway creates activities and notifications
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub activity_name: String,
    pub notification_title: String,
    pub notification_body: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            activity_name: "Timer".to_string(),
            notification_title: "Timer Complete".to_string(),
            notification_body: "Your timer is complete!".to_string(),
        }
    }
}
