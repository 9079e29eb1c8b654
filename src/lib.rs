//! Live Timer - a timer session gateway
//!
//! This library tracks a single countdown timer behind a five-operation
//! gateway (start, pause, resume, end, get state), mirrors it into a live
//! countdown activity, and schedules a notification for when it completes.

pub mod activity;
pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod notifications;
pub mod state;
pub mod store;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::GatewayError;
pub use gateway::{GatewayHandle, TimerGateway};
pub use state::{AppState, TimerState};
pub use utils::signals::shutdown_signal;
