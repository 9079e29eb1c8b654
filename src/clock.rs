//! Wall-clock abstraction
//!
//! Timer arithmetic is done in seconds since the Unix epoch, the same unit the
//! snapshot's `endTime` is reported in.

use std::{fmt::Debug, sync::Mutex};
use chrono::Utc;

/// Source of the current time in epoch seconds
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> f64;
}

/// Clock backed by the system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_millis() as f64 / 1000.0
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self { now: Mutex::new(start) }
    }

    /// Move the clock forward by `seconds`
    pub fn advance(&self, seconds: f64) {
        if let Ok(mut now) = self.now.lock() {
            *now += seconds;
        }
    }

    pub fn set(&self, value: f64) {
        if let Ok(mut now) = self.now.lock() {
            *now = value;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }
}
