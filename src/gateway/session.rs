//! Bookkeeping for the single tracked timer

use serde::{Deserialize, Serialize};

use crate::{
    activity::{remaining_seconds, ContentState},
    state::TimerState,
};

/// Internal record of the tracked timer. Persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSession {
    pub end_time: f64,
    /// Remaining seconds captured at the last pause
    pub seconds: i32,
    pub is_paused: bool,
    pub activity_id: String,
    pub duration: i32,
    /// Pending completion notification, empty when none
    pub notif_id: String,
}

impl TimerSession {
    /// Check if a timer is being tracked
    pub fn is_tracking(&self) -> bool {
        !self.activity_id.is_empty()
    }

    /// Start tracking a fresh countdown of `duration` seconds ending at `end_time`
    pub fn begin(&mut self, activity_id: String, duration: i32, end_time: f64) {
        *self = Self {
            end_time,
            seconds: duration,
            is_paused: false,
            activity_id,
            duration,
            notif_id: String::new(),
        };
    }

    /// Whole seconds left at `now`, never negative
    pub fn remaining_at(&self, now: f64) -> i32 {
        remaining_seconds(self.end_time, now)
    }

    /// Freeze the countdown at `now`, returning the remaining seconds
    pub fn pause(&mut self, now: f64) -> i32 {
        let remaining = self.remaining_at(now);
        self.seconds = remaining;
        self.is_paused = true;
        remaining
    }

    /// Restart the countdown from the frozen seconds, returning the new end time
    pub fn resume(&mut self, now: f64) -> f64 {
        self.end_time = now + f64::from(self.seconds);
        self.is_paused = false;
        self.end_time
    }

    /// Take the pending notification id, if any
    pub fn take_notification(&mut self) -> Option<String> {
        Some(std::mem::take(&mut self.notif_id)).filter(|id| !id.is_empty())
    }

    /// Return to the idle state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Content the live activity should display
    pub fn content(&self) -> ContentState {
        ContentState {
            end_time: self.end_time,
            seconds: self.seconds,
            is_paused: self.is_paused,
        }
    }

    /// Client-facing snapshot at `now`
    pub fn snapshot(&self, now: f64) -> TimerState {
        let seconds = if self.is_paused {
            self.seconds
        } else {
            self.remaining_at(now)
        };

        TimerState {
            end_time: self.end_time,
            seconds,
            is_paused: self.is_paused,
            activity_id: self.activity_id.clone(),
            duration: self.duration,
        }
    }
}
