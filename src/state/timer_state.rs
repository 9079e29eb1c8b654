//! Timer state snapshot reported to clients

use serde::{Deserialize, Serialize};

/// Point-in-time view of the tracked timer, as returned by `getTimerState`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Epoch seconds at which a running countdown reaches zero
    pub end_time: f64,
    /// Remaining seconds (frozen while paused)
    pub seconds: i32,
    pub is_paused: bool,
    /// Empty when no timer is tracked
    pub activity_id: String,
    /// Originally requested seconds
    pub duration: i32,
}

impl TimerState {
    /// Create the idle snapshot
    pub fn new() -> Self {
        Self {
            end_time: 0.0,
            seconds: 0,
            is_paused: false,
            activity_id: String::new(),
            duration: 0,
        }
    }

    /// Check if a timer is being tracked at all
    pub fn is_active(&self) -> bool {
        !self.activity_id.is_empty()
    }

    /// Check if the countdown is currently ticking
    pub fn is_running(&self) -> bool {
        self.is_active() && !self.is_paused
    }

    /// Short label for the current phase
    pub fn phase(&self) -> &'static str {
        if !self.is_active() {
            "idle"
        } else if self.is_paused {
            "paused"
        } else {
            "running"
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_bridge_field_names() {
        let state = TimerState {
            end_time: 1_700_000_060.0,
            seconds: 60,
            is_paused: false,
            activity_id: "abc".into(),
            duration: 60,
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["endTime"], 1_700_000_060.0);
        assert_eq!(json["isPaused"], false);
        assert_eq!(json["activityId"], "abc");
        assert_eq!(json["duration"], 60);
    }

    #[test]
    fn phase_follows_activity_and_pause_flag() {
        let mut state = TimerState::new();
        assert_eq!(state.phase(), "idle");
        assert!(!state.is_running());

        state.activity_id = "abc".into();
        assert_eq!(state.phase(), "running");
        assert!(state.is_running());

        state.is_paused = true;
        assert_eq!(state.phase(), "paused");
        assert!(!state.is_running());
    }
}
