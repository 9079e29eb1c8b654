//! Live countdown activities
//!
//! An activity is the displayed face of a timer: fixed attributes chosen when
//! it is requested, plus a content state that is replaced on every update.

pub mod registry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use registry::ActivityRegistry;

/// Properties fixed for the lifetime of an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityAttributes {
    pub name: String,
    pub duration: i32,
}

/// Mutable display state of an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentState {
    pub end_time: f64,
    pub seconds: i32,
    pub is_paused: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveActivity {
    pub id: String,
    pub attributes: ActivityAttributes,
    pub content: ContentState,
    pub updated_at: DateTime<Utc>,
}

impl LiveActivity {
    pub fn new(id: String, attributes: ActivityAttributes, content: ContentState) -> Self {
        Self {
            id,
            attributes,
            content,
            updated_at: Utc::now(),
        }
    }

    /// Text the activity shows at `now`: the frozen value while paused,
    /// otherwise the live countdown towards `end_time`.
    pub fn display(&self, now: f64) -> String {
        if self.content.is_paused {
            format_seconds(self.content.seconds)
        } else {
            format_seconds(remaining_seconds(self.content.end_time, now))
        }
    }

    pub fn view(self, now: f64) -> ActivityView {
        ActivityView {
            display: self.display(now),
            activity: self,
        }
    }
}

/// An activity together with what it currently shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityView {
    #[serde(flatten)]
    pub activity: LiveActivity,
    pub display: String,
}

/// Whole seconds from `now` until `end_time`, truncated and never negative
pub fn remaining_seconds(end_time: f64, now: f64) -> i32 {
    // `as` saturates, and maps NaN to zero
    (end_time - now).max(0.0) as i32
}

/// Render seconds as `HH:MM:SS`
pub fn format_seconds(seconds: i32) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
