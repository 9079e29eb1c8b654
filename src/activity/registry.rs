//! In-process registry of live activities

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{ActivityAttributes, ContentState, LiveActivity};
use crate::error::GatewayError;

#[derive(Debug, Default)]
pub struct ActivityRegistry {
    activities: Vec<LiveActivity>,
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a new activity with a freshly assigned id
    pub fn request(&mut self, attributes: ActivityAttributes, content: ContentState) -> LiveActivity {
        let activity = LiveActivity::new(Uuid::new_v4().to_string(), attributes, content);
        info!("Requested activity {}", activity.id);
        self.activities.push(activity.clone());
        activity
    }

    /// Replace the content state of an activity
    pub fn update(&mut self, id: &str, content: ContentState) -> Result<(), GatewayError> {
        let activity = self
            .activities
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| GatewayError::ActivityNotFound(id.to_string()))?;

        debug!("Updating activity {}: {:?}", id, content);
        activity.content = content;
        activity.updated_at = Utc::now();
        Ok(())
    }

    /// End an activity and dismiss it immediately
    pub fn end(&mut self, id: &str) -> Result<LiveActivity, GatewayError> {
        let index = self
            .activities
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| GatewayError::ActivityNotFound(id.to_string()))?;

        info!("Ended activity {}", id);
        Ok(self.activities.remove(index))
    }

    /// Re-register an activity that outlived a previous run
    pub fn restore(&mut self, activity: LiveActivity) {
        match self.activities.iter_mut().find(|a| a.id == activity.id) {
            Some(existing) => *existing = activity,
            None => self.activities.push(activity),
        }
    }

    pub fn find(&self, id: &str) -> Option<&LiveActivity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn list(&self) -> Vec<LiveActivity> {
        self.activities.clone()
    }
}
