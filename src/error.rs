//! Error types for the timer gateway

/// Failures surfaced by gateway operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("Invalid duration {0}: must be a positive number of seconds")]
    InvalidDuration(i32),
    #[error("Failed to start timer: timer '{0}' is still active")]
    TimerAlreadyActive(String),
    #[error("Activity '{0}' not found")]
    ActivityNotFound(String),
    #[error("Timer is already paused")]
    AlreadyPaused,
    #[error("Timer is already running")]
    NotPaused,
    #[error("Failed to schedule notification: {0}")]
    Notification(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Timer worker is not running")]
    WorkerUnavailable,
}

impl GatewayError {
    /// Stable machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDuration(_) => "INVALID_DURATION",
            Self::TimerAlreadyActive(_) => "TIMER_ALREADY_ACTIVE",
            Self::ActivityNotFound(_) => "ACTIVITY_NOT_FOUND",
            Self::AlreadyPaused => "ALREADY_PAUSED",
            Self::NotPaused => "NOT_PAUSED",
            Self::Notification(_) => "NOTIFICATION_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::WorkerUnavailable => "WORKER_UNAVAILABLE",
        }
    }
}

impl From<crate::store::StoreError> for GatewayError {
    fn from(e: crate::store::StoreError) -> Self {
        Self::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            GatewayError::InvalidDuration(-5).to_string(),
            "Invalid duration -5: must be a positive number of seconds"
        );
        assert_eq!(
            GatewayError::ActivityNotFound("abc".into()).to_string(),
            "Activity 'abc' not found"
        );
        assert_eq!(
            GatewayError::TimerAlreadyActive("abc".into()).to_string(),
            "Failed to start timer: timer 'abc' is still active"
        );
    }
}
