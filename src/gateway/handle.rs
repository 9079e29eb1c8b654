//! Cloneable handle to the gateway worker

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use super::{
    worker::{GatewayCommand, GatewayWorker},
    TimerGateway,
};
use crate::{activity::ActivityView, error::GatewayError, state::TimerState};

#[derive(Debug, Clone)]
pub struct GatewayHandle {
    commands: mpsc::UnboundedSender<GatewayCommand>,
}

impl GatewayHandle {
    /// Spawn `worker` on the current runtime and return a handle to it
    pub fn spawn(worker: GatewayWorker) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        tokio::spawn(worker.run(rx));
        Self { commands }
    }

    /// Pause and report the outcome
    pub async fn pause(&self, activity_id: &str) -> Result<TimerState, GatewayError> {
        self.request(|respond_to| GatewayCommand::Pause {
            activity_id: activity_id.to_string(),
            respond_to: Some(respond_to),
        })
        .await?
    }

    /// Resume and report the outcome
    pub async fn resume(&self, activity_id: &str) -> Result<TimerState, GatewayError> {
        self.request(|respond_to| GatewayCommand::Resume {
            activity_id: activity_id.to_string(),
            respond_to: Some(respond_to),
        })
        .await?
    }

    /// End and report the outcome
    pub async fn end(&self, activity_id: &str) -> Result<TimerState, GatewayError> {
        self.request(|respond_to| GatewayCommand::End {
            activity_id: activity_id.to_string(),
            respond_to: Some(respond_to),
        })
        .await?
    }

    pub async fn list_activities(&self) -> Result<Vec<ActivityView>, GatewayError> {
        self.request(|respond_to| GatewayCommand::ListActivities { respond_to })
            .await?
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> GatewayCommand,
    ) -> Result<T, GatewayError> {
        let (respond_to, response) = oneshot::channel();
        self.commands
            .send(build(respond_to))
            .map_err(|_| GatewayError::WorkerUnavailable)?;
        response.await.map_err(|_| GatewayError::WorkerUnavailable)
    }

    fn dispatch(&self, command: GatewayCommand) {
        if let Err(e) = self.commands.send(command) {
            warn!("Timer worker is not running, dropping {:?}", e.0);
        }
    }
}

#[async_trait]
impl TimerGateway for GatewayHandle {
    async fn start_timer(&self, duration: i32) -> Result<String, GatewayError> {
        self.request(|respond_to| GatewayCommand::Start { duration, respond_to })
            .await?
    }

    fn pause_timer(&self, activity_id: &str) {
        self.dispatch(GatewayCommand::Pause {
            activity_id: activity_id.to_string(),
            respond_to: None,
        });
    }

    fn resume_timer(&self, activity_id: &str) {
        self.dispatch(GatewayCommand::Resume {
            activity_id: activity_id.to_string(),
            respond_to: None,
        });
    }

    fn end_timer(&self, activity_id: &str) {
        self.dispatch(GatewayCommand::End {
            activity_id: activity_id.to_string(),
            respond_to: None,
        });
    }

    async fn get_timer_state(&self) -> Result<TimerState, GatewayError> {
        self.request(|respond_to| GatewayCommand::GetState { respond_to })
            .await?
    }
}
