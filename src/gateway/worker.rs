//! Gateway worker task
//!
//! The worker exclusively owns the timer session, the activity registry and
//! the persisted snapshot. Commands arrive over an unbounded queue and are
//! applied one at a time.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{GatewaySettings, TimerEvent, TimerSession};
use crate::{
    activity::{
        format_seconds, ActivityAttributes, ActivityRegistry, ActivityView, ContentState, LiveActivity,
    },
    clock::Clock,
    error::GatewayError,
    notifications::Notifier,
    state::TimerState,
    store::KvStore,
};

/// Store key holding the serialized [`TimerSession`]
pub const TIMER_STATE_KEY: &str = "timer_state";

type Reply<T> = oneshot::Sender<Result<T, GatewayError>>;

/// Commands accepted by the worker. Fire-and-forget operations carry no reply channel.
#[derive(Debug)]
pub enum GatewayCommand {
    Start {
        duration: i32,
        respond_to: Reply<String>,
    },
    Pause {
        activity_id: String,
        respond_to: Option<Reply<TimerState>>,
    },
    Resume {
        activity_id: String,
        respond_to: Option<Reply<TimerState>>,
    },
    End {
        activity_id: String,
        respond_to: Option<Reply<TimerState>>,
    },
    GetState {
        respond_to: Reply<TimerState>,
    },
    ListActivities {
        respond_to: Reply<Vec<ActivityView>>,
    },
}

#[derive(Debug)]
pub struct GatewayWorker {
    clock: Arc<dyn Clock>,
    session: TimerSession,
    activities: ActivityRegistry,
    notifier: Arc<dyn Notifier>,
    store: KvStore,
    events_tx: broadcast::Sender<TimerEvent>,
    settings: GatewaySettings,
}

impl GatewayWorker {
    pub fn new(
        clock: Arc<dyn Clock>,
        activities: ActivityRegistry,
        notifier: Arc<dyn Notifier>,
        store: KvStore,
        events_tx: broadcast::Sender<TimerEvent>,
        settings: GatewaySettings,
    ) -> Self {
        Self {
            clock,
            session: TimerSession::default(),
            activities,
            notifier,
            store,
            events_tx,
            settings,
        }
    }

    /// Restore any persisted timer, then process commands until every sender is gone
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<GatewayCommand>) {
        self.restore().await;
        info!("Timer gateway worker started");

        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }

        info!("Timer gateway worker stopped");
    }

    async fn handle(&mut self, command: GatewayCommand) {
        match command {
            GatewayCommand::Start { duration, respond_to } => {
                let result = self.start(duration).await;
                let _ = respond_to.send(result);
            }
            GatewayCommand::Pause { activity_id, respond_to } => {
                let result = self.pause(&activity_id).await;
                reply_or_log("pause", &activity_id, result, respond_to);
            }
            GatewayCommand::Resume { activity_id, respond_to } => {
                let result = self.resume(&activity_id).await;
                reply_or_log("resume", &activity_id, result, respond_to);
            }
            GatewayCommand::End { activity_id, respond_to } => {
                let result = self.end(&activity_id).await;
                reply_or_log("end", &activity_id, result, respond_to);
            }
            GatewayCommand::GetState { respond_to } => {
                let _ = respond_to.send(Ok(self.session.snapshot(self.clock.now())));
            }
            GatewayCommand::ListActivities { respond_to } => {
                let now = self.clock.now();
                let views = self.activities.list().into_iter().map(|a| a.view(now)).collect();
                let _ = respond_to.send(Ok(views));
            }
        }
    }

    async fn start(&mut self, duration: i32) -> Result<String, GatewayError> {
        if duration <= 0 {
            return Err(GatewayError::InvalidDuration(duration));
        }
        if self.session.is_tracking() {
            return Err(GatewayError::TimerAlreadyActive(self.session.activity_id.clone()));
        }

        let now = self.clock.now();
        let end_time = now + f64::from(duration);
        let activity = self.activities.request(
            ActivityAttributes {
                name: self.settings.activity_name.clone(),
                duration,
            },
            ContentState {
                end_time,
                seconds: duration,
                is_paused: false,
            },
        );

        self.session.begin(activity.id.clone(), duration, end_time);
        self.schedule_completion(now).await;
        self.persist().await;

        info!("Started timer {} for {}", activity.id, format_seconds(duration));
        self.emit(TimerEvent::Started {
            activity_id: activity.id.clone(),
            duration,
        });
        Ok(activity.id)
    }

    async fn pause(&mut self, activity_id: &str) -> Result<TimerState, GatewayError> {
        if self.session.is_paused {
            return Err(GatewayError::AlreadyPaused);
        }
        self.ensure_tracked(activity_id)?;

        let now = self.clock.now();
        let remaining = self.session.pause(now);
        self.activities.update(activity_id, self.session.content())?;

        if let Some(notif_id) = self.session.take_notification() {
            self.notifier.cancel(&notif_id).await;
        }
        self.persist().await;

        info!("Paused timer {} with {} left", activity_id, format_seconds(remaining));
        self.emit(TimerEvent::Paused {
            activity_id: activity_id.to_string(),
            seconds: remaining,
        });
        Ok(self.session.snapshot(now))
    }

    async fn resume(&mut self, activity_id: &str) -> Result<TimerState, GatewayError> {
        if !self.session.is_paused {
            return Err(GatewayError::NotPaused);
        }
        self.ensure_tracked(activity_id)?;

        let now = self.clock.now();
        let end_time = self.session.resume(now);
        self.activities.update(activity_id, self.session.content())?;

        self.schedule_completion(now).await;
        self.persist().await;

        info!("Resumed timer {} with {} left", activity_id, format_seconds(self.session.seconds));
        self.emit(TimerEvent::Resumed {
            activity_id: activity_id.to_string(),
            end_time,
        });
        Ok(self.session.snapshot(now))
    }

    async fn end(&mut self, activity_id: &str) -> Result<TimerState, GatewayError> {
        self.ensure_tracked(activity_id)?;

        self.activities.end(activity_id)?;
        if let Some(notif_id) = self.session.take_notification() {
            self.notifier.cancel(&notif_id).await;
        }
        self.session.reset();
        self.persist().await;

        info!("Ended timer {}", activity_id);
        self.emit(TimerEvent::Ended {
            activity_id: activity_id.to_string(),
        });
        Ok(self.session.snapshot(self.clock.now()))
    }

    /// The id must name the tracked timer and a live activity
    fn ensure_tracked(&self, activity_id: &str) -> Result<(), GatewayError> {
        if self.session.activity_id != activity_id || self.activities.find(activity_id).is_none() {
            return Err(GatewayError::ActivityNotFound(activity_id.to_string()));
        }
        Ok(())
    }

    /// Schedule the completion notification for a running countdown.
    /// A failure is logged and leaves the timer running without one.
    async fn schedule_completion(&mut self, now: f64) {
        let remaining = (self.session.end_time - now).max(0.0);
        if remaining <= 0.0 {
            debug!("Countdown already complete, not scheduling a notification");
            return;
        }

        match self
            .notifier
            .schedule(remaining, &self.settings.notification_title, &self.settings.notification_body)
            .await
        {
            Ok(notif_id) => self.session.notif_id = notif_id,
            Err(e) => warn!("Failed to schedule notification: {}", e),
        }
    }

    async fn persist(&self) {
        let result = if self.session.is_tracking() {
            self.store.set_json(TIMER_STATE_KEY, &self.session).await
        } else {
            self.store.remove_item(TIMER_STATE_KEY).await
        };

        if let Err(e) = result {
            warn!("Failed to persist timer state: {}", e);
        }
    }

    async fn restore(&mut self) {
        let session: TimerSession = match self.store.get_json(TIMER_STATE_KEY).await {
            Ok(Some(session)) => session,
            Ok(None) => return,
            Err(e) => {
                warn!("Ignoring unreadable stored timer state: {}", e);
                return;
            }
        };

        if !session.is_tracking() {
            return;
        }

        self.activities.restore(LiveActivity::new(
            session.activity_id.clone(),
            ActivityAttributes {
                name: self.settings.activity_name.clone(),
                duration: session.duration,
            },
            session.content(),
        ));
        self.session = session;

        // Notifications scheduled by a previous run did not survive it
        self.session.notif_id.clear();
        let now = self.clock.now();
        if !self.session.is_paused {
            self.schedule_completion(now).await;
        }
        self.persist().await;

        info!(
            "Restored timer {} ({})",
            self.session.activity_id,
            self.session.snapshot(now).phase()
        );
    }

    fn emit(&self, event: TimerEvent) {
        if self.events_tx.send(event).is_err() {
            debug!("No listeners for timer event");
        }
    }
}

fn reply_or_log(
    operation: &str,
    activity_id: &str,
    result: Result<TimerState, GatewayError>,
    respond_to: Option<Reply<TimerState>>,
) {
    match respond_to {
        Some(tx) => {
            let _ = tx.send(result);
        }
        None => {
            if let Err(e) = result {
                warn!("Ignoring {} for activity {}: {}", operation, activity_id, e);
            }
        }
    }
}
