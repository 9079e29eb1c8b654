//! Countdown ticker background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::{
    error::GatewayError,
    gateway::{TimerEvent, TimerGateway},
    state::{AppState, TimerState},
};

/// Background task that publishes the live countdown once per second and
/// announces when a running timer reaches zero
pub async fn countdown_ticker_task(state: Arc<AppState>) {
    info!("Starting countdown ticker task");

    let mut interval = interval(Duration::from_secs(1));
    let mut completed: Option<String> = None;

    loop {
        interval.tick().await;

        match state.gateway.get_timer_state().await {
            Ok(timer) => {
                if let Some(activity_id) = check_completion(&timer, &mut completed) {
                    info!("Timer {} reached zero", activity_id);
                    state.emit(TimerEvent::Completed { activity_id });
                }
                state.publish_timer_state(timer);
            }
            Err(GatewayError::WorkerUnavailable) => {
                error!("Timer worker stopped, ending countdown ticker");
                break;
            }
            Err(e) => {
                warn!("Failed to read timer state: {}", e);
            }
        }
    }
}

/// Report a running timer that has just hit zero. Each activity completes at
/// most once; `completed` remembers the last one reported.
pub fn check_completion(timer: &TimerState, completed: &mut Option<String>) -> Option<String> {
    if !timer.is_running() || timer.seconds > 0 {
        return None;
    }
    if completed.as_deref() == Some(timer.activity_id.as_str()) {
        return None;
    }

    debug!("Countdown for {} finished", timer.activity_id);
    *completed = Some(timer.activity_id.clone());
    completed.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;

    use crate::{
        activity::ActivityRegistry,
        clock::ManualClock,
        gateway::{
            testing::{RecordingNotifier, T0},
            GatewayHandle, GatewaySettings, GatewayWorker,
        },
        notifications::NotificationLedger,
        store::KvStore,
    };

    fn timer(activity_id: &str, seconds: i32, is_paused: bool) -> TimerState {
        TimerState {
            end_time: 0.0,
            seconds,
            is_paused,
            activity_id: activity_id.into(),
            duration: 60,
        }
    }

    #[test]
    fn completion_is_reported_once_per_activity() {
        let mut completed = None;

        assert_eq!(check_completion(&timer("a", 3, false), &mut completed), None);
        assert_eq!(check_completion(&timer("a", 0, false), &mut completed), Some("a".into()));
        assert_eq!(check_completion(&timer("a", 0, false), &mut completed), None);

        assert_eq!(check_completion(&timer("b", 0, false), &mut completed), Some("b".into()));
    }

    #[test]
    fn paused_and_idle_timers_never_complete() {
        let mut completed = None;
        assert_eq!(check_completion(&timer("a", 0, true), &mut completed), None);
        assert_eq!(check_completion(&TimerState::new(), &mut completed), None);
        assert_eq!(completed, None);
    }

    #[tokio::test]
    async fn ticker_announces_completion_once() {
        tokio::time::pause();
        let clock = Arc::new(ManualClock::new(T0));
        let notifier = Arc::new(RecordingNotifier::default());
        let store = KvStore::in_memory();
        let (events_tx, mut events) = broadcast::channel(32);
        let (delivered_tx, _) = broadcast::channel(8);

        let worker = GatewayWorker::new(
            clock.clone(),
            ActivityRegistry::new(),
            notifier.clone(),
            store.clone(),
            events_tx.clone(),
            GatewaySettings::default(),
        );
        let state = Arc::new(AppState::new(
            20554,
            "127.0.0.1".to_string(),
            GatewayHandle::spawn(worker),
            NotificationLedger::new(notifier, store, clock.clone()),
            events_tx,
            delivered_tx,
        ));

        let id = state.gateway.start_timer(3).await.unwrap();
        let snapshots = state.timer_update_tx.subscribe();
        let ticker = tokio::spawn(countdown_ticker_task(Arc::clone(&state)));

        for _ in 0..6 {
            clock.advance(1.0);
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        ticker.abort();

        let mut completions = 0;
        while let Ok(event) = events.try_recv() {
            if event == (TimerEvent::Completed { activity_id: id.clone() }) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);

        // Completion leaves the timer running at zero until it is ended
        let latest = snapshots.borrow().clone();
        assert_eq!(latest.activity_id, id);
        assert_eq!(latest.seconds, 0);
        assert!(latest.is_running());
    }
}
