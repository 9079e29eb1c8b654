//! Live Timer - a timer session gateway
//!
//! This is the main entry point for the live-timer application.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;

use live_timer::{
    activity::ActivityRegistry,
    api::create_router,
    clock::{Clock, SystemClock},
    config::Config,
    gateway::{GatewayHandle, GatewayWorker},
    notifications::{LocalNotifier, NotificationLedger},
    state::AppState,
    store::KvStore,
    tasks::countdown_ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("live_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting live-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, data_file={:?}",
        config.host, config.port, config.data_file
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = KvStore::open(config.data_file.clone()).await?;
    let (delivered_tx, _) = broadcast::channel(100);
    let notifier = Arc::new(LocalNotifier::new(delivered_tx.clone()));
    let (events_tx, _) = broadcast::channel(100);

    // The worker restores any persisted timer before serving commands
    let worker = GatewayWorker::new(
        Arc::clone(&clock),
        ActivityRegistry::new(),
        notifier.clone(),
        store.clone(),
        events_tx.clone(),
        config.gateway_settings(),
    );
    let gateway = GatewayHandle::spawn(worker);
    let ledger = NotificationLedger::new(notifier, store, clock);
    let restored = ledger.restore().await?;
    if restored > 0 {
        info!("Rescheduled {} stored notifications", restored);
    }

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        gateway,
        ledger,
        events_tx,
        delivered_tx,
    ));

    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_ticker_task(ticker_state).await;
    });

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timer/start              - Start a countdown");
    info!("  POST   /timer/:id/pause          - Pause the countdown");
    info!("  POST   /timer/:id/resume         - Resume the countdown");
    info!("  POST   /timer/:id/end            - End the countdown");
    info!("  GET    /timer/state              - Current timer state");
    info!("  GET    /timer/events             - Live event stream");
    info!("  GET    /activities               - Live activities");
    info!("  GET    /notifications            - Scheduled notifications");
    info!("  POST   /notifications            - Schedule a notification");
    info!("  DELETE /notifications[/:id]      - Cancel notifications");
    info!("  GET    /status                   - Server status");
    info!("  GET    /health                   - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
