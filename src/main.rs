//! Countdown Writer - A countdown timer that publishes the remaining time to a file
//!
//! This is the main entry point for the countdown-writer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use countdown_writer::{
    config::Config,
    settings::JsonFileSettings,
    state::AppState,
    api::create_router,
    tasks::countdown_ticker_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_writer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-writer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, interval={}ms",
          config.host, config.port, config.interval_ms);

    // Restore the last used inputs
    let settings = JsonFileSettings::load(config.settings_path());
    info!("Settings file: {}", settings.path().display());

    // Create application state
    let state = AppState::shared(config.port, config.host.clone(), Box::new(settings));

    // Start the countdown ticker background task
    let ticker_state = Arc::clone(&state);
    let interval = config.tick_interval();
    tokio::spawn(async move {
        countdown_ticker_task(ticker_state, interval).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start     - Start the countdown");
    info!("  POST /pause     - Pause or resume the countdown");
    info!("  POST /reset     - Reset the countdown to its full duration");
    info!("  GET  /settings  - Show destination, duration, finish message and format");
    info!("  PUT  /settings  - Change destination, duration, finish message or format");
    info!("  GET  /status    - Check current countdown status");
    info!("  GET  /health    - Health check");

    // Setup graceful shutdown
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

    state.stop_polling();
    info!("Server shutdown complete");
    Ok(())
}
