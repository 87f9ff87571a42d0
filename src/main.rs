use anyhow::{Context, Result};
use relayq::{build_router, AppState, CommandBroker, ExpirySweeper, ServerConfig};
use relayq_shared::SystemClock;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = ServerConfig::from_env().context("failed to load configuration")?;

    info!("relayq starting v{}", env!("CARGO_PKG_VERSION"));
    info!("  Max queue size: {}", config.queue.max_pending);
    info!("  Command expiration: {}ms", config.queue.expiration_ms);
    info!("  Player cooldown: {}ms", config.queue.cooldown_ms);

    let broker = Arc::new(CommandBroker::new(config.queue, Arc::new(SystemClock)));

    let sweeper = ExpirySweeper::new(broker.clone(), config.sweep_interval).spawn();
    info!("Expiry sweeper started ({:?} interval)", config.sweep_interval);

    let app = build_router(AppState::new(broker, config.api_key.as_str()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error");

    sweeper.abort();
    info!("relayq stopped");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Unable to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Unable to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
