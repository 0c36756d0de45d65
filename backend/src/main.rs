use anyhow::Context;
use backend::analytics::{EventSink, LogEventSink, StoreEventSink};
use backend::api;
use backend::config::ServerConfig;
use backend::session::GameManager;
use backend::store::{DisabledStore, GameStore, SqliteStore};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();
    let addr = config.addr()?;

    // Persistence is optional: games still run if the database is unavailable
    let store: Arc<dyn GameStore> = match SqliteStore::connect(&config.database_url).await {
        Ok(store) => {
            tracing::info!(url = %config.database_url, "database ready");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(url = %config.database_url, "database unavailable, running without persistence: {}", e);
            Arc::new(DisabledStore)
        }
    };

    let analytics: Arc<dyn EventSink> = if config.analytics {
        Arc::new(StoreEventSink::new(Arc::clone(&store)))
    } else {
        Arc::new(LogEventSink)
    };

    let manager = GameManager::start(config.session_settings(), Arc::clone(&store), analytics);
    let app = api::router(manager, store);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
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
    tracing::info!("shutdown signal received");
}
