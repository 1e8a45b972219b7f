mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod routes;
mod state;

use std::panic;
use std::sync::Arc;
use std::time::Duration;

use config::{Config, StoreBackend};
use db::{ItemStore, MemoryItemStore, PgItemStore, PoolSettings, StoreError};
use routes::create_app;
use state::AppState;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Load configuration before tracing so the log level can come from it
    let config_result = Config::load();
    let log_level = config_result
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("item_api=debug,tower_http=debug,axum::rejection=trace,{log_level}").into()
        }))
        .init();

    info!("Starting server...");

    let config = config_result.unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });
    info!(
        "Environment '{}' (development: {})",
        config.environment,
        config.is_development()
    );

    // The store must be reachable before anything is served
    let store = match build_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize item store: {}", e);
            std::process::exit(1);
        }
    };

    let app = create_app(AppState::new(store), &config);

    let listener = match tokio::net::TcpListener::bind(config.server_address()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", config.server_address(), e);
            std::process::exit(1);
        }
    };

    info!("🚀 {} running on http://{}", config.service_name, config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", config.server_address());

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

async fn build_store(config: &Config) -> Result<Arc<dyn ItemStore>, StoreError> {
    match config.store_backend {
        StoreBackend::Memory => {
            warn!("Using in-memory item store, data is lost on exit");
            Ok(Arc::new(MemoryItemStore::new()))
        }
        StoreBackend::Postgres => {
            let db_url = config
                .db_url
                .as_deref()
                .ok_or_else(|| StoreError::Unavailable("DB_URL is not configured".to_string()))?;
            let settings = PoolSettings {
                max_connections: config.db_max_connections,
                min_connections: config.db_min_connections,
                acquire_timeout: Duration::from_secs(config.db_acquire_timeout_secs),
            };
            let store = PgItemStore::connect(db_url, settings).await?;
            info!("Database initialized successfully");
            Ok(Arc::new(store))
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
