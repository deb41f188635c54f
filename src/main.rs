// src/main.rs
use std::net::SocketAddr;
use std::sync::Arc;

use catalog_backend::config::{AppConfig, StorageMode};
use catalog_backend::database;
use catalog_backend::repositories::{InMemoryProductRepository, PgProductRepository, ProductRepository};
use catalog_backend::state::AppState;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error");
            std::process::exit(1);
        }
    };

    let repository: Arc<dyn ProductRepository> = match build_repository(&config).await {
        Ok(repository) => repository,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize product store");
            std::process::exit(1);
        }
    };
    tracing::info!(storage_mode = ?config.storage_mode, "Product store ready");

    let app_state = AppState::new(repository, config.paging);
    let app = catalog_backend::app(app_state, &config.base_path);

    // Try base_port..base_port+20 to avoid crash when address is in use
    let listener = {
        let mut bound = None;
        for offset in 0u16..=20 {
            let port = config.port.saturating_add(offset);
            let addr = SocketAddr::from((config.host, port));
            match TcpListener::bind(addr).await {
                Ok(l) => { bound = Some((l, addr)); break; }
                Err(e) => {
                    if offset == 0 { tracing::warn!(%addr, error=%e, "Port in use, trying next"); }
                }
            }
        }
        match bound {
            Some((l, addr)) => {
                tracing::info!("Server running on {}{}", addr, config.base_path);
                l
            }
            None => {
                tracing::error!("Failed to bind to any port starting at {} on {}", config.port, config.host);
                return;
            }
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error=%e, "Server error");
    }
}

async fn build_repository(
    config: &AppConfig,
) -> Result<Arc<dyn ProductRepository>, Box<dyn std::error::Error>> {
    match config.storage_mode {
        StorageMode::InMemory => Ok(Arc::new(InMemoryProductRepository::new())),
        StorageMode::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL must be set")?;
            let pool = database::create_pool(url, config.max_connections).await?;
            database::run_migrations(&pool).await?;
            Ok(Arc::new(PgProductRepository::new(pool)))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
