use anyhow::{Context, Result};
use ideas_server::{
    api,
    config::{Settings, StorageBackend},
    db::{Database, DatabaseOperations, InMemoryDatabase},
    state::AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ideas_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load settings
    let settings = Settings::new().context("Failed to load settings")?;

    // Initialize storage
    let db = open_storage(&settings).await?;
    tracing::info!("Database initialized successfully");

    // Create application state
    let state = AppState::new(db, settings.security.bcrypt_cost);

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = settings
        .bind_address()
        .parse()
        .with_context(|| format!("Failed to parse server address {}", settings.bind_address()))?;
    tracing::info!("Server running on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shut down");
    Ok(())
}

/// Open the configured backend. Pool setup blocks, so it runs on a blocking worker.
async fn open_storage(settings: &Settings) -> Result<Arc<dyn DatabaseOperations>> {
    match settings.database.backend {
        StorageBackend::Postgres => {
            let pool_settings = settings.database.clone();
            let db = tokio::task::spawn_blocking(move || -> Result<Database> {
                let mut db = Database::connect(&pool_settings)?;
                if pool_settings.initialize_schema {
                    db.initialize()?;
                }
                db.detect_constraints()?;
                Ok(db)
            })
            .await
            .context("Database setup task failed")??;
            Ok(Arc::new(db))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data will not survive a restart");
            Ok(Arc::new(InMemoryDatabase::new()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
