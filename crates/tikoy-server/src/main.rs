use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use tikoy_api::routes;
use tikoy_api::state::{AppState, AppStateInner};
use tikoy_db::Database;
use tikoy_lifecycle::{SystemClock, TikoyManager};
use tikoy_store::{FailoverStore, FallbackStore, PrimaryConfig, PrimaryStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tikoy_server=debug,tikoy_api=debug,tikoy_lifecycle=debug,tikoy_store=debug,tower_http=debug"
                    .into()
            }),
        )
        .init();

    // Config
    let host = std::env::var("TIKOY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("TIKOY_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let public_origin =
        std::env::var("TIKOY_PUBLIC_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".into());
    let db_path: PathBuf = std::env::var("TIKOY_DB_PATH")
        .unwrap_or_else(|_| "tikoy-local.db".into())
        .into();

    // Stores
    let db = Arc::new(Database::open(&db_path)?);
    let fallback: Arc<dyn Store> = Arc::new(FallbackStore::new(db));

    let primary: Option<Arc<dyn Store>> = match PrimaryConfig::from_env() {
        Some(config) => {
            info!("Primary document store at {}", config.base_url);
            Some(Arc::new(PrimaryStore::new(config)?))
        }
        None => {
            warn!("TIKOY_PRIMARY_URL / TIKOY_PRIMARY_API_KEY unset; records stay on this instance only");
            None
        }
    };

    let store = FailoverStore::new(primary, fallback);
    info!("Storage backend: {}", store.backend().as_str());

    let state: AppState = Arc::new(AppStateInner {
        manager: TikoyManager::new(store, Arc::new(SystemClock)),
        public_origin,
    });

    let app = routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Tikoy server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
