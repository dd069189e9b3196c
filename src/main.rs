//! Upcache Server
//!
//! Deduplicating upload cache: files are hashed, looked up in Redis, and
//! only unseen content is sent to the remote file API.

use std::net::SocketAddr;

use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use upcache_server::{routes, AppState, Config};

#[tokio::main]
async fn main() {
    // Load configuration before tracing so DEBUG can pick the default filter
    dotenvy::dotenv().ok();
    let loaded = Config::from_env();

    let debug = loaded.as_ref().map(|c| c.server.debug).unwrap_or(false);
    let default_filter = if debug {
        "upcache_server=debug,tower_http=debug"
    } else {
        "upcache_server=info,tower_http=info"
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting Upcache Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Cache TTL: {}s", config.cache.ttl.as_secs());
    tracing::info!("Upload concurrency limit: {}", config.remote.concurrency_limit);
    tracing::info!("Staging directory: {}", config.remote.staging_dir.display());

    let host = config.server.host.clone();
    let port = config.server.port;

    // Create application state
    let app_state = AppState::build(config)
        .await
        .expect("Failed to initialize application state");

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = routes::router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)));
    tracing::info!("Upcache Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    tracing::info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
