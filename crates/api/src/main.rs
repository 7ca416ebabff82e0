use std::net::SocketAddr;
use std::sync::Arc;

use brainview_bfl::api::BflApi;
use brainview_bfl::batch::BatchImageGenerator;
use brainview_bfl::config::BflConfig;
use brainview_core::store::InMemoryCaseStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use brainview_api::config::ServerConfig;
use brainview_api::router::build_app_router;
use brainview_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "brainview_api=debug,brainview_bfl=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let bfl_config = BflConfig::from_env();
    tracing::info!(?bfl_config, "Loaded image provider configuration");
    if bfl_config.api_key.is_none() {
        tracing::warn!("BFL_API_KEY is not set; generation requests will fail until it is");
    }

    // --- Image provider ---
    let provider = BflApi::new(&bfl_config).expect("Failed to build BFL HTTP client");
    let generator = Arc::new(BatchImageGenerator::new(Arc::new(provider), bfl_config.poll));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        cases: Arc::new(InMemoryCaseStore::new()),
        generator,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
