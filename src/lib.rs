//! Poll voting service.
//!
//! A durable store of polls (title plus ordered, positionally-addressed
//! options carrying vote counters), an HTTP JSON API for reading poll state
//! and casting votes, an admin surface for authoring polls and viewing
//! results, and a client library implementing the widget vote state machine.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use http::{header::CONTENT_TYPE, Method};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod mock;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

use config::Config;
use state::AppState;
use store::PgPollStore;

pub fn init_tracing() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
}

/// The full application router with CORS applied. Shared by the binary and
/// the integration tests, which run it over an in-memory store.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    routes::create_routes(state).layer(cors)
}

pub async fn start_server(config: Config) {
    info!("Connecting to the database...");
    let pool = db::create_pool(&config.database_url, config.max_db_connections)
        .await
        .expect("Failed to connect to the database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState::new(Arc::new(PgPollStore::new(pool)));
    let app = app(state);

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
