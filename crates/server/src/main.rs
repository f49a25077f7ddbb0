//! Atelier server - online art marketplace backend.
//!
//! Serves the whole HTTP API on one port:
//!
//! - Public catalog, session, and contact routes at `/`
//! - Account routes at `/users`
//! - Administration at `/admin`
//! - GraphQL catalog queries at `/graphql`
//! - Artwork media statically at `/images`
//!
//! # Architecture
//!
//! - Axum web framework, JSON request/response bodies
//! - `PostgreSQL` via sqlx for all persistent state, sessions included
//! - Argon2id password hashing, server-side sessions (cookie holds only
//!   the session id)
//! - SMTP via lettre for reset and reply mail (optional)
//! - In-memory moka cache in front of the catalog listings (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

mod config;
mod db;
mod error;
mod media;
mod middleware;
mod models;
mod routes;
mod services;
mod state;

use config::AppConfig;
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
#[allow(clippy::expect_used)]
async fn main() {
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "atelier_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p atelier-cli -- migrate

    let addr = config.socket_addr();
    let images_dir = config.media_root.join("images");
    let cors = cors_layer(&config);
    let state = AppState::new(config, pool).expect("Failed to initialize application state");

    let session_layer = middleware::create_session_layer(state.pool(), state.config());

    let app = Router::new()
        .merge(routes::routes(state))
        .nest_service("/images", ServeDir::new(images_dir))
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    tracing::info!("atelier server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// CORS for the configured browser client, with credentials so the
/// session cookie flows.
#[allow(clippy::expect_used)]
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origin = config
        .client_origin
        .parse::<HeaderValue>()
        .expect("client origin is not a valid header value");

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(routes::auth::RESET_TOKEN_HEADER),
        ])
        .allow_credentials(true)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
