//! Salon Academy API server entry point.

use std::sync::Arc;
use std::time::Duration;

use academy_api::config::ServerConfig;
use academy_api::error::AppError;
use academy_api::routes;
use academy_api::state::AppState;
use academy_backend::http_backend::HttpBackend;
use academy_catalog::application::loader;
use academy_core::clock::SystemClock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Salon Academy API server");

    let config = ServerConfig::from_env()?;

    let catalog = match &config.catalog_path {
        Some(path) => loader::load_from_path(path)?,
        None => loader::builtin()?,
    };
    tracing::info!(
        routines = catalog.len(),
        fingerprint = catalog.fingerprint(),
        "catalog loaded"
    );

    let backend = Arc::new(HttpBackend::with_timeout(
        &config.backend_url,
        config.backend_timeout,
    )?);
    let app_state = AppState::new(
        Arc::new(SystemClock),
        catalog,
        backend.clone(),
        backend,
        config.voice_preference.clone(),
    );

    let sweep_period = config.session_ttl.min(Duration::from_secs(60));
    let _sweeper = app_state.sessions.spawn_sweeper(
        app_state.clock.clone(),
        config.session_ttl,
        sweep_period,
    );

    // TODO: Replace CorsLayer::permissive() with the UI's origin once it is served separately.
    let app = routes::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
