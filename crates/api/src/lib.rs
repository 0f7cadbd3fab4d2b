pub mod config;
pub mod routes;
pub mod state;

pub use config::{AppConfig, ConfigError, ProviderKind};
pub use state::AppState;

use axum::http::{HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// CORS policy for `/api/*`: exact-match origin allow-list, read-only methods.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
}

/// Build the Axum application router.
pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .nest("/api", routes::api_routes().layer(cors_layer(allowed_origins)))
        .merge(routes::root_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server and run until Ctrl+C.
pub async fn start_server(config: &AppConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    tracing::info!(
        provider = state.evaluator.provider_name(),
        aliases = state.aliases.len(),
        window = state.evaluator.window(),
        strict_status = state.strict_status,
        "Trend service configured"
    );

    let app = build_router(state, &config.server.allowed_origins);
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("API server listening on {}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server");
}
