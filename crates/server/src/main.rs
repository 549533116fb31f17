use std::{net::SocketAddr, sync::Arc};

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use pricing::PricingContext;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let state = AppState {
        pricing: PricingContext::default(),
    };
    let app = build_router(Arc::new(state), &settings);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, origins = ?settings.allowed_origins, "pricing server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, settings: &Settings) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/healthz", get(api::healthz))
        .route("/search", post(api::http_search))
        .route("/predict", post(api::http_predict))
        .route("/simulate", post(api::http_simulate_days))
        .route("/simulate/seats", post(api::http_simulate_seats))
        .route("/simulate/demand", post(api::http_simulate_demand))
        .route("/explain", post(api::http_explain))
        .layer(RequestBodyLimitLayer::new(settings.max_body_bytes))
        .layer(cors_layer(settings))
        .with_state(state)
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if settings.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(%origin, %error, "skipping invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
