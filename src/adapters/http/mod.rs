pub mod error;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::adapters::http::state::HttpState;
use crate::config::ServerConfig;

pub fn router(state: HttpState, config: &ServerConfig) -> Router {
    let app = Router::new()
        .route("/predict", post(routes::predict))
        .route("/health", get(routes::health))
        // Oversized bodies surface as a JsonRejection inside the handler,
        // so they still get the error envelope.
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Optional web frontend
    match &config.static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    base.allow_origin(parsed)
}
