//! API Layer
//!
//! axum handlers over the repository traits. Every route is served at the
//! root and again under `/api`.

mod categories;
mod error;
mod todos;


use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::repository::{CategoryOperations, TodoOperations};

pub use error::ApiError;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<dyn CategoryOperations>,
    pub todos: Arc<dyn TodoOperations>,
    pub config: Arc<Config>,
}

/// Build the axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(categories::router())
        .merge(todos::router());

    Router::new()
        .route("/health", get(health))
        .merge(api.clone())
        .nest("/api", api)
        .fallback(error::route_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error::attach_error_detail,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&state.config.cors_origins))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    }))
}

fn build_cors_layer(cors_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_TYPE]);

    // Credentials cannot be combined with a literal `*`, so mirror the caller instead
    if cors_origins.iter().any(|o| o == "*") {
        return cors
            .allow_origin(AllowOrigin::mirror_request())
            .allow_credentials(true);
    }

    let mut parsed = Vec::new();
    for origin in cors_origins {
        match HeaderValue::from_str(origin) {
            Ok(value) => parsed.push(value),
            Err(err) => warn!("ignoring invalid CORS origin '{origin}': {err}"),
        }
    }

    cors.allow_origin(AllowOrigin::list(parsed))
        .allow_credentials(true)
}
