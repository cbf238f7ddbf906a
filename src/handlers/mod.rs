// handlers/mod.rs - HTTP surface
//
// GET /      → the loaded specification document
// /*path     → dispatcher → data executor (any verb; unmapped verbs are rejected by the dispatcher)

pub mod dispatch;
pub mod root;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{any, get},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{ApiConfig, AuthConfig};
use crate::dispatch::Dispatcher;
use crate::executor::DataExecutor;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub executor: Arc<dyn DataExecutor>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, executor: Arc<dyn DataExecutor>, auth: AuthConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            executor,
            auth: Arc::new(auth),
        }
    }
}

pub fn router(state: AppState, api: &ApiConfig) -> Router {
    let cors = cors_layer(api, &state.auth);

    Router::new()
        .route("/", get(root::spec_document).fallback(dispatch::dispatch))
        .route("/*path", any(dispatch::dispatch))
        .layer(DefaultBodyLimit::max(api.max_request_size_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(api: &ApiConfig, auth: &AuthConfig) -> CorsLayer {
    let origin = if api.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            api.cors_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    let mut headers = vec![header::CONTENT_TYPE];
    if let Ok(name) = HeaderName::from_bytes(auth.token_header.as_bytes()) {
        headers.push(name);
    }

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(headers)
}
