pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::handlers::{HEALTH_PATH, SPEAKERS_PATH, SYNTHESIZE_PATH};
use crate::state::AppState;

/// Any origin, method and header, with credentials allowed. Unless a list is
/// configured, the request origin is mirrored back.
pub fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let Some(allowed_origins) = allowed_origins else {
        return CorsLayer::very_permissive();
    };

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    if origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGINS is empty, falling back to permissive CORS");
        return CorsLayer::very_permissive();
    }

    info!("CORS configured for {} origin(s)", origins.len());
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

// Request ID middleware for tracing
async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        request.headers_mut().insert("x-request-id", value.clone());
        let mut response = next.run(request).await;
        response.headers_mut().insert("x-request-id", value);
        response
    } else {
        next.run(request).await
    }
}

/// Build the full application router around `state`.
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config.cors_allowed_origins.as_deref()))
        .into_inner();

    Router::new()
        .route("/", get(handlers::root))
        .route(HEALTH_PATH, get(handlers::health_check))
        .route("/healthz", get(handlers::health_check))
        .route(SPEAKERS_PATH, get(handlers::list_speakers))
        .route(SYNTHESIZE_PATH, post(handlers::synthesize_audio))
        .layer(axum::middleware::from_fn(add_request_id))
        .layer(middleware_stack)
        .with_state(state)
}
