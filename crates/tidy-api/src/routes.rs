//! API routes.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    approve_training, enqueue_video, get_queue_stats, health, process_batch, reject_training,
    retry_failed,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let queue_routes = Router::new()
        .route("/queue/stats", get(get_queue_stats))
        .route("/queue/process", post(process_batch))
        .route("/queue/retry-failed", post(retry_failed));

    let video_routes = Router::new()
        .route("/videos/:media_id/enqueue", post(enqueue_video))
        .route("/videos/:media_id/training/approve", post(approve_training))
        .route("/videos/:media_id/training/reject", post(reject_training));

    let api_routes = Router::new()
        .merge(queue_routes)
        .merge(video_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TimeoutLayer::new(state.config.request_timeout));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .layer(cors_layer(&state.config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create CORS layer.
fn cors_layer(origins: &[String]) -> CorsLayer {
    use axum::http::{header, Method};

    let allowed_methods = [Method::GET, Method::POST, Method::OPTIONS];
    let allowed_headers = [header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT];

    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_methods(allowed_methods)
            .allow_headers(allowed_headers)
            .allow_origin(origins)
    }
}
