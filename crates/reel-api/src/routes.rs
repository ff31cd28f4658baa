//! API routes.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::health;
use crate::handlers::jobs::{generate, get_status, list_jobs};
use crate::handlers::marks::{is_marked, mark_job, unmark_job};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/generate", post(generate))
        .route("/status/:id", get(get_status))
        .route("/jobs", get(list_jobs))
        .route("/mark/:id", post(mark_job))
        .route("/unmark/:id", post(unmark_job))
        .route("/is-marked/:id", get(is_marked));

    let static_routes = Router::new()
        .nest_service("/assets", ServeDir::new(state.config.assets_dir()))
        .nest_service("/output", ServeDir::new(state.config.output_dir()))
        .nest_service("/cache", ServeDir::new(state.config.cache_dir()));

    Router::new()
        .nest("/api", api_routes.clone())
        // Compatibility mount for versioned clients
        .nest("/api/v1", api_routes)
        .merge(static_routes)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
