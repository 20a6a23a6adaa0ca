//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression,
//! tracing), and creates the axum router ready for serving.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Session scheduling
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/recurring", post(handlers::create_recurring))
        .route("/sessions/{session_id}", get(handlers::get_session))
        .route("/sessions/{session_id}", put(handlers::update_session))
        .route("/sessions/{session_id}", delete(handlers::delete_session))
        .route(
            "/sessions/{session_id}/toggle-cancelled",
            post(handlers::toggle_cancelled),
        )
        // Listings
        .route("/batches/{batch_id}/sessions", get(handlers::sessions_for_batch))
        .route("/venues", get(handlers::list_venues))
        .route("/venues/{venue_id}/sessions", get(handlers::venue_day_plan))
        // Holiday calendar
        .route("/holidays", get(handlers::list_holidays))
        .route("/holidays", post(handlers::create_holiday))
        .route("/holidays/{holiday_id}", delete(handlers::delete_holiday));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
