//! Router Configuration - Centralized route definitions
//!
//! Routes keep the paths the recording client already uses. Cross-cutting
//! layers (metrics, concurrency limit, timeout, CORS) are added by the caller.

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use super::{health, signs};
use crate::gesture::GestureStore;

/// Application state type alias
pub type AppState = Arc<GestureStore>;

/// Build the gesture API routes
pub fn build_gesture_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(signs::root))
        // =================================================================
        // RECORD & RECOGNIZE
        // =================================================================
        .route("/save_sign", post(signs::save_sign))
        .route("/predict_sign", post(signs::predict_sign))
        .route("/search", post(signs::search))
        // =================================================================
        // LABEL MANAGEMENT
        // =================================================================
        .route("/signs", get(signs::list_signs))
        .route("/signs/{label}", delete(signs::delete_sign_by_path))
        .route("/delete_sign", post(signs::delete_sign))
        .route("/reset_memory", post(signs::reset_memory))
        .with_state(state)
}

/// Build the health and metrics routes
///
/// Kept separate so probes stay cheap and never touch request bodies.
pub fn build_health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::health_live))
        .route("/health/ready", get(health::health_ready))
        .route("/metrics", get(health::metrics_endpoint))
        .with_state(state)
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(build_health_routes(state.clone()))
        .merge(build_gesture_routes(state))
}
