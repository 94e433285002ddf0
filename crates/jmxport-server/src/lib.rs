// Library exports for jmxport-server
// This allows integration tests to build the router without binding a port

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::{ServerConfig, HEALTHY_PATH};
pub use error::ServerError;
pub use state::AppState;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route(&state.metrics_path, get(handlers::metrics))
        .route(HEALTHY_PATH, get(handlers::healthy));

    // Both routes sit behind the gate when authentication is configured
    if state.is_auth_enabled() {
        router = router.layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::basic_auth_middleware,
        ));
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
