//! HTTP route handlers.

pub mod health;
pub mod image;
pub mod metrics;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
///
/// Middleware order (last added = first executed in request flow):
/// TraceLayer → origin enforcement → bearer auth (image routes) → handler
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(metrics::router())
        .merge(image::router(&state))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::enforce_origin,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
