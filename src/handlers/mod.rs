/// HTTP handlers for the assistant service
pub mod catalog;
pub mod transform;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::service::AssistantService;

pub use catalog::{health, modes};
pub use transform::transform;

/// Shared, read-only state handed to every handler.
pub type AppState = AssistantService;

/// Build the router: the configured transform route plus `/health` and `/api/modes`.
pub fn router(service: AssistantService) -> Router {
    let route = service.config().server.route.clone();
    let limit = transform::body_limit(service.config().limits.max_text_chars);
    Router::new()
        .route(&route, post(transform).layer(DefaultBodyLimit::max(limit)))
        .route("/health", get(health))
        .route("/api/modes", get(modes))
        .with_state(service)
}
