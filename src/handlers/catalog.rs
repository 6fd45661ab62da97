use axum::Json;
use axum::extract::State;
use chrono::Utc;

use super::AppState;
use crate::models::{Catalog, HealthResponse};

pub async fn health(State(service): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider: service.provider_name().to_string(),
        time: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
    })
}

/// Modes and plan tiers for client-side gating. The transform route does not enforce plans.
pub async fn modes() -> Json<Catalog> {
    Json(Catalog::build())
}
