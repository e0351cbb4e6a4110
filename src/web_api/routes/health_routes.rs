use axum::{routing::get, Router};

use crate::{app_state::SharedState, health_controller::HealthController};

pub const ROUTER_PATH: &str = "/health";

/// Unauthenticated liveness endpoints.
pub fn get_router(app_state: SharedState) -> Router {
    Router::new()
        .route("/", get(HealthController::root))
        .route(ROUTER_PATH, get(HealthController::get))
        .with_state(app_state)
}
