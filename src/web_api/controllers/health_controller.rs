use axum::{extract::State, Json};

use crate::{
    app_state::SharedState,
    health_response::{HealthResponse, RootResponse},
};

pub struct HealthController {}

impl HealthController {
    pub async fn root() -> Json<RootResponse> {
        Json(RootResponse {
            message: "Welcome to the Task Management API!".to_string(),
        })
    }

    /// Always 200; a broken store shows up as `"database": "error"`.
    pub async fn get(State(state): State<SharedState>) -> Json<HealthResponse> {
        let database = match state.data_context.ping() {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "health check could not reach the store");
                "error"
            }
        };

        Json(HealthResponse {
            status: "ok".to_string(),
            database: database.to_string(),
            auth_token_loaded: !state.settings.api_auth_token.is_empty(),
            completion_key_loaded: state.completion_key_loaded,
        })
    }
}
