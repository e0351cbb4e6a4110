use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// `connected` or `error`.
    pub database: String,
    pub auth_token_loaded: bool,
    pub completion_key_loaded: bool,
}
