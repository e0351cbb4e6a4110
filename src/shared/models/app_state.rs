use std::sync::Arc;

use crate::{
    authentication::auth::AuthGate, data_access::data_context::DataContext,
    services::{
        suggestion_generator::{CompletionError, SuggestionGenerator},
        task_service::TaskService,
    },
    settings::Settings,
};

pub struct AppState {
    pub data_context: DataContext,
    pub task_service: TaskService,
    pub auth_gate: AuthGate,
    pub settings: Settings,
    pub completion_key_loaded: bool,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire every component from already-loaded settings and the completion key.
    pub fn build(
        settings: Settings,
        data_context: DataContext,
        completion_api_key: String,
    ) -> Result<SharedState, CompletionError> {
        let completion_key_loaded = !completion_api_key.is_empty();
        let generator = SuggestionGenerator::new(&settings, completion_api_key)?;
        let task_service =
            TaskService::new(data_context.clone(), generator, settings.max_page_size);
        let auth_gate = AuthGate::new(&settings.api_auth_token);

        Ok(Arc::new(AppState {
            data_context,
            task_service,
            auth_gate,
            settings,
            completion_key_loaded,
        }))
    }
}
