// Requests
pub mod create_task_request;
pub mod update_task_request;
pub mod list_tasks_query;

// Responses
pub mod task_response;
pub mod suggestion_response;
pub mod health_response;
pub mod error_response;
