pub mod app_state;
pub mod settings;
pub mod suggestion;
pub mod task;
pub mod task_status;
