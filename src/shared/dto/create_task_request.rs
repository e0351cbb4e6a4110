use serde::Deserialize;

use crate::{service_error::ServiceError, task::NewTask, task_status::TaskStatus};

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<u64>,
}

impl CreateTaskRequest {
    pub fn into_new_task(self) -> Result<NewTask, ServiceError> {
        if self.title.trim().is_empty() {
            return Err(ServiceError::validation("title must not be blank"));
        }

        Ok(NewTask {
            title: self.title,
            description: self.description,
            status: self.status.unwrap_or_default(),
            assignee_id: self.assignee_id,
        })
    }
}
