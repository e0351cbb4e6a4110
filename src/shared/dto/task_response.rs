use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    suggestion_response::SuggestionResponse,
    task::{Task, TaskWithSuggestions},
    task_status::TaskStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assignee_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub suggestions: Vec<SuggestionResponse>,
}

impl From<TaskWithSuggestions> for TaskResponse {
    fn from(record: TaskWithSuggestions) -> Self {
        let mut response = TaskResponse::from(record.task);
        response.suggestions = record
            .suggestions
            .into_iter()
            .map(SuggestionResponse::from)
            .collect();
        response
    }
}

/// For freshly created or updated tasks, where suggestions are loaded separately.
impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            assignee_id: task.assignee_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
            suggestions: Vec::new(),
        }
    }
}
