use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{suggestion::Suggestion, task_status::TaskStatus};

/// A stored task record.
///
/// Encoded with postcard in the save file, so no field may use
/// `skip_serializing_if` or any other attribute that changes the field count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assignee_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything a new task needs before the store assigns an id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assignee_id: Option<u64>,
}

/// A task together with its suggestions, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskWithSuggestions {
    pub task: Task,
    pub suggestions: Vec<Suggestion>,
}

/// A validated partial update. The outer `Option` says whether the field was
/// supplied; for nullable fields the inner `Option` is the new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<Option<u64>>,
}

impl Task {
    pub fn from_new(id: u64, new_task: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new_task.title,
            description: new_task.description,
            status: new_task.status,
            assignee_id: new_task.assignee_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overlay the supplied fields of `update`. Absent fields stay as they are.
    pub fn apply(&mut self, update: TaskUpdate, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(assignee_id) = update.assignee_id {
            self.assignee_id = assignee_id;
        }
        self.updated_at = now;
    }
}
