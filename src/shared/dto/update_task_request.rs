use serde::{Deserialize, Deserializer};

use crate::{service_error::ServiceError, task::TaskUpdate, task_status::TaskStatus};

/// Body of `PUT /tasks/{id}`.
///
/// Outer `None` means the field was absent; `Some(None)` means an explicit
/// `null`. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<TaskStatus>>,
    #[serde(default, deserialize_with = "present")]
    pub assignee_id: Option<Option<u64>>,
}

/// Only called when the key is in the body, so wrap whatever was there in `Some`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateTaskRequest {
    pub fn into_update(self) -> Result<TaskUpdate, ServiceError> {
        let title = match self.title {
            None => None,
            Some(None) => return Err(ServiceError::validation("title must not be null")),
            Some(Some(title)) if title.trim().is_empty() => {
                return Err(ServiceError::validation("title must not be blank"))
            }
            Some(Some(title)) => Some(title),
        };

        let status = match self.status {
            None => None,
            Some(None) => return Err(ServiceError::validation("status must not be null")),
            Some(Some(status)) => Some(status),
        };

        Ok(TaskUpdate {
            title,
            description: self.description,
            status,
            assignee_id: self.assignee_id,
        })
    }
}
