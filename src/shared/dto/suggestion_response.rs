use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::suggestion::Suggestion;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub id: u64,
    pub task_id: u64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Suggestion> for SuggestionResponse {
    fn from(suggestion: Suggestion) -> Self {
        Self {
            id: suggestion.id,
            task_id: suggestion.task_id,
            content: suggestion.content,
            created_at: suggestion.created_at,
        }
    }
}
