use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generated advice attached to exactly one task. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: u64,
    pub task_id: u64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
