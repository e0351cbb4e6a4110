//! Task and suggestion storage on top of redb.
//!
//! Every public method is one redb transaction. Records are postcard-encoded;
//! ids come from per-entity sequences in `SEQUENCES_TABLE` and are never reused.

use chrono::Utc;
use redb::{
    Database, MultimapTableDefinition, ReadTransaction, ReadableMultimapTable, ReadableTable,
    TableDefinition, WriteTransaction,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{path::Path, sync::Arc};
use thiserror::Error;
#[cfg(feature = "profile")]
use std::time::Instant;

use crate::{
    suggestion::Suggestion,
    task::{NewTask, Task, TaskUpdate, TaskWithSuggestions},
};

const TASKS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("tasks");
const SUGGESTIONS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("suggestions");
/// task id → suggestion ids. Values iterate in ascending order, i.e. creation order.
const TASK_SUGGESTIONS_INDEX: MultimapTableDefinition<u64, u64> =
    MultimapTableDefinition::new("task_suggestions");
const SEQUENCES_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const TASK_SEQUENCE: &str = "task";
const SUGGESTION_SEQUENCE: &str = "suggestion";

/// Thin handle to the redb file. Cloneable (Arc inside).
#[derive(Clone)]
pub struct DataContext {
    db: Arc<Database>,
}

impl DataContext {
    /// Open (or create) the save file and make sure every table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DataContextError> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(TASKS_TABLE)?;
            let _ = txn.open_table(SUGGESTIONS_TABLE)?;
            let _ = txn.open_multimap_table(TASK_SUGGESTIONS_INDEX)?;
            let _ = txn.open_table(SEQUENCES_TABLE)?;
        }
        txn.commit()?;

        Ok(DataContext { db: Arc::new(db) })
    }

    /// Cheap liveness probe used by `/health`.
    pub fn ping(&self) -> Result<(), DataContextError> {
        let txn = self.db.begin_read()?;
        let _ = txn.open_table(TASKS_TABLE)?;
        Ok(())
    }

    // TASKS
    pub fn create_task(&self, new_task: NewTask) -> Result<Task, DataContextError> {
        let txn = self.db.begin_write()?;
        let task;
        {
            let mut sequences = txn.open_table(SEQUENCES_TABLE)?;
            let mut tasks = txn.open_table(TASKS_TABLE)?;

            let id = next_id(&mut sequences, TASK_SEQUENCE)?;
            task = Task::from_new(id, new_task, Utc::now());
            let bytes = encode(&task)?;
            tasks.insert(id, bytes.as_slice())?;
        }
        commit(txn, "create_task")?;
        Ok(task)
    }

    pub fn get_task(&self, id: u64) -> Result<Option<TaskWithSuggestions>, DataContextError> {
        let txn = self.db.begin_read()?;
        let tasks = txn.open_table(TASKS_TABLE)?;

        let task = match tasks.get(id)? {
            Some(data) => decode::<Task>(data.value())?,
            None => return Ok(None),
        };
        let suggestions = read_suggestions(&txn, id)?;
        Ok(Some(TaskWithSuggestions { task, suggestions }))
    }

    /// Tasks in id order, `offset` skipped, at most `limit` returned.
    pub fn list_tasks(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<TaskWithSuggestions>, DataContextError> {
        let txn = self.db.begin_read()?;
        let tasks_table = txn.open_table(TASKS_TABLE)?;

        let mut tasks = Vec::new();
        for entry in tasks_table.iter()?.skip(offset).take(limit) {
            let (_, value) = entry?;
            let task: Task = decode(value.value())?;
            let suggestions = read_suggestions(&txn, task.id)?;
            tasks.push(TaskWithSuggestions { task, suggestions });
        }
        Ok(tasks)
    }

    /// Read, overlay and write back in one transaction. `None` if the task is absent.
    pub fn update_task(
        &self,
        id: u64,
        update: TaskUpdate,
    ) -> Result<Option<TaskWithSuggestions>, DataContextError> {
        let txn = self.db.begin_write()?;
        let updated;
        {
            let mut tasks = txn.open_table(TASKS_TABLE)?;
            let suggestions = txn.open_table(SUGGESTIONS_TABLE)?;
            let index = txn.open_multimap_table(TASK_SUGGESTIONS_INDEX)?;
            let current = tasks
                .get(id)?
                .map(|data| decode::<Task>(data.value()))
                .transpose()?;

            let Some(mut current) = current else {
                return Ok(None);
            };
            current.apply(update, Utc::now());
            let bytes = encode(&current)?;
            tasks.insert(id, bytes.as_slice())?;
            updated = TaskWithSuggestions {
                task: current,
                suggestions: collect_suggestions(&index, &suggestions, id)?,
            };
        }
        commit(txn, "update_task")?;
        Ok(Some(updated))
    }

    /// Remove the task and every suggestion attached to it. `false` if absent.
    pub fn delete_task(&self, id: u64) -> Result<bool, DataContextError> {
        let txn = self.db.begin_write()?;
        let deleted;
        {
            let mut tasks = txn.open_table(TASKS_TABLE)?;
            let mut suggestions = txn.open_table(SUGGESTIONS_TABLE)?;
            let mut index = txn.open_multimap_table(TASK_SUGGESTIONS_INDEX)?;

            deleted = tasks.remove(id)?.is_some();
            if deleted {
                let suggestion_ids = index
                    .remove_all(id)?
                    .map(|entry| entry.map(|guard| guard.value()))
                    .collect::<Result<Vec<u64>, _>>()?;
                for suggestion_id in suggestion_ids {
                    suggestions.remove(suggestion_id)?;
                }
            }
        }
        commit(txn, "delete_task")?;
        Ok(deleted)
    }

    // SUGGESTIONS
    /// Attach a suggestion to a task. `None` if the task no longer exists.
    pub fn create_suggestion(
        &self,
        task_id: u64,
        content: String,
    ) -> Result<Option<Suggestion>, DataContextError> {
        let txn = self.db.begin_write()?;
        let suggestion;
        {
            let tasks = txn.open_table(TASKS_TABLE)?;
            if tasks.get(task_id)?.is_none() {
                return Ok(None);
            }

            let mut sequences = txn.open_table(SEQUENCES_TABLE)?;
            let mut suggestions = txn.open_table(SUGGESTIONS_TABLE)?;
            let mut index = txn.open_multimap_table(TASK_SUGGESTIONS_INDEX)?;

            let id = next_id(&mut sequences, SUGGESTION_SEQUENCE)?;
            suggestion = Suggestion {
                id,
                task_id,
                content,
                created_at: Utc::now(),
            };
            let bytes = encode(&suggestion)?;
            suggestions.insert(id, bytes.as_slice())?;
            index.insert(task_id, id)?;
        }
        commit(txn, "create_suggestion")?;
        Ok(Some(suggestion))
    }

    pub fn get_suggestion(&self, id: u64) -> Result<Option<Suggestion>, DataContextError> {
        let txn = self.db.begin_read()?;
        let suggestions = txn.open_table(SUGGESTIONS_TABLE)?;
        suggestions
            .get(id)?
            .map(|data| decode(data.value()))
            .transpose()
    }
}

fn read_suggestions(
    txn: &ReadTransaction,
    task_id: u64,
) -> Result<Vec<Suggestion>, DataContextError> {
    let index = txn.open_multimap_table(TASK_SUGGESTIONS_INDEX)?;
    let suggestions = txn.open_table(SUGGESTIONS_TABLE)?;
    collect_suggestions(&index, &suggestions, task_id)
}

fn collect_suggestions(
    index: &impl ReadableMultimapTable<u64, u64>,
    suggestions_table: &impl ReadableTable<u64, &'static [u8]>,
    task_id: u64,
) -> Result<Vec<Suggestion>, DataContextError> {
    let mut suggestions = Vec::new();
    for entry in index.get(task_id)? {
        let suggestion_id = entry?.value();
        if let Some(data) = suggestions_table.get(suggestion_id)? {
            suggestions.push(decode(data.value())?);
        }
    }
    Ok(suggestions)
}

fn next_id(
    sequences: &mut redb::Table<'_, &'static str, u64>,
    name: &str,
) -> Result<u64, DataContextError> {
    let last = sequences.get(name)?.map(|guard| guard.value()).unwrap_or(0);
    let next = last + 1;
    sequences.insert(name, next)?;
    Ok(next)
}

fn commit(txn: WriteTransaction, operation: &'static str) -> Result<(), DataContextError> {
    #[cfg(feature = "profile")]
    let commit_start = Instant::now();
    txn.commit()?;
    #[cfg(feature = "profile")]
    tracing::debug!(operation, elapsed_us = commit_start.elapsed().as_micros() as u64, "committed transaction");
    #[cfg(not(feature = "profile"))]
    tracing::trace!(operation, "committed transaction");
    Ok(())
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, DataContextError> {
    postcard::to_allocvec(value).map_err(|e| DataContextError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DataContextError> {
    postcard::from_bytes(bytes).map_err(|e| DataContextError::Decode(e.to_string()))
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DataContextError {
    #[error("redb: {0}")]
    Redb(String),
    #[error("decode: {0}")]
    Decode(String),
    #[error("encode: {0}")]
    Encode(String),
}

// redb 2.x has many error types. Blanket them all into DataContextError::Redb.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for DataContextError {
            fn from(e: $t) -> Self { DataContextError::Redb(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

// ── Tests ──────────────────────────────────────────────────────
