//! Local task store interface
//!
//! The local store is durable, queryable and observable. It is the source
//! of truth for every read made through the repository.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A task row as kept by the local store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalTask {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
}

/// Data access interface for the local task table
#[async_trait]
pub trait TaskDao: Send + Sync {
    /// Insert a task, replacing any row with the same id
    async fn upsert(&self, task: LocalTask) -> Result<()>;

    /// Insert or replace many tasks at once
    async fn upsert_all(&self, tasks: Vec<LocalTask>) -> Result<()>;

    /// Get all tasks
    async fn get_all(&self) -> Result<Vec<LocalTask>>;

    /// Get a task by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<LocalTask>>;

    /// Observe all tasks. The current contents are emitted on subscribe,
    /// then again after every mutation.
    fn observe_all(&self) -> BoxStream<'static, Vec<LocalTask>>;

    /// Observe a single task by ID
    fn observe_by_id(&self, id: &str) -> BoxStream<'static, Option<LocalTask>>;

    /// Set the completed flag of a task. Does nothing if the id is unknown.
    async fn update_completed(&self, id: &str, completed: bool) -> Result<()>;

    /// Delete a task by ID, returning the number of rows removed
    async fn delete_by_id(&self, id: &str) -> Result<usize>;

    /// Delete all completed tasks, returning the number of rows removed
    async fn delete_completed(&self) -> Result<usize>;

    /// Delete all tasks, returning the number of rows removed
    async fn delete_all(&self) -> Result<usize>;
}
