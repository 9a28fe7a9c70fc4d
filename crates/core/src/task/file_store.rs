//! File-based local task store
//!
//! Keeps tasks in memory and, unless opened in memory-only mode, writes them
//! to a JSON file after every mutation. Observers are woken through a watch
//! channel carrying a version counter.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use super::local::{LocalTask, TaskDao};
use crate::{Error, Result};

type Table = BTreeMap<String, LocalTask>;

/// Local task store backed by a JSON file
#[derive(Clone)]
pub struct FileTaskDao {
    inner: Arc<Inner>,
}

struct Inner {
    /// Path to the JSON file, `None` when kept in memory only
    path: Option<PathBuf>,
    /// Tasks keyed by id
    table: RwLock<Table>,
    /// Bumped after every mutation
    version: watch::Sender<u64>,
}

impl FileTaskDao {
    /// Open a store persisted at `path`
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let table = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
                Error::Storage(format!("Failed to read tasks file: {}", e))
            })?;
            let tasks: Vec<LocalTask> = serde_json::from_str(&content)?;
            tasks.into_iter().map(|t| (t.id.clone(), t)).collect()
        } else {
            Table::new()
        };
        debug!("Opened local task store at {:?} with {} tasks", path, table.len());

        Ok(Self::with_table(Some(path), table))
    }

    /// Create a store that is never written to disk
    pub fn in_memory() -> Self {
        Self::with_table(None, Table::new())
    }

    fn with_table(path: Option<PathBuf>, table: Table) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                path,
                table: RwLock::new(table),
                version,
            }),
        }
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    /// Apply `change` to a copy of the table under the write lock. When it
    /// reports a modification, the copy is persisted, swapped in, and
    /// observers are notified. A failed write leaves the table untouched.
    async fn mutate<R>(&self, change: impl FnOnce(&mut Table) -> (R, bool)) -> Result<R> {
        let mut table = self.inner.table.write().await;
        let mut next = table.clone();
        let (result, modified) = change(&mut next);
        if modified {
            self.persist(&next).await?;
            *table = next;
            self.inner.version.send_modify(|v| *v += 1);
        }
        Ok(result)
    }

    async fn persist(&self, table: &Table) -> Result<()> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };
        let tasks: Vec<&LocalTask> = table.values().collect();
        let content = serde_json::to_string_pretty(&tasks)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Storage(format!("Failed to create directory: {}", e))
            })?;
        }

        tokio::fs::write(path, content).await.map_err(|e| {
            Error::Storage(format!("Failed to write tasks file: {}", e))
        })?;
        Ok(())
    }

    async fn snapshot(inner: &Inner) -> Vec<LocalTask> {
        inner.table.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl TaskDao for FileTaskDao {
    async fn upsert(&self, task: LocalTask) -> Result<()> {
        self.mutate(|table| {
            table.insert(task.id.clone(), task);
            ((), true)
        })
        .await
    }

    async fn upsert_all(&self, tasks: Vec<LocalTask>) -> Result<()> {
        self.mutate(|table| {
            let modified = !tasks.is_empty();
            table.extend(tasks.into_iter().map(|t| (t.id.clone(), t)));
            ((), modified)
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<LocalTask>> {
        Ok(Self::snapshot(&self.inner).await)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<LocalTask>> {
        let table = self.inner.table.read().await;
        Ok(table.get(id).cloned())
    }

    fn observe_all(&self) -> BoxStream<'static, Vec<LocalTask>> {
        let inner = Arc::clone(&self.inner);
        WatchStream::new(self.inner.version.subscribe())
            .then(move |_| {
                let inner = Arc::clone(&inner);
                async move { Self::snapshot(&inner).await }
            })
            .boxed()
    }

    fn observe_by_id(&self, id: &str) -> BoxStream<'static, Option<LocalTask>> {
        let inner = Arc::clone(&self.inner);
        let id = id.to_string();
        WatchStream::new(self.inner.version.subscribe())
            .then(move |_| {
                let inner = Arc::clone(&inner);
                let id = id.clone();
                async move { inner.table.read().await.get(&id).cloned() }
            })
            .boxed()
    }

    async fn update_completed(&self, id: &str, completed: bool) -> Result<()> {
        self.mutate(|table| match table.get_mut(id) {
            Some(task) if task.is_completed != completed => {
                task.is_completed = completed;
                ((), true)
            }
            _ => ((), false),
        })
        .await
    }

    async fn delete_by_id(&self, id: &str) -> Result<usize> {
        self.mutate(|table| {
            let removed = usize::from(table.remove(id).is_some());
            (removed, removed > 0)
        })
        .await
    }

    async fn delete_completed(&self) -> Result<usize> {
        self.mutate(|table| {
            let before = table.len();
            table.retain(|_, t| !t.is_completed);
            let removed = before - table.len();
            (removed, removed > 0)
        })
        .await
    }

    async fn delete_all(&self) -> Result<usize> {
        self.mutate(|table| {
            let removed = table.len();
            table.clear();
            (removed, removed > 0)
        })
        .await
    }
}
