//! Task repository
//!
//! Single entry point for managing tasks. Reads always come from the local
//! store; every local mutation is followed by a fire-and-forget push of the
//! whole local collection to the network store.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::dispatch::{BlockingDispatcher, Dispatcher};
use super::local::{LocalTask, TaskDao};
use super::mapping::{to_external, to_local, to_network};
use super::model::Task;
use super::network::NetworkDataSource;
use super::scope::BackgroundScope;
use crate::{Error, Result};

/// Task API offered to UI-facing state holders
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Create an active task and return it without waiting for the network
    async fn create_task(&self, title: &str, description: &str) -> Result<Task>;

    /// Replace the title and description of an existing task
    ///
    /// Fails with [`Error::TaskNotFound`] when the id is unknown.
    async fn update_task(&self, id: &str, title: &str, description: &str) -> Result<()>;

    /// All tasks, refreshed from the network first when `force_update` is set
    async fn get_tasks(&self, force_update: bool) -> Result<Vec<Task>>;

    /// The full task list, emitted on subscribe and after every local change
    fn get_tasks_stream(&self) -> BoxStream<'static, Result<Vec<Task>>>;

    /// One task by id, or `None` if it doesn't exist
    async fn get_task(&self, id: &str, force_update: bool) -> Result<Option<Task>>;

    /// One task by id, emitted on subscribe and after every local change
    fn get_task_stream(&self, id: &str) -> BoxStream<'static, Option<Task>>;

    /// Refresh from the network. Refreshes every task, not only `id`.
    async fn refresh_task(&self, id: &str) -> Result<()>;

    /// Replace the local collection with the network's collection
    async fn refresh(&self) -> Result<()>;

    async fn complete_task(&self, id: &str) -> Result<()>;

    async fn activate_task(&self, id: &str) -> Result<()>;

    async fn clear_completed_tasks(&self) -> Result<()>;

    async fn delete_all_tasks(&self) -> Result<()>;

    async fn delete_task(&self, id: &str) -> Result<()>;
}

/// Default [`TaskRepository`] built from a local store, a network store and
/// two execution contexts.
///
/// `dispatcher` runs potentially expensive work such as id generation and
/// bulk mapping. `scope` runs jobs whose result isn't important and which
/// shouldn't block the caller, such as sending data to the network.
pub struct DefaultTaskRepository<D: Dispatcher = BlockingDispatcher> {
    network: Arc<dyn NetworkDataSource>,
    dao: Arc<dyn TaskDao>,
    dispatcher: D,
    scope: Arc<dyn BackgroundScope>,
}

impl<D: Dispatcher> DefaultTaskRepository<D> {
    pub fn new(
        network: Arc<dyn NetworkDataSource>,
        dao: Arc<dyn TaskDao>,
        dispatcher: D,
        scope: Arc<dyn BackgroundScope>,
    ) -> Self {
        Self {
            network,
            dao,
            dispatcher,
            scope,
        }
    }

    /// Push the local collection to the network
    ///
    /// Returns immediately after launching the job. Each job snapshots the
    /// local store when it runs; concurrent jobs are unordered, so the network
    /// may briefly hold an older snapshot than the local store. Failures are
    /// logged and otherwise dropped.
    fn save_tasks_to_network(&self) {
        let dao = Arc::clone(&self.dao);
        let network = Arc::clone(&self.network);
        let job = async move {
            let result = async {
                let local_tasks = dao.get_all().await?;
                let count = local_tasks.len();
                network.save_tasks(to_network(local_tasks)).await?;
                Ok::<_, Error>(count)
            }
            .await;
            match result {
                Ok(count) => debug!("Saved {} tasks to network", count),
                Err(e) => warn!("Failed to save tasks to network: {}", e),
            }
        };
        self.scope.launch("save-tasks-to-network", job.boxed());
    }
}

#[async_trait]
impl<D: Dispatcher> TaskRepository for DefaultTaskRepository<D> {
    async fn create_task(&self, title: &str, description: &str) -> Result<Task> {
        let id = self
            .dispatcher
            .compute(|| Uuid::new_v4().to_string())
            .await?;
        let task = Task::new(id, title).with_description(description);

        self.dao.upsert(task.clone().into()).await?;
        debug!("Created task {}", task.id);
        self.save_tasks_to_network();
        Ok(task)
    }

    async fn update_task(&self, id: &str, title: &str, description: &str) -> Result<()> {
        let mut task = self
            .get_task(id, false)
            .await?
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        task.title = title.to_string();
        task.description = description.to_string();

        self.dao.upsert(task.into()).await?;
        debug!("Updated task {}", id);
        self.save_tasks_to_network();
        Ok(())
    }

    async fn get_tasks(&self, force_update: bool) -> Result<Vec<Task>> {
        if force_update {
            self.refresh().await?;
        }
        let local_tasks = self.dao.get_all().await?;
        self.dispatcher.compute(move || to_external(local_tasks)).await
    }

    fn get_tasks_stream(&self) -> BoxStream<'static, Result<Vec<Task>>> {
        let dispatcher = self.dispatcher.clone();
        self.dao
            .observe_all()
            .then(move |tasks| dispatcher.compute(move || to_external(tasks)))
            .boxed()
    }

    async fn get_task(&self, id: &str, force_update: bool) -> Result<Option<Task>> {
        if force_update {
            self.refresh().await?;
        }
        Ok(self.dao.get_by_id(id).await?.map(Task::from))
    }

    fn get_task_stream(&self, id: &str) -> BoxStream<'static, Option<Task>> {
        self.dao
            .observe_by_id(id)
            .map(|task| task.map(Task::from))
            .boxed()
    }

    async fn refresh_task(&self, _id: &str) -> Result<()> {
        self.refresh().await
    }

    /// Delete everything in the local store and replace it with everything
    /// from the network store.
    ///
    /// Not atomic: if inserting fails after the delete, the local store is
    /// left empty.
    async fn refresh(&self) -> Result<()> {
        let remote_tasks = self.network.load_tasks().await?;
        let local_tasks: Vec<LocalTask> = self
            .dispatcher
            .compute(move || to_local(remote_tasks))
            .await?;
        let count = local_tasks.len();

        let removed = self.dao.delete_all().await?;
        self.dao.upsert_all(local_tasks).await?;
        info!("Refreshed tasks from network: removed {}, loaded {}", removed, count);
        Ok(())
    }

    async fn complete_task(&self, id: &str) -> Result<()> {
        self.dao.update_completed(id, true).await?;
        debug!("Completed task {}", id);
        self.save_tasks_to_network();
        Ok(())
    }

    async fn activate_task(&self, id: &str) -> Result<()> {
        self.dao.update_completed(id, false).await?;
        debug!("Activated task {}", id);
        self.save_tasks_to_network();
        Ok(())
    }

    async fn clear_completed_tasks(&self) -> Result<()> {
        let removed = self.dao.delete_completed().await?;
        debug!("Cleared {} completed tasks", removed);
        self.save_tasks_to_network();
        Ok(())
    }

    async fn delete_all_tasks(&self) -> Result<()> {
        let removed = self.dao.delete_all().await?;
        debug!("Deleted all {} tasks", removed);
        self.save_tasks_to_network();
        Ok(())
    }

    async fn delete_task(&self, id: &str) -> Result<()> {
        self.dao.delete_by_id(id).await?;
        debug!("Deleted task {}", id);
        self.save_tasks_to_network();
        Ok(())
    }
}
