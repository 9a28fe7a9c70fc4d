//! Network task stores
//!
//! The network store is a synchronization target and source: it is written
//! wholesale after every local mutation and read wholesale on refresh.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{Error, Result};

/// Remote status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkTaskStatus {
    Active,
    Complete,
}

impl NetworkTaskStatus {
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            Self::Complete
        } else {
            Self::Active
        }
    }
}

/// A task as exchanged with the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTask {
    pub id: String,
    pub title: String,
    pub short_description: String,
    #[serde(default)]
    pub priority: i32,
    pub status: NetworkTaskStatus,
}

/// Remote task service interface
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NetworkDataSource: Send + Sync {
    /// Load every task held by the remote
    async fn load_tasks(&self) -> Result<Vec<NetworkTask>>;

    /// Replace the remote collection with `tasks`
    async fn save_tasks(&self, tasks: Vec<NetworkTask>) -> Result<()>;
}

/// In-process stand-in for a remote task service
///
/// Each request holds the service lock for the configured latency, so
/// requests are served one at a time.
pub struct SimulatedNetworkSource {
    tasks: Mutex<Vec<NetworkTask>>,
    latency: Duration,
    path: Option<PathBuf>,
}

impl SimulatedNetworkSource {
    /// Latency of the sample's fake service
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(2000);

    /// Create an empty service with the given latency
    pub fn new(latency: Duration) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            latency,
            path: None,
        }
    }

    /// Seed the remote collection
    pub fn with_tasks(self, tasks: Vec<NetworkTask>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..self
        }
    }

    /// Open a service whose collection survives restarts in a JSON file
    pub async fn persistent(path: impl Into<PathBuf>, latency: Duration) -> Result<Self> {
        let path = path.into();
        let tasks = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
                Error::Storage(format!("Failed to read network file: {}", e))
            })?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };

        Ok(Self {
            tasks: Mutex::new(tasks),
            latency,
            path: Some(path),
        })
    }

    async fn persist(&self, tasks: &[NetworkTask]) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_string_pretty(tasks)?).await?;
        Ok(())
    }
}

impl Default for SimulatedNetworkSource {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LATENCY)
    }
}

#[async_trait]
impl NetworkDataSource for SimulatedNetworkSource {
    async fn load_tasks(&self) -> Result<Vec<NetworkTask>> {
        let tasks = self.tasks.lock().await;
        tokio::time::sleep(self.latency).await;
        debug!("Simulated network returned {} tasks", tasks.len());
        Ok(tasks.clone())
    }

    async fn save_tasks(&self, new_tasks: Vec<NetworkTask>) -> Result<()> {
        let mut tasks = self.tasks.lock().await;
        tokio::time::sleep(self.latency).await;
        self.persist(&new_tasks).await?;
        debug!("Simulated network stored {} tasks", new_tasks.len());
        *tasks = new_tasks;
        Ok(())
    }
}

/// Network store talking to a REST endpoint
///
/// `GET {base}/tasks` returns the collection, `PUT {base}/tasks` replaces it.
pub struct HttpNetworkSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNetworkSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }
}

#[async_trait]
impl NetworkDataSource for HttpNetworkSource {
    async fn load_tasks(&self) -> Result<Vec<NetworkTask>> {
        let resp = self
            .client
            .get(self.tasks_url())
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to load tasks: {}", e)))?;

        if !resp.status().is_success() {
            return Err(Error::Network(format!(
                "Failed to load tasks: HTTP {}",
                resp.status()
            )));
        }

        Ok(resp.json().await?)
    }

    async fn save_tasks(&self, tasks: Vec<NetworkTask>) -> Result<()> {
        let resp = self
            .client
            .put(self.tasks_url())
            .json(&tasks)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to save tasks: {}", e)))?;

        if !resp.status().is_success() {
            return Err(Error::Network(format!(
                "Failed to save tasks: HTTP {}",
                resp.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn remote(id: &str, status: NetworkTaskStatus) -> NetworkTask {
        NetworkTask {
            id: id.to_string(),
            title: format!("Task {}", id),
            short_description: String::new(),
            priority: 0,
            status,
        }
    }

    #[tokio::test]
    async fn test_simulated_save_then_load() {
        let service = SimulatedNetworkSource::new(Duration::ZERO);
        assert!(service.load_tasks().await.unwrap().is_empty());

        let tasks = vec![remote("a", NetworkTaskStatus::Active)];
        service.save_tasks(tasks.clone()).await.unwrap();
        assert_eq!(service.load_tasks().await.unwrap(), tasks);
    }

    #[tokio::test]
    async fn test_save_replaces_whole_collection() {
        let service = SimulatedNetworkSource::new(Duration::ZERO).with_tasks(vec![
            remote("a", NetworkTaskStatus::Active),
            remote("b", NetworkTaskStatus::Complete),
        ]);

        service
            .save_tasks(vec![remote("c", NetworkTaskStatus::Active)])
            .await
            .unwrap();

        let ids: Vec<String> = service
            .load_tasks()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[tokio::test]
    async fn test_simulated_latency_is_applied() {
        let latency = Duration::from_millis(20);
        let service = SimulatedNetworkSource::new(latency);
        let started = std::time::Instant::now();
        service.load_tasks().await.unwrap();
        assert!(started.elapsed() >= latency);
    }

    #[tokio::test]
    async fn test_persistent_service_survives_restart() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("network.json");

        {
            let service = SimulatedNetworkSource::persistent(&path, Duration::ZERO)
                .await
                .unwrap();
            service
                .save_tasks(vec![remote("a", NetworkTaskStatus::Complete)])
                .await
                .unwrap();
        }

        let service = SimulatedNetworkSource::persistent(&path, Duration::ZERO)
            .await
            .unwrap();
        let tasks = service.load_tasks().await.unwrap();
        assert_eq!(tasks, vec![remote("a", NetworkTaskStatus::Complete)]);
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&NetworkTaskStatus::Complete).unwrap();
        assert_eq!(json, "\"COMPLETE\"");
    }

    #[test]
    fn test_http_source_trims_trailing_slash() {
        let source = HttpNetworkSource::new("http://localhost:9000/");
        assert_eq!(source.tasks_url(), "http://localhost:9000/tasks");
    }
}
