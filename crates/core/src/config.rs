//! Data layer configuration
//!
//! Read from environment variables:
//! - `TODO_DATA_DIR`: directory for the local and simulated remote files
//! - `TODO_NETWORK_LATENCY_MS`: latency of the simulated remote
//! - `TODO_REMOTE_URL`: use an HTTP remote instead of the simulated one
//! - `TODO_PERSIST`: keep the local store on disk (default on)

use std::path::PathBuf;
use std::time::Duration;

use crate::task::SimulatedNetworkSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub network_latency: Duration,
    pub remote_url: Option<String>,
    pub persist: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".todo-data"),
            network_latency: SimulatedNetworkSource::DEFAULT_LATENCY,
            remote_url: None,
            persist: true,
        }
    }
}

fn parse_flag(raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

impl DataConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unparseable values fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_dir = lookup("TODO_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let network_latency = lookup("TODO_NETWORK_LATENCY_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.network_latency);

        let remote_url = lookup("TODO_REMOTE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let persist = lookup("TODO_PERSIST")
            .map(|v| parse_flag(&v, defaults.persist))
            .unwrap_or(defaults.persist);

        Self {
            data_dir,
            network_latency,
            remote_url,
            persist,
        }
    }

    /// File holding the local task store
    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join("tasks.json")
    }

    /// File holding the simulated remote collection
    pub fn network_path(&self) -> PathBuf {
        self.data_dir.join("network.json")
    }
}
