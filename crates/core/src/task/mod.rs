//! Task module
//!
//! This module contains task-related types and logic.

mod dispatch;
mod file_store;
mod local;
mod mapping;
mod model;
mod network;
mod repository;
mod scope;

pub use dispatch::{BlockingDispatcher, Dispatcher, InlineDispatcher};
pub use file_store::FileTaskDao;
pub use local::{LocalTask, TaskDao};
pub use mapping::{to_external, to_local, to_network};
pub use model::*;
pub use network::{
    HttpNetworkSource, NetworkDataSource, NetworkTask, NetworkTaskStatus, SimulatedNetworkSource,
};
#[cfg(test)]
pub use network::MockNetworkDataSource;
pub use repository::{DefaultTaskRepository, TaskRepository};
pub use scope::{BackgroundScope, ManualScope, TokioScope};
