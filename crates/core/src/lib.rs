//! Data layer for the todo sample
//!
//! This crate contains:
//! - The task model and its local/network record forms
//! - A local task store with change observation
//! - Simulated and HTTP network stores
//! - The task repository that keeps both in step

pub mod config;
pub mod error;
pub mod task;

pub use config::DataConfig;
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
