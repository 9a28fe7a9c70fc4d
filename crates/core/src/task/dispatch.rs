//! Compute-bound execution context
//!
//! Work judged potentially expensive (id generation, bulk mapping) is handed
//! to a [`Dispatcher`] instead of running on the caller's task.

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::{Error, Result};

/// Strategy for running CPU-bound closures
pub trait Dispatcher: Clone + Send + Sync + 'static {
    /// Run `job` on this context and resolve to its result
    fn compute<F, T>(&self, job: F) -> BoxFuture<'static, Result<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static;
}

/// Runs jobs on tokio's blocking thread pool
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingDispatcher;

impl Dispatcher for BlockingDispatcher {
    fn compute<F, T>(&self, job: F) -> BoxFuture<'static, Result<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(job)
            .map(|joined| joined.map_err(Error::from))
            .boxed()
    }
}

/// Runs jobs in place on the polling task
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn compute<F, T>(&self, job: F) -> BoxFuture<'static, Result<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        async move { Ok(job()) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blocking_dispatcher_returns_result() {
        let value = BlockingDispatcher.compute(|| 6 * 7).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_blocking_dispatcher_reports_panics() {
        let result = BlockingDispatcher
            .compute(|| -> u32 { panic!("boom") })
            .await;
        assert!(matches!(result, Err(Error::Join(_))));
    }

    #[tokio::test]
    async fn test_inline_dispatcher_runs_on_caller() {
        let caller = std::thread::current().id();
        let ran_on = InlineDispatcher
            .compute(|| std::thread::current().id())
            .await
            .unwrap();
        assert_eq!(ran_on, caller);
    }
}
