//! Background scope for fire-and-forget work
//!
//! Jobs handed to a [`BackgroundScope`] are detached from the caller: no
//! handle is returned, so the caller can neither await nor cancel them.
//! Jobs are unordered with respect to each other.

use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Long-lived scope that runs detached jobs
pub trait BackgroundScope: Send + Sync {
    /// Launch `job` without waiting for it
    fn launch(&self, label: &'static str, job: BoxFuture<'static, ()>);
}

/// Spawns jobs onto the current tokio runtime
///
/// Outstanding jobs are aborted when the scope is dropped; the owner of the
/// scope calls [`TokioScope::drain`] before shutting down.
#[derive(Default)]
pub struct TokioScope {
    jobs: Mutex<JoinSet<()>>,
}

impl TokioScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn jobs(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of jobs launched and not yet reaped
    pub fn outstanding(&self) -> usize {
        self.jobs().len()
    }

    /// Wait for every launched job, including jobs launched while draining
    pub async fn drain(&self) {
        loop {
            let mut jobs = std::mem::take(&mut *self.jobs());
            if jobs.is_empty() {
                return;
            }
            while let Some(result) = jobs.join_next().await {
                if let Err(e) = result {
                    warn!("Background job ended abnormally: {}", e);
                }
            }
        }
    }
}

impl BackgroundScope for TokioScope {
    fn launch(&self, label: &'static str, job: BoxFuture<'static, ()>) {
        let mut jobs = self.jobs();
        // Reap finished jobs so the set doesn't grow without bound
        while jobs.try_join_next().is_some() {}
        debug!("Launching background job: {}", label);
        jobs.spawn(job);
    }
}

/// Queues jobs until the owner runs them explicitly
///
/// Lets tests decide exactly when background work happens.
#[derive(Default)]
pub struct ManualScope {
    queue: Mutex<VecDeque<(&'static str, BoxFuture<'static, ()>)>>,
}

impl ManualScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<(&'static str, BoxFuture<'static, ()>)>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of queued jobs
    pub fn pending(&self) -> usize {
        self.queue().len()
    }

    /// Labels of queued jobs in launch order
    pub fn pending_labels(&self) -> Vec<&'static str> {
        self.queue().iter().map(|(label, _)| *label).collect()
    }

    /// Run queued jobs one after another in launch order until the queue is empty
    pub async fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.queue().pop_front();
            let Some((label, job)) = next else {
                return ran;
            };
            debug!("Running queued job: {}", label);
            job.await;
            ran += 1;
        }
    }
}

impl BackgroundScope for ManualScope {
    fn launch(&self, label: &'static str, job: BoxFuture<'static, ()>) {
        self.queue().push_back((label, job));
    }
}
