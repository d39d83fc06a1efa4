use std::{future::Future, sync::Arc};

use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// How a task dispatched through the pool ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed,
    /// The task panicked; the payload message when it was a string.
    Panicked(String),
    /// The pool was shut down before a slot became free.
    Cancelled,
}

/// Bounded concurrency gate for background work.
///
/// Each task waits for one of `size` slots, runs on its own spawned task so
/// a panic is contained, and releases the slot when it ends.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self { slots: Arc::new(Semaphore::new(size)), size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    pub fn is_shut_down(&self) -> bool {
        self.slots.is_closed()
    }

    /// Stops handing out slots. Running tasks finish; waiting tasks end
    /// with `DispatchOutcome::Cancelled`.
    pub fn shutdown(&self) {
        self.slots.close();
    }

    pub async fn run<F>(&self, task: F) -> DispatchOutcome
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(permit) = self.slots.clone().acquire_owned().await else {
            debug!("worker pool closed before a slot was free");
            return DispatchOutcome::Cancelled;
        };

        let outcome = match tokio::spawn(task).await {
            Ok(()) => DispatchOutcome::Completed,
            Err(e) if e.is_panic() => {
                let payload = e.into_panic();
                let message = payload.downcast_ref::<&str>().map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(panic = %message, "worker task panicked");
                DispatchOutcome::Panicked(message)
            }
            Err(_) => DispatchOutcome::Cancelled,
        };

        drop(permit);
        outcome
    }
}
