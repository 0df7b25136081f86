//! Bounded-parallelism task runner.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::error::{Error, Result};

/// Runs batches of tasks with at most `capacity` of them in flight.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    /// A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Run every task to completion and return their results in input order.
    ///
    /// A task holds its slot until it finishes, successfully or not. Failed
    /// tasks do not cancel their siblings.
    pub async fn run<T, F, I>(&self, tasks: I) -> Vec<Result<T>>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = Result<T>>,
    {
        let guarded = tasks.into_iter().map(|task| {
            let semaphore = self.semaphore.clone();
            async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::Transfer(format!("Concurrency limiter closed: {}", e)))?;
                task.await
            }
        });

        join_all(guarded).await
    }
}
