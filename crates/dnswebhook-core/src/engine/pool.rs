//! Bounded worker pool
//!
//! A fixed number of tokio tasks drain a queue sized to the number of items,
//! so submission never blocks. Results come back in completion order on a
//! channel of the same size, and the pool always drains every result and
//! joins every worker before returning.
//!
//! Each worker checks the [`Context`] before starting an item. Items picked
//! up after cancellation are reported as [`Error::Cancelled`] (or
//! [`Error::DeadlineExceeded`]) without running the handler. In-flight
//! handlers of other workers are never aborted.

use crate::context::Context;
use crate::error::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error};

/// What the pool does once an item fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep processing every item
    Continue,
    /// Stop starting new items; they are reported as cancelled
    Halt,
}

/// Fixed-size pool of concurrent workers, created per operation
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with `workers` workers (at least one)
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `handler` over `items` and return one result per item, in
    /// completion order.
    pub async fn run<T, R, F, Fut>(
        &self,
        ctx: &Context,
        items: Vec<T>,
        policy: FailurePolicy,
        handler: F,
    ) -> Vec<Result<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(Context, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let count = items.len();
        if count == 0 {
            return Vec::new();
        }

        let (task_tx, task_rx) = mpsc::channel::<T>(count);
        let (result_tx, mut result_rx) = mpsc::channel::<Result<R>>(count);
        let task_rx = Arc::new(Mutex::new(task_rx));
        let handler = Arc::new(handler);
        let halted = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::with_capacity(self.workers.min(count));
        for worker_id in 0..self.workers.min(count) {
            let task_rx = Arc::clone(&task_rx);
            let result_tx = result_tx.clone();
            let handler = Arc::clone(&handler);
            let halted = Arc::clone(&halted);
            let ctx = ctx.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    let next = task_rx.lock().await.recv().await;
                    let Some(item) = next else {
                        break;
                    };

                    let result = if let Some(err) = ctx.err() {
                        Err(err)
                    } else if halted.load(Ordering::SeqCst) {
                        Err(Error::Cancelled)
                    } else {
                        handler(ctx.clone(), item).await
                    };

                    let failed = result.is_err();
                    // capacity equals the item count, never blocks
                    let _ = result_tx.send(result).await;

                    // raised after sending so skipped items always arrive
                    // behind the failure that caused them
                    if failed && policy == FailurePolicy::Halt {
                        halted.store(true, Ordering::SeqCst);
                    }
                }

                debug!(worker_id, "worker finished");
            }));
        }
        drop(result_tx);

        for item in items {
            if task_tx.send(item).await.is_err() {
                // every worker is gone; the join below reports why
                break;
            }
        }
        drop(task_tx);

        let mut results = Vec::with_capacity(count);
        while let Some(result) = result_rx.recv().await {
            results.push(result);
        }

        for handle in handles {
            if let Err(e) = handle.await {
                error!("worker terminated abnormally: {}", e);
                results.push(Err(Error::Other(format!("worker terminated abnormally: {}", e))));
            }
        }

        results
    }
}
