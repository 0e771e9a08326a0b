//! Bounded fetch executor
//!
//! Runs a batch of independent async tasks while admitting at most a fixed
//! number of them at once. One task's failure never cancels or blocks its
//! siblings; completion order carries no meaning, so outputs are handed back
//! re-sorted by task index and callers re-sort by their own key (page number,
//! post index) where order matters.

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Counting admission gate plus join barrier for a batch of fetch tasks.
#[derive(Debug, Clone)]
pub struct BoundedExecutor {
    permits: Arc<Semaphore>,
}

impl BoundedExecutor {
    /// `limit` is the concurrency ceiling; a limit of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit.max(1))),
        }
    }

    /// Run every task to completion and return their outputs in task order.
    ///
    /// Each task acquires a permit before it starts and releases it when it
    /// finishes, so at most `limit` tasks are in flight at any instant.
    pub async fn run_all<F, T>(&self, tasks: Vec<F>) -> Vec<T>
    where
        F: Future<Output = T>,
    {
        let mut in_flight: FuturesUnordered<_> = tasks
            .into_iter()
            .enumerate()
            .map(|(index, task)| {
                let permits = Arc::clone(&self.permits);
                async move {
                    // Never closed, so acquire cannot fail.
                    let _permit = permits.acquire().await.expect("executor semaphore closed");
                    (index, task.await)
                }
            })
            .collect();

        let mut collected = Vec::with_capacity(in_flight.len());
        while let Some(output) = in_flight.next().await {
            collected.push(output);
        }
        collected.sort_by_key(|(index, _)| *index);
        collected.into_iter().map(|(_, output)| output).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn outputs_come_back_in_task_order() {
        let executor = BoundedExecutor::new(4);
        let tasks: Vec<_> = (0..8u64)
            .map(|i| async move {
                // Later tasks finish earlier.
                tokio::time::sleep(Duration::from_millis(40 - i * 5)).await;
                i
            })
            .collect();
        let outputs = executor.run_all(tasks).await;
        assert_eq!(outputs, (0..8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn in_flight_tasks_never_exceed_the_limit() {
        let limit = 3;
        let executor = BoundedExecutor::new(limit);
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let current = Arc::clone(&current);
                let peak = Arc::clone(&peak);
                async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .collect();

        executor.run_all(tasks).await;
        assert!(peak.load(Ordering::SeqCst) <= limit);
        assert!(peak.load(Ordering::SeqCst) > 1);
    }

    #[tokio::test]
    async fn one_failure_does_not_block_siblings() {
        let executor = BoundedExecutor::new(2);
        let tasks: Vec<_> = (0..4usize)
            .map(|i| async move {
                if i == 1 {
                    Err::<usize, _>("boom")
                } else {
                    Ok(i)
                }
            })
            .collect();
        let outputs = executor.run_all(tasks).await;
        assert_eq!(outputs.len(), 4);
        assert!(outputs[1].is_err());
        assert_eq!(outputs.iter().filter(|r| r.is_ok()).count(), 3);
    }
}
