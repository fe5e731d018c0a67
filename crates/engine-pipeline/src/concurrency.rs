//! Bounded concurrent task runner (spec §4.D `runConcurrent`): runs each
//! task with at most `max_workers` in flight, captures the first failure and
//! drains whatever is already running rather than cancelling it, then
//! re-raises that failure. Returns the count of tasks that succeeded.

use crate::error::{PipelineError, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub async fn run_concurrent<T, F, Fut>(tasks: Vec<T>, max_workers: usize, task: F) -> Result<usize>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let task = Arc::new(task);
    let mut set = JoinSet::new();

    for item in tasks {
        let semaphore = semaphore.clone();
        let task = task.clone();
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
            task(item).await
        });
    }

    let mut succeeded = 0usize;
    let mut first_error: Option<PipelineError> = None;

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok(())) => succeeded += 1,
            Ok(Err(e)) => first_error.get_or_insert(e),
            Err(join_err) => first_error.get_or_insert(PipelineError::StageExecutionFailed {
                stage: "concurrent_task".to_string(),
                message: join_err.to_string(),
            }),
        };
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(succeeded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn all_tasks_succeed_returns_full_count() {
        let count = run_concurrent(vec![1, 2, 3, 4], 2, |_| async { Ok(()) }).await.unwrap();
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn first_failure_is_propagated() {
        let result = run_concurrent(vec![1, 2, 3], 3, |n| async move {
            if n == 2 {
                Err(PipelineError::StageExecutionFailed {
                    stage: "test".into(),
                    message: "boom".into(),
                })
            } else {
                Ok(())
            }
        })
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn respects_max_workers_bound() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<usize> = (0..20).collect();
        run_concurrent(tasks, 3, {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            move |_| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            }
        })
        .await
        .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn empty_queue_succeeds_with_zero_count() {
        let count: usize = run_concurrent(Vec::<i32>::new(), 4, |_| async { Ok(()) }).await.unwrap();
        assert_eq!(count, 0);
    }
}
