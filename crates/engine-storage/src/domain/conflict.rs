//! Optimistic-concurrency retry wrapper (spec §4.B concurrency contract).

use crate::error::StorageError;
use crate::Result;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    Retry,
    Merge,
    Fail,
}

/// Runs `attempt` up to `max_retries + 1` times. On a `TransactionConflict`,
/// calls `resolver` to decide how to proceed: `Retry` tries again, `Merge`
/// surfaces `StorageError::MergeUnimplemented` (reserved, spec §4.B), `Fail`
/// surfaces the conflict immediately.
pub async fn with_optimistic_retry<T, F, Fut, R>(max_retries: u32, mut attempt: F, resolver: R) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    R: Fn(u32) -> ConflictResolution,
{
    let mut tries = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(StorageError::TransactionConflict { retries }) => {
                if tries >= max_retries {
                    return Err(StorageError::TransactionConflict { retries: tries });
                }
                match resolver(tries) {
                    ConflictResolution::Retry => {
                        tries += 1;
                        continue;
                    }
                    ConflictResolution::Merge => return Err(StorageError::MergeUnimplemented),
                    ConflictResolution::Fail => return Err(StorageError::TransactionConflict { retries }),
                }
            }
            Err(other) => return Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_on_first_try_without_calling_resolver() {
        let result = with_optimistic_retry(3, || async { Ok::<_, StorageError>(42) }, |_| ConflictResolution::Fail).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn retries_until_success_within_budget() {
        let counter = AtomicU32::new(0);
        let result = with_optimistic_retry(
            3,
            || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(StorageError::TransactionConflict { retries: n })
                    } else {
                        Ok(n)
                    }
                }
            },
            |_| ConflictResolution::Retry,
        )
        .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn exhausting_retries_surfaces_transaction_conflict() {
        let result = with_optimistic_retry(
            2,
            || async { Err::<i32, _>(StorageError::TransactionConflict { retries: 0 }) },
            |_| ConflictResolution::Retry,
        )
        .await;
        assert!(matches!(result, Err(StorageError::TransactionConflict { .. })));
    }

    #[tokio::test]
    async fn merge_resolution_surfaces_merge_unimplemented() {
        let result = with_optimistic_retry(
            3,
            || async { Err::<i32, _>(StorageError::TransactionConflict { retries: 0 }) },
            |_| ConflictResolution::Merge,
        )
        .await;
        assert!(matches!(result, Err(StorageError::MergeUnimplemented)));
    }

    #[tokio::test]
    async fn non_conflict_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let result = with_optimistic_retry(
            3,
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<i32, _>(StorageError::constraint("bad ref")) }
            },
            |_| ConflictResolution::Retry,
        )
        .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
