//! Bounded-parallelism primitive.
//!
//! [`ConcurrencyLimiter`] admits at most N units of async work at a time from
//! a FIFO backlog. It is backed by a fair [`tokio::sync::Semaphore`], so
//! admission order equals submission order, and knows nothing about scanning.
//!
//! # Examples
//!
//! ```
//! use ds_scanner::ConcurrencyLimiter;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ds_scanner::LimiterError> {
//! let limiter = ConcurrencyLimiter::new(2)?;
//!
//! let value = limiter.run(async { 21 * 2 }).await?;
//! assert_eq!(value, 42);
//! assert_eq!(limiter.running(), 0);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Errors returned by [`ConcurrencyLimiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LimiterError {
    /// The limiter was built with a bound of zero.
    #[error("concurrency limit must be at least 1")]
    InvalidLimit,

    /// The task was cancelled before it was admitted.
    #[error("task cancelled before admission")]
    Cancelled,

    /// The limiter was closed; no further tasks are admitted.
    #[error("concurrency limiter closed")]
    Closed,
}

/// Admission ticket for one unit of work. The slot is released on drop.
#[derive(Debug)]
pub struct LimiterPermit {
    _permit: OwnedSemaphorePermit,
}

/// Admits at most `max_concurrent` tasks at once, in submission order.
///
/// A task that fails (returns an error value) releases its slot like any
/// other; it never blocks or cancels the rest of the backlog.
///
/// # Cloning
///
/// Clones share the same slots.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
}

impl ConcurrencyLimiter {
    /// Creates a limiter admitting `max_concurrent` tasks at a time.
    ///
    /// # Errors
    ///
    /// Returns [`LimiterError::InvalidLimit`] when `max_concurrent` is zero.
    pub fn new(max_concurrent: usize) -> Result<Self, LimiterError> {
        if max_concurrent == 0 {
            return Err(LimiterError::InvalidLimit);
        }
        Ok(Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        })
    }

    /// Waits for a free slot.
    ///
    /// # Errors
    ///
    /// Returns [`LimiterError::Closed`] if the limiter has been closed.
    pub async fn acquire(&self) -> Result<LimiterPermit, LimiterError> {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map(|permit| LimiterPermit { _permit: permit })
            .map_err(|_| LimiterError::Closed)
    }

    /// Runs `task` once a slot is free and releases the slot when it settles.
    ///
    /// # Errors
    ///
    /// Returns [`LimiterError::Closed`] if the limiter was closed while the
    /// task was queued. The task's own output is returned as-is.
    pub async fn run<F, T>(&self, task: F) -> Result<T, LimiterError>
    where
        F: Future<Output = T>,
    {
        let _permit = self.acquire().await?;
        Ok(task.await)
    }

    /// Like [`run`](Self::run), but gives up if `cancel` fires while the task
    /// is queued or at the moment it would be admitted.
    ///
    /// A task that has already been admitted is not interrupted.
    ///
    /// # Errors
    ///
    /// Returns [`LimiterError::Cancelled`] if the token fired before
    /// admission, or [`LimiterError::Closed`] if the limiter was closed.
    pub async fn run_unless_cancelled<F, T>(
        &self,
        cancel: &CancellationToken,
        task: F,
    ) -> Result<T, LimiterError>
    where
        F: Future<Output = T>,
    {
        let permit = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(LimiterError::Cancelled),
            permit = self.acquire() => permit?,
        };
        if cancel.is_cancelled() {
            return Err(LimiterError::Cancelled);
        }
        let output = task.await;
        drop(permit);
        Ok(output)
    }

    /// Stops admitting tasks; queued and future submissions fail with
    /// [`LimiterError::Closed`]. Running tasks are unaffected.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Returns the number of tasks currently admitted.
    #[inline]
    #[must_use]
    pub fn running(&self) -> usize {
        self.max_concurrent
            .saturating_sub(self.semaphore.available_permits())
    }

    /// Returns the concurrency bound.
    #[inline]
    #[must_use]
    pub const fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures_util::future::join_all;
    use parking_lot::Mutex;

    #[test]
    fn test_zero_limit_rejected() {
        assert_eq!(
            ConcurrencyLimiter::new(0).err(),
            Some(LimiterError::InvalidLimit)
        );
    }

    #[tokio::test]
    async fn test_never_exceeds_limit_and_resolves_all() {
        let limiter = ConcurrencyLimiter::new(3).unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks = (0..12).map(|i| {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            limiter.run(async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                i
            })
        });

        let results: Vec<_> = join_all(tasks).await.into_iter().map(Result::unwrap).collect();

        assert_eq!(results, (0..12).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(limiter.running(), 0);
    }

    #[tokio::test]
    async fn test_admission_is_fifo() {
        let limiter = ConcurrencyLimiter::new(1).unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));

        let tasks = (0..6).map(|i| {
            let order = Arc::clone(&order);
            limiter.run(async move {
                order.lock().push(i);
                tokio::time::sleep(Duration::from_millis(1)).await;
            })
        });
        join_all(tasks).await;

        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let limiter = ConcurrencyLimiter::new(1).unwrap();

        let tasks = (0..4).map(|i| {
            limiter.run(async move {
                if i == 1 {
                    Err(format!("task {i} failed"))
                } else {
                    Ok(i)
                }
            })
        });
        let results: Vec<_> = join_all(tasks).await.into_iter().map(Result::unwrap).collect();

        assert_eq!(results[0], Ok(0));
        assert!(results[1].is_err());
        assert_eq!(results[2], Ok(2));
        assert_eq!(results[3], Ok(3));
    }

    #[tokio::test]
    async fn test_cancelled_before_admission() {
        let limiter = ConcurrencyLimiter::new(1).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let ran = AtomicUsize::new(0);
        let result = limiter
            .run_unless_cancelled(&cancel, async {
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        assert_eq!(result, Err(LimiterError::Cancelled));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_queued_tasks_dropped_on_cancel() {
        let limiter = ConcurrencyLimiter::new(1).unwrap();
        let cancel = CancellationToken::new();
        let ran = Arc::new(AtomicUsize::new(0));

        let tasks = (0..4).map(|i| {
            let ran = Arc::clone(&ran);
            let cancel_ref = &cancel;
            limiter.run_unless_cancelled(cancel_ref, async move {
                ran.fetch_add(1, Ordering::SeqCst);
                if i == 0 {
                    cancel_ref.cancel();
                }
            })
        });
        let results = join_all(tasks).await;

        assert!(results[0].is_ok());
        assert!(results[1..].iter().all(|r| *r == Err(LimiterError::Cancelled)));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_closed_limiter_rejects() {
        let limiter = ConcurrencyLimiter::new(2).unwrap();
        limiter.close();
        assert_eq!(limiter.run(async {}).await, Err(LimiterError::Closed));
    }
}
