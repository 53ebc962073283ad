// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Accounting of outstanding background work.
//!
//! Every unit of work holds a [`WorkGuard`] for as long as it may still log.
//! Shutdown waits for the count to return to zero before closing the queues,
//! so a late producer can never race the final drain.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

struct Inner {
    active: AtomicUsize,
    idle: Notify,
}

/// Counter of registered background work units
#[derive(Clone)]
pub struct WorkTracker {
    inner: Arc<Inner>,
}

/// Registration of one unit of work; dropping it marks the unit finished
#[must_use = "the unit of work ends as soon as the guard is dropped"]
pub struct WorkGuard {
    inner: Arc<Inner>,
}

impl WorkTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                active: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    /// Register a unit of work
    pub fn begin(&self) -> WorkGuard {
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        WorkGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of units currently registered
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Spawn `future` on the runtime as a tracked unit of work
    ///
    /// The guard lives inside the task, so it is released even if the
    /// future panics or the task is aborted.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let guard = self.begin();
        tokio::spawn(async move {
            let _guard = guard;
            future.await
        })
    }

    /// Wait until no unit of work is registered
    pub async fn await_zero(&self) {
        loop {
            let idle = self.inner.idle.notified();
            tokio::pin!(idle);
            // Register interest before checking so a release in between is not missed
            idle.as_mut().enable();
            if self.active() == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Wait until no unit of work is registered, giving up after `timeout`
    ///
    /// Returns `true` if the count reached zero in time.
    pub async fn await_zero_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.await_zero()).await.is_ok()
    }
}

impl Default for WorkTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        if self.inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_await_zero_returns_immediately_when_idle() {
        let tracker = WorkTracker::new();
        assert_eq!(tracker.active(), 0);
        assert!(tracker.await_zero_timeout(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_guard_drop_releases() {
        let tracker = WorkTracker::new();
        let a = tracker.begin();
        let b = tracker.begin();
        assert_eq!(tracker.active(), 2);

        drop(a);
        assert!(!tracker.await_zero_timeout(Duration::from_millis(10)).await);

        drop(b);
        assert_eq!(tracker.active(), 0);
        assert!(tracker.await_zero_timeout(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_waiter_wakes_on_last_release() {
        let tracker = WorkTracker::new();
        let guard = tracker.begin();

        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.await_zero().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_begin_end_pairs() {
        let tracker = WorkTracker::new();
        let mut handles = Vec::new();
        for i in 0..64u64 {
            handles.push(tracker.spawn(async move {
                tokio::time::sleep(Duration::from_millis(i % 7)).await;
            }));
        }
        assert!(tracker.await_zero_timeout(Duration::from_secs(5)).await);
        assert_eq!(tracker.active(), 0);
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_panicking_work_still_releases() {
        let tracker = WorkTracker::new();
        let handle = tracker.spawn(async {
            panic!("worker blew up");
        });
        assert!(handle.await.is_err());
        assert!(tracker.await_zero_timeout(Duration::from_millis(100)).await);
    }
}
