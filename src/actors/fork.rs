use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_util::sync::CancellationToken;

use crate::domain::SimulationError;

// ============================================================================
// Fork - binary exclusive resource
// ============================================================================
//
// A capacity-1 semaphore. Holding the permit IS holding the fork; the permit
// lives inside `ForkGuard`, so dropping the guard on any path (including a
// cancelled meal) hands the fork back and wakes at most one waiter.
//
// The fork also tracks who holds it. An acquire that finds a previous holder
// still recorded is an ownership violation and is counted.
//
// ============================================================================

const NO_HOLDER: usize = 0;

#[derive(Debug)]
pub struct Fork {
    position: usize,
    gate: Semaphore,
    holder: AtomicUsize,
    violations: AtomicUsize,
}

impl Fork {
    /// A new, available fork at `position` (0-based).
    pub fn new(position: usize) -> Self {
        Self {
            position,
            gate: Semaphore::new(1),
            holder: AtomicUsize::new(NO_HOLDER),
            violations: AtomicUsize::new(0),
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Wait until the fork is free and take it on behalf of `philosopher`.
    ///
    /// Returns `Ok(None)` if `cancel` fires first; ownership is not
    /// transferred in that case.
    pub async fn acquire(
        &self,
        philosopher: usize,
        cancel: &CancellationToken,
    ) -> Result<Option<ForkGuard<'_>>, SimulationError> {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(None),
            permit = self.gate.acquire() => permit.map_err(|_| SimulationError::ForkClosed {
                position: self.position,
            })?,
        };

        let previous = self.holder.swap(philosopher, Ordering::SeqCst);
        if previous != NO_HOLDER {
            self.violations.fetch_add(1, Ordering::SeqCst);
            tracing::error!(
                fork = self.position,
                philosopher,
                previous_holder = previous,
                "Fork acquired while another philosopher still held it"
            );
        }

        Ok(Some(ForkGuard {
            fork: self,
            philosopher,
            _permit: permit,
        }))
    }

    pub fn is_available(&self) -> bool {
        self.gate.available_permits() == 1
    }

    /// Current holder's id, if any.
    pub fn holder(&self) -> Option<usize> {
        match self.holder.load(Ordering::SeqCst) {
            NO_HOLDER => None,
            id => Some(id),
        }
    }

    /// Number of times two philosophers were seen holding this fork at once.
    pub fn violations(&self) -> usize {
        self.violations.load(Ordering::SeqCst)
    }
}

/// Proof of holding a fork. The fork is released when this is dropped.
#[derive(Debug)]
pub struct ForkGuard<'a> {
    fork: &'a Fork,
    philosopher: usize,
    _permit: SemaphorePermit<'a>,
}

impl ForkGuard<'_> {
    pub fn position(&self) -> usize {
        self.fork.position
    }

    /// Return the fork. Equivalent to dropping the guard.
    pub fn release(self) {}
}

impl Drop for ForkGuard<'_> {
    fn drop(&mut self) {
        // Clear the holder before the permit field drops and wakes a waiter.
        if self
            .fork
            .holder
            .compare_exchange(self.philosopher, NO_HOLDER, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            self.fork.violations.fetch_add(1, Ordering::SeqCst);
            tracing::error!(
                fork = self.fork.position,
                philosopher = self.philosopher,
                "Fork released by a philosopher that was not its recorded holder"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_acquire_and_release() {
        let fork = Fork::new(0);
        let cancel = CancellationToken::new();

        let guard = fork.acquire(1, &cancel).await.unwrap().unwrap();
        assert!(!fork.is_available());
        assert_eq!(fork.holder(), Some(1));
        assert_eq!(guard.position(), 0);

        guard.release();
        assert!(fork.is_available());
        assert_eq!(fork.holder(), None);
        assert_eq!(fork.violations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_acquire_blocks_until_release() {
        let fork = Arc::new(Fork::new(3));
        let cancel = CancellationToken::new();

        let guard = fork.acquire(1, &cancel).await.unwrap().unwrap();

        let waiter = {
            let fork = fork.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let guard = fork.acquire(2, &cancel).await.unwrap().unwrap();
                let holder = fork.holder();
                guard.release();
                holder
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());
        assert_eq!(fork.holder(), Some(1));

        drop(guard);
        assert_eq!(waiter.await.unwrap(), Some(2));
        assert!(fork.is_available());
        assert_eq!(fork.violations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_abandons_acquisition() {
        let fork = Arc::new(Fork::new(0));
        let cancel = CancellationToken::new();
        let guard = fork.acquire(1, &cancel).await.unwrap().unwrap();

        let waiter = {
            let fork = fork.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { fork.acquire(2, &cancel).await.unwrap().is_none() })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        cancel.cancel();

        assert!(waiter.await.unwrap());
        // Ownership never moved to the cancelled waiter.
        assert_eq!(fork.holder(), Some(1));
        drop(guard);
        assert!(fork.is_available());
    }

    #[tokio::test]
    async fn test_cancelled_token_does_not_take_free_fork() {
        let fork = Fork::new(0);
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(fork.acquire(1, &cancel).await.unwrap().is_none());
        assert!(fork.is_available());
    }

    #[tokio::test]
    async fn test_release_by_wrong_holder_counts_violation() {
        let fork = Fork::new(2);
        let cancel = CancellationToken::new();

        let guard = fork.acquire(1, &cancel).await.unwrap().unwrap();
        fork.holder.store(4, Ordering::SeqCst);
        drop(guard);

        assert_eq!(fork.violations(), 1);
        assert!(fork.is_available());
        // The mismatched release leaves the foreign holder in place.
        assert_eq!(fork.holder(), Some(4));
    }

    #[tokio::test]
    async fn test_acquire_over_stale_holder_counts_violation() {
        let fork = Fork::new(0);
        let cancel = CancellationToken::new();
        fork.holder.store(3, Ordering::SeqCst);

        let guard = fork.acquire(1, &cancel).await.unwrap().unwrap();
        assert_eq!(fork.violations(), 1);
        assert_eq!(fork.holder(), Some(1));

        guard.release();
        assert_eq!(fork.violations(), 1);
        assert_eq!(fork.holder(), None);
    }
}
