use std::time::Duration;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Cancellable Waits
// ============================================================================
//
// Every timed wait in the simulation goes through here so it returns the
// instant the shared cancellation token fires.
//
// ============================================================================

/// How a cancellable wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    Elapsed,
    Cancelled,
}

impl Wait {
    pub fn is_cancelled(self) -> bool {
        matches!(self, Wait::Cancelled)
    }
}

/// Sleep for `duration` unless `cancel` fires first.
pub async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> Wait {
    if cancel.is_cancelled() {
        return Wait::Cancelled;
    }
    if duration.is_zero() {
        return Wait::Elapsed;
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Wait::Cancelled,
        _ = tokio::time::sleep(duration) => Wait::Elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_wait_runs_to_completion() {
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let result = sleep_or_cancel(Duration::from_millis(100), &cancel).await;

        assert_eq!(result, Wait::Elapsed);
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_early_on_cancel() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let result = sleep_or_cancel(Duration::from_secs(10), &cancel).await;

        assert!(result.is_cancelled());
        assert!(started.elapsed() < Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_already_cancelled_token_skips_wait() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = sleep_or_cancel(Duration::from_secs(60), &cancel).await;
        assert_eq!(result, Wait::Cancelled);
    }
}
