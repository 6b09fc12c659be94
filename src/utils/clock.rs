use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Simulation Clock
// ============================================================================
//
// Elapsed time since the run started. Backed by `tokio::time::Instant` so a
// paused test runtime drives it deterministically.
//
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct SimClock {
    start: Instant,
}

impl SimClock {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn started_at(&self) -> Instant {
        self.start
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
