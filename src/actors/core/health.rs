use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

// ============================================================================
// Health Check Abstractions
// ============================================================================
//
// What the liveness monitor needs from anything it audits. Philosophers
// implement this; tests can plug in their own components.
//
// ============================================================================

/// Health status of a philosopher
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HealthStatus {
    Healthy,
    /// Met its meal quota; no longer expected to eat.
    Finished,
    /// Time since the last meal exceeds the deadline by `overdue`.
    Starving { overdue: Duration },
}

impl HealthStatus {
    /// Classify a philosopher from the time since its last meal.
    pub fn assess(since_last_meal: Duration, deadline: Duration, finished: bool) -> Self {
        if finished {
            HealthStatus::Finished
        } else if since_last_meal > deadline {
            HealthStatus::Starving {
                overdue: since_last_meal - deadline,
            }
        } else {
            HealthStatus::Healthy
        }
    }

    pub fn is_starving(&self) -> bool {
        matches!(self, HealthStatus::Starving { .. })
    }
}

/// Health information for one philosopher, taken at `last_check`.
#[derive(Debug, Clone)]
pub struct PhilosopherHealth {
    pub id: usize,
    pub status: HealthStatus,
    pub since_last_meal: Duration,
    pub meals_eaten: u32,
    pub last_check: DateTime<Utc>,
}

/// Anything the liveness monitor can audit.
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Check this component against the starvation deadline.
    ///
    /// Must read its timestamp under the same lock its owner writes it with.
    async fn check_health(&self, deadline: Duration) -> PhilosopherHealth;
}
