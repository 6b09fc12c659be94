use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::actors::core::{HealthCheckable, PhilosopherHealth};
use crate::domain::{SimulationConfig, StarvationReport, Terminal};
use crate::messaging::EventLog;
use crate::metrics::SimulationMetrics;

// ============================================================================
// Liveness Monitor - detects starvation
// ============================================================================
//
// Responsibilities:
// - Poll every philosopher on a fixed short interval
// - Compare time since last meal against the starvation deadline
// - Report the first starving philosopher and cancel the whole run
//
// Polling keeps detection accurate to one interval without a per-philosopher
// deadline timer.
//
// ============================================================================

/// How the monitor's task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
    Starved(StarvationReport),
    /// The run was cancelled, or another terminal event concluded it first.
    Cancelled,
}

pub struct LivenessMonitor {
    subjects: Vec<Arc<dyn HealthCheckable>>,
    deadline: Duration,
    interval: Duration,
    log: Arc<EventLog>,
    metrics: Arc<SimulationMetrics>,
}

impl LivenessMonitor {
    pub fn new(
        subjects: Vec<Arc<dyn HealthCheckable>>,
        config: &SimulationConfig,
        log: Arc<EventLog>,
        metrics: Arc<SimulationMetrics>,
    ) -> Self {
        Self {
            subjects,
            deadline: config.time_to_die,
            interval: config.monitor_interval,
            log,
            metrics,
        }
    }

    /// One polling round. Returns the first starving philosopher, in seat
    /// order, if any.
    pub async fn audit(&self) -> Option<PhilosopherHealth> {
        for subject in &self.subjects {
            let health = subject.check_health(self.deadline).await;
            if health.status.is_starving() {
                return Some(health);
            }
        }
        None
    }

    pub async fn run(self, cancel: CancellationToken) -> MonitorExit {
        tracing::debug!(
            philosophers = self.subjects.len(),
            interval_ms = self.interval.as_millis(),
            deadline_ms = self.deadline.as_millis(),
            "Liveness monitor started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("Liveness monitor stopped on cancellation");
                    return MonitorExit::Cancelled;
                }
                _ = ticker.tick() => {}
            }
            self.metrics.monitor_ticks_total.inc();

            let Some(health) = self.audit().await else {
                continue;
            };

            let exit = self.report(&health);
            cancel.cancel();
            return exit;
        }
    }

    fn report(&self, health: &PhilosopherHealth) -> MonitorExit {
        let Some(elapsed_ms) = self.log.conclude(Terminal::Died {
            philosopher: health.id,
        }) else {
            // Completion or a cancellation got there first.
            return MonitorExit::Cancelled;
        };

        self.metrics.starvations_total.inc();
        tracing::warn!(
            philosopher = health.id,
            elapsed_ms,
            since_last_meal_ms = health.since_last_meal.as_millis(),
            meals_eaten = health.meals_eaten,
            checked_at = %health.last_check,
            "💀 Philosopher starved"
        );

        MonitorExit::Starved(StarvationReport {
            philosopher: health.id,
            elapsed_ms,
        })
    }
}
