use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::liveness_monitor::{LivenessMonitor, MonitorExit};
use crate::actors::core::HealthCheckable;
use crate::actors::fork::Fork;
use crate::actors::philosopher::{Philosopher, PhilosopherExit, PhilosopherVitals};
use crate::domain::{
    MealTally, Outcome, SimulationConfig, SimulationError, SimulationReport, Terminal,
};
use crate::messaging::{EventLog, EventSink};
use crate::metrics::SimulationMetrics;
use crate::utils::SimClock;

// ============================================================================
// Simulation Coordinator - runs one table of philosophers
// ============================================================================
//
// Responsibilities:
// - Build the forks and seat N philosophers between them
// - Launch every philosopher and the liveness monitor under one lifetime
// - Take the first terminal event: starvation, all fed, external
//   cancellation, or a task failure
// - Cancel everything else and report the outcome
//
// Task Hierarchy:
//   Simulation (owns the run lifetime, a child of the caller's token)
//   ├── Philosopher 1..N
//   └── LivenessMonitor
//
// ============================================================================

enum TaskExit {
    Philosopher(Result<PhilosopherExit, SimulationError>),
    Monitor(MonitorExit),
}

pub struct Simulation {
    config: Arc<SimulationConfig>,
    forks: Vec<Arc<Fork>>,
    sink: Arc<dyn EventSink>,
    metrics: Arc<SimulationMetrics>,
}

impl Simulation {
    pub fn new(config: SimulationConfig, sink: Arc<dyn EventSink>) -> Result<Self, SimulationError> {
        let forks = (0..config.philosophers)
            .map(|position| Arc::new(Fork::new(position)))
            .collect();

        Ok(Self {
            config: Arc::new(config),
            forks,
            sink,
            metrics: Arc::new(SimulationMetrics::new()?),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn forks(&self) -> &[Arc<Fork>] {
        &self.forks
    }

    pub fn metrics(&self) -> &SimulationMetrics {
        &self.metrics
    }

    /// Run the table until its first terminal event.
    ///
    /// Cancelling `external` stops the run with `Outcome::Cancelled`; the
    /// run's own cancellations never propagate back to `external`.
    pub async fn run(&self, external: CancellationToken) -> Result<SimulationReport, SimulationError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("simulation", %run_id);
        self.execute(run_id, external).instrument(span).await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        external: CancellationToken,
    ) -> Result<SimulationReport, SimulationError> {
        let count = self.config.philosophers;
        let clock = SimClock::start();
        let log = Arc::new(EventLog::new(self.sink.clone(), clock));
        let lifetime = external.child_token();

        let vitals: Vec<Arc<PhilosopherVitals>> = (1..=count)
            .map(|id| Arc::new(PhilosopherVitals::new(id, clock.started_at())))
            .collect();

        tracing::info!(
            philosophers = count,
            time_to_die_ms = self.config.time_to_die.as_millis(),
            time_to_eat_ms = self.config.time_to_eat.as_millis(),
            time_to_sleep_ms = self.config.time_to_sleep.as_millis(),
            meal_quota = ?self.config.meal_quota,
            "🍝 Simulation started"
        );

        let mut tasks = JoinSet::new();
        for (seat, seat_vitals) in vitals.iter().enumerate() {
            let philosopher = Philosopher::new(
                seat + 1,
                self.forks[seat].clone(),
                self.forks[(seat + 1) % count].clone(),
                seat_vitals.clone(),
                self.config.clone(),
                log.clone(),
                self.metrics.clone(),
            );
            let cancel = lifetime.clone();
            tasks.spawn(async move { TaskExit::Philosopher(philosopher.run(cancel).await) });
        }

        let subjects = vitals
            .iter()
            .map(|v| v.clone() as Arc<dyn HealthCheckable>)
            .collect();
        let monitor = LivenessMonitor::new(subjects, &self.config, log.clone(), self.metrics.clone());
        let cancel = lifetime.clone();
        tasks.spawn(async move { TaskExit::Monitor(monitor.run(cancel).await) });

        let mut finished = 0usize;
        let mut verdict: Option<Result<Outcome, SimulationError>> = None;

        while let Some(joined) = tasks.join_next().await {
            let exit = match joined {
                Ok(exit) => exit,
                Err(e) => {
                    tracing::error!(error = %e, "Simulation task did not finish cleanly");
                    log.seal();
                    lifetime.cancel();
                    verdict.get_or_insert(Err(SimulationError::from(e)));
                    continue;
                }
            };

            match exit {
                TaskExit::Philosopher(Ok(PhilosopherExit::Done { .. })) => {
                    finished += 1;
                    if finished == count {
                        if let Some(elapsed_ms) = log.conclude(Terminal::AllFed) {
                            tracing::info!(elapsed_ms, "✅ All philosophers have eaten enough");
                            verdict.get_or_insert(Ok(Outcome::Completed));
                        }
                        lifetime.cancel();
                    }
                }
                TaskExit::Philosopher(Err(e)) => {
                    log.seal();
                    lifetime.cancel();
                    verdict.get_or_insert(Err(e));
                }
                TaskExit::Monitor(MonitorExit::Starved(report)) => {
                    lifetime.cancel();
                    verdict.get_or_insert(Ok(Outcome::Starved(report)));
                }
                TaskExit::Philosopher(Ok(PhilosopherExit::Cancelled))
                | TaskExit::Monitor(MonitorExit::Cancelled) => {}
            }
        }
        log.seal();

        let outcome = match verdict {
            Some(verdict) => verdict?,
            None => {
                tracing::info!(
                    external = external.is_cancelled(),
                    "🛑 Simulation cancelled"
                );
                Outcome::Cancelled
            }
        };

        let mut meals = Vec::with_capacity(count);
        for seat_vitals in &vitals {
            meals.push(MealTally {
                philosopher: seat_vitals.id(),
                meals_eaten: seat_vitals.snapshot().await.meals_eaten,
            });
        }

        Ok(SimulationReport {
            run_id,
            outcome,
            elapsed_ms: clock.elapsed_ms(),
            meals,
        })
    }
}
