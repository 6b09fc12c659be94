use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::core::{HealthCheckable, HealthStatus, PhilosopherHealth};
use super::fork::{Fork, ForkGuard};
use crate::domain::{Action, SimulationConfig, SimulationError};
use crate::messaging::EventLog;
use crate::metrics::SimulationMetrics;
use crate::utils::sleep_or_cancel;

// ============================================================================
// Philosopher
// ============================================================================
//
// Cycle: Thinking -> Hungry -> Eating -> Sleeping -> Thinking ...
// Terminal: Done (quota met) or Cancelled (token fired at a wait point).
// Death is decided by the liveness monitor, which cancels everyone.
//
// Forks are always requested lowest position first. That single global
// order rules out circular wait, for any table size.
//
// ============================================================================

/// Snapshot of a philosopher's vitals.
#[derive(Debug, Clone, Copy)]
pub struct VitalSigns {
    pub last_meal: Instant,
    pub meals_eaten: u32,
    pub finished: bool,
}

/// Vitals shared between a philosopher (writer) and the monitor (reader).
///
/// Every field sits behind one lock, so the monitor never sees a meal count
/// or finished flag out of step with the timestamp.
#[derive(Debug)]
pub struct PhilosopherVitals {
    id: usize,
    state: Mutex<VitalSigns>,
}

impl PhilosopherVitals {
    pub fn new(id: usize, seated_at: Instant) -> Self {
        Self {
            id,
            state: Mutex::new(VitalSigns {
                last_meal: seated_at,
                meals_eaten: 0,
                finished: false,
            }),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub async fn snapshot(&self) -> VitalSigns {
        *self.state.lock().await
    }

    /// Stamp the start of a meal. Never moves the timestamp backwards.
    pub(crate) async fn record_meal_start(&self) -> Instant {
        let mut state = self.state.lock().await;
        state.last_meal = state.last_meal.max(Instant::now());
        state.last_meal
    }

    /// Count a finished meal; flags the philosopher as finished once the
    /// quota is met. Returns the meal count.
    pub(crate) async fn record_meal_end(&self, quota: Option<u32>) -> u32 {
        let mut state = self.state.lock().await;
        state.meals_eaten += 1;
        if quota.is_some_and(|quota| state.meals_eaten >= quota) {
            state.finished = true;
        }
        state.meals_eaten
    }
}

#[async_trait]
impl HealthCheckable for PhilosopherVitals {
    async fn check_health(&self, deadline: Duration) -> PhilosopherHealth {
        let state = self.state.lock().await;
        let since_last_meal = Instant::now().saturating_duration_since(state.last_meal);

        PhilosopherHealth {
            id: self.id,
            status: HealthStatus::assess(since_last_meal, deadline, state.finished),
            since_last_meal,
            meals_eaten: state.meals_eaten,
            last_check: Utc::now(),
        }
    }
}

/// How a philosopher's task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhilosopherExit {
    Done { meals: u32 },
    Cancelled,
}

pub struct Philosopher {
    id: usize,
    first: Arc<Fork>,
    second: Arc<Fork>,
    vitals: Arc<PhilosopherVitals>,
    config: Arc<SimulationConfig>,
    log: Arc<EventLog>,
    metrics: Arc<SimulationMetrics>,
}

impl Philosopher {
    /// Seat philosopher `id` between its `left` and `right` forks. With a
    /// single seat both are the same fork.
    pub fn new(
        id: usize,
        left: Arc<Fork>,
        right: Arc<Fork>,
        vitals: Arc<PhilosopherVitals>,
        config: Arc<SimulationConfig>,
        log: Arc<EventLog>,
        metrics: Arc<SimulationMetrics>,
    ) -> Self {
        let (first, second) = if left.position() <= right.position() {
            (left, right)
        } else {
            (right, left)
        };

        Self {
            id,
            first,
            second,
            vitals,
            config,
            log,
            metrics,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Positions of the forks in the order they are requested.
    pub fn fork_order(&self) -> (usize, usize) {
        (self.first.position(), self.second.position())
    }

    pub async fn run(self, cancel: CancellationToken) -> Result<PhilosopherExit, SimulationError> {
        self.metrics.active_philosophers.inc();
        let result = self.dine(&cancel).await;
        self.metrics.active_philosophers.dec();

        match &result {
            Ok(PhilosopherExit::Done { meals }) => {
                tracing::debug!(philosopher = self.id, meals, "Philosopher met its meal quota");
            }
            Ok(PhilosopherExit::Cancelled) => {
                tracing::debug!(philosopher = self.id, "Philosopher stopped on cancellation");
            }
            Err(e) => {
                tracing::error!(philosopher = self.id, error = %e, "Philosopher failed");
            }
        }
        result
    }

    async fn dine(&self, cancel: &CancellationToken) -> Result<PhilosopherExit, SimulationError> {
        let stagger = self.config.initial_stagger(self.id);
        if sleep_or_cancel(stagger, cancel).await.is_cancelled() {
            return Ok(PhilosopherExit::Cancelled);
        }

        loop {
            if cancel.is_cancelled() {
                return Ok(PhilosopherExit::Cancelled);
            }
            self.log.emit(self.id, Action::Thinking);

            let Some(meals) = self.eat(cancel).await? else {
                return Ok(PhilosopherExit::Cancelled);
            };
            if self.config.meal_quota.is_some_and(|quota| meals >= quota) {
                return Ok(PhilosopherExit::Done { meals });
            }

            self.log.emit(self.id, Action::Sleeping);
            if sleep_or_cancel(self.config.time_to_sleep, cancel).await.is_cancelled() {
                return Ok(PhilosopherExit::Cancelled);
            }

            if self.config.is_odd_table()
                && sleep_or_cancel(self.config.odd_count_delay, cancel).await.is_cancelled()
            {
                return Ok(PhilosopherExit::Cancelled);
            }
        }
    }

    /// Hungry -> Eating -> forks released. Returns the meal count, or `None`
    /// if cancelled along the way. Any fork already held is released on
    /// every path out of here.
    async fn eat(&self, cancel: &CancellationToken) -> Result<Option<u32>, SimulationError> {
        let Some(first) = self.take_fork(&self.first, cancel).await? else {
            return Ok(None);
        };
        let Some(second) = self.take_fork(&self.second, cancel).await? else {
            return Ok(None);
        };

        // Stamped before the meal: the monitor must see "meal started".
        self.vitals.record_meal_start().await;
        self.log.emit(self.id, Action::Eating);
        let meal = sleep_or_cancel(self.config.time_to_eat, cancel).await;

        second.release();
        first.release();

        if meal.is_cancelled() {
            return Ok(None);
        }

        let meals = self.vitals.record_meal_end(self.config.meal_quota).await;
        self.metrics.record_meal(self.id);
        Ok(Some(meals))
    }

    async fn take_fork<'a>(
        &self,
        fork: &'a Fork,
        cancel: &CancellationToken,
    ) -> Result<Option<ForkGuard<'a>>, SimulationError> {
        let started = Instant::now();
        let guard = fork.acquire(self.id, cancel).await?;
        if guard.is_some() {
            self.metrics.record_fork_acquired(started.elapsed());
            self.log.emit(self.id, Action::TookFork);
        }
        Ok(guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::MemorySink;
    use crate::utils::SimClock;

    struct Table {
        forks: Vec<Arc<Fork>>,
        config: Arc<SimulationConfig>,
        log: Arc<EventLog>,
        sink: Arc<MemorySink>,
        metrics: Arc<SimulationMetrics>,
    }

    impl Table {
        fn new(config: SimulationConfig) -> Self {
            let sink = Arc::new(MemorySink::new());
            Self {
                forks: (0..config.philosophers).map(|p| Arc::new(Fork::new(p))).collect(),
                config: Arc::new(config),
                log: Arc::new(EventLog::new(sink.clone(), SimClock::start())),
                sink,
                metrics: Arc::new(SimulationMetrics::new().unwrap()),
            }
        }

        fn seat(&self, id: usize) -> (Philosopher, Arc<PhilosopherVitals>) {
            let n = self.forks.len();
            let vitals = Arc::new(PhilosopherVitals::new(id, Instant::now()));
            let philosopher = Philosopher::new(
                id,
                self.forks[id - 1].clone(),
                self.forks[id % n].clone(),
                vitals.clone(),
                self.config.clone(),
                self.log.clone(),
                self.metrics.clone(),
            );
            (philosopher, vitals)
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_lower_fork_is_requested_first() {
        let table = Table::new(SimulationConfig::new(5, ms(800), ms(100), ms(100)).unwrap());

        assert_eq!(table.seat(1).0.fork_order(), (0, 1));
        assert_eq!(table.seat(3).0.fork_order(), (2, 3));
        // The last seat wraps around: its right fork (0) comes first.
        assert_eq!(table.seat(5).0.fork_order(), (0, 4));
    }

    #[test]
    fn test_single_seat_uses_one_fork_twice() {
        let table = Table::new(SimulationConfig::new(1, ms(800), ms(100), ms(100)).unwrap());
        assert_eq!(table.seat(1).0.fork_order(), (0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_meal_never_moves_backwards() {
        let vitals = PhilosopherVitals::new(1, Instant::now());
        let mut previous = vitals.snapshot().await.last_meal;

        for _ in 0..5 {
            tokio::time::sleep(ms(7)).await;
            let stamped = vitals.record_meal_start().await;
            assert!(stamped >= previous);
            previous = stamped;
        }
    }

    #[tokio::test]
    async fn test_meal_end_marks_finished_at_quota() {
        let vitals = PhilosopherVitals::new(2, Instant::now());

        assert_eq!(vitals.record_meal_end(Some(2)).await, 1);
        assert!(!vitals.snapshot().await.finished);

        assert_eq!(vitals.record_meal_end(Some(2)).await, 2);
        assert!(vitals.snapshot().await.finished);

        let health = vitals.check_health(ms(1)).await;
        assert_eq!(health.status, HealthStatus::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_health_reports_starving() {
        let vitals = PhilosopherVitals::new(4, Instant::now());
        tokio::time::sleep(ms(120)).await;

        let health = vitals.check_health(ms(100)).await;
        assert_eq!(health.id, 4);
        assert!(health.status.is_starving());
        assert!(health.since_last_meal >= ms(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lone_diner_follows_the_cycle_until_quota() {
        let config = SimulationConfig::new(2, ms(800), ms(10), ms(10))
            .unwrap()
            .with_meal_quota(2)
            .unwrap()
            .with_stagger(false);
        let table = Table::new(config);
        let (philosopher, vitals) = table.seat(1);

        let exit = philosopher.run(CancellationToken::new()).await.unwrap();

        assert_eq!(exit, PhilosopherExit::Done { meals: 2 });
        assert_eq!(vitals.snapshot().await.meals_eaten, 2);
        assert_eq!(table.metrics.meals_of(1), 2);
        assert!(table.forks.iter().all(|fork| fork.is_available()));

        let actions: Vec<Action> = table.sink.lines().iter().filter_map(|l| l.action()).collect();
        assert_eq!(
            actions,
            vec![
                Action::Thinking,
                Action::TookFork,
                Action::TookFork,
                Action::Eating,
                Action::Sleeping,
                Action::Thinking,
                Action::TookFork,
                Action::TookFork,
                Action::Eating,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_eating_releases_both_forks() {
        let config = SimulationConfig::new(2, ms(800), ms(500), ms(10))
            .unwrap()
            .with_stagger(false);
        let table = Table::new(config);
        let (philosopher, vitals) = table.seat(2);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(philosopher.run(cancel.clone()));
        tokio::time::sleep(ms(100)).await;
        assert!(table.forks.iter().all(|fork| !fork.is_available()));

        cancel.cancel();
        assert_eq!(task.await.unwrap().unwrap(), PhilosopherExit::Cancelled);

        assert!(table.forks.iter().all(|fork| fork.is_available()));
        assert_eq!(vitals.snapshot().await.meals_eaten, 0);
        assert_eq!(table.metrics.active_philosophers.get(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_seat_takes_one_fork_then_waits() {
        let config = SimulationConfig::new(1, ms(800), ms(100), ms(100)).unwrap();
        let table = Table::new(config);
        let (philosopher, _) = table.seat(1);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(philosopher.run(cancel.clone()));
        tokio::time::sleep(ms(300)).await;
        cancel.cancel();

        assert_eq!(task.await.unwrap().unwrap(), PhilosopherExit::Cancelled);
        assert!(table.forks[0].is_available());

        let actions: Vec<Action> = table.sink.lines().iter().filter_map(|l| l.action()).collect();
        assert_eq!(actions, vec![Action::Thinking, Action::TookFork]);
    }
}
