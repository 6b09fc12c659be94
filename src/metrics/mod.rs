use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

// ============================================================================
// Metrics Module - Prometheus metrics for a simulation run
// ============================================================================
//
// Each simulation owns its own registry, so separate tables (and tests) never
// share counters. Counts accumulate across runs of the same table. Covers:
// - Meals eaten per philosopher
// - Fork acquisitions and how long philosophers waited for them
// - Monitor ticks and starvations
// - Philosophers still at the table
//
// ============================================================================

pub struct SimulationMetrics {
    registry: Registry,

    pub meals_total: IntCounterVec,
    pub forks_acquired_total: IntCounter,
    pub fork_wait_seconds: Histogram,
    pub starvations_total: IntCounter,
    pub monitor_ticks_total: IntCounter,
    pub active_philosophers: IntGauge,
}

impl SimulationMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let meals_total = IntCounterVec::new(
            Opts::new("philo_meals_total", "Meals eaten, by philosopher"),
            &["philosopher"],
        )?;
        registry.register(Box::new(meals_total.clone()))?;

        let forks_acquired_total = IntCounter::new(
            "philo_forks_acquired_total",
            "Forks taken by any philosopher",
        )?;
        registry.register(Box::new(forks_acquired_total.clone()))?;

        let fork_wait_seconds = Histogram::with_opts(
            HistogramOpts::new("philo_fork_wait_seconds", "Time spent waiting for a fork")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(fork_wait_seconds.clone()))?;

        let starvations_total = IntCounter::new(
            "philo_starvations_total",
            "Philosophers reported as starved",
        )?;
        registry.register(Box::new(starvations_total.clone()))?;

        let monitor_ticks_total = IntCounter::new(
            "philo_monitor_ticks_total",
            "Liveness monitor polling rounds",
        )?;
        registry.register(Box::new(monitor_ticks_total.clone()))?;

        let active_philosophers = IntGauge::new(
            "philo_active_philosophers",
            "Philosophers whose task is still running",
        )?;
        registry.register(Box::new(active_philosophers.clone()))?;

        Ok(Self {
            registry,
            meals_total,
            forks_acquired_total,
            fork_wait_seconds,
            starvations_total,
            monitor_ticks_total,
            active_philosophers,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_meal(&self, philosopher: usize) {
        self.meals_total
            .with_label_values(&[philosopher.to_string().as_str()])
            .inc();
    }

    pub fn meals_of(&self, philosopher: usize) -> u64 {
        self.meals_total
            .with_label_values(&[philosopher.to_string().as_str()])
            .get()
    }

    pub fn record_fork_acquired(&self, waited: Duration) {
        self.forks_acquired_total.inc();
        self.fork_wait_seconds.observe(waited.as_secs_f64());
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
