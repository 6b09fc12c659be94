use std::time::Duration;

use super::errors::ConfigError;

// ============================================================================
// Simulation Configuration
// ============================================================================
//
// Immutable once a run starts. All durations are strictly positive and the
// meal quota, when present, is at least one.
//
// ============================================================================

/// Default liveness-monitor polling interval.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_millis(10);

/// Extra pause after sleeping when the table has an odd number of seats.
pub const DEFAULT_ODD_COUNT_DELAY: Duration = Duration::from_millis(1);

const FIELD_NAMES: [&str; 5] = [
    "number_of_philosophers",
    "time_to_die",
    "time_to_eat",
    "time_to_sleep",
    "number_of_times_each_philosopher_must_eat",
];

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub philosophers: usize,
    pub time_to_die: Duration,
    pub time_to_eat: Duration,
    pub time_to_sleep: Duration,
    /// `None` means philosophers eat until the run ends some other way.
    pub meal_quota: Option<u32>,
    pub monitor_interval: Duration,
    /// Delay odd-numbered philosophers before their first meal.
    pub stagger: bool,
    pub odd_count_delay: Duration,
}

impl SimulationConfig {
    /// Build a validated configuration with default tunables.
    pub fn new(
        philosophers: usize,
        time_to_die: Duration,
        time_to_eat: Duration,
        time_to_sleep: Duration,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            philosophers,
            time_to_die,
            time_to_eat,
            time_to_sleep,
            meal_quota: None,
            monitor_interval: DEFAULT_MONITOR_INTERVAL,
            stagger: true,
            odd_count_delay: DEFAULT_ODD_COUNT_DELAY,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_meal_quota(mut self, quota: u32) -> Result<Self, ConfigError> {
        self.meal_quota = Some(quota);
        self.validate()?;
        Ok(self)
    }

    pub fn with_monitor_interval(mut self, interval: Duration) -> Result<Self, ConfigError> {
        self.monitor_interval = interval;
        self.validate()?;
        Ok(self)
    }

    pub fn with_stagger(mut self, stagger: bool) -> Self {
        self.stagger = stagger;
        self
    }

    /// Parse the positional command-line values (milliseconds), excluding
    /// the program name.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, ConfigError> {
        if !(4..=5).contains(&args.len()) {
            return Err(ConfigError::InvalidArgs { got: args.len() });
        }

        let mut values = [0u64; 5];
        for (slot, (raw, name)) in values.iter_mut().zip(args.iter().zip(FIELD_NAMES)) {
            *slot = parse_non_negative(raw.as_ref(), name)?;
        }

        let philosophers = usize::try_from(values[0]).map_err(|_| {
            ConfigError::invalid("number_of_philosophers is too large")
        })?;

        let config = Self::new(
            philosophers,
            Duration::from_millis(values[1]),
            Duration::from_millis(values[2]),
            Duration::from_millis(values[3]),
        )?;

        match args.get(4) {
            Some(_) => {
                let quota = u32::try_from(values[4]).map_err(|_| {
                    ConfigError::invalid("times to eat is too large")
                })?;
                config.with_meal_quota(quota)
            }
            None => Ok(config),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.philosophers < 1 {
            return Err(ConfigError::invalid("number_of_philosophers must be at least 1"));
        }
        if self.time_to_die.is_zero() || self.time_to_eat.is_zero() || self.time_to_sleep.is_zero() {
            return Err(ConfigError::invalid("time must be greater than 0 ms"));
        }
        if self.meal_quota == Some(0) {
            return Err(ConfigError::invalid("times to eat must be more than 0"));
        }
        if self.monitor_interval.is_zero() {
            return Err(ConfigError::invalid("monitor interval must be greater than 0 ms"));
        }
        Ok(())
    }

    pub fn is_odd_table(&self) -> bool {
        self.philosophers % 2 != 0
    }

    /// One-time delay before philosopher `id` (1-based) first gets hungry.
    ///
    /// Even seats start at once. Odd seats wait one eating period so their
    /// neighbours get a clean first round; the last seat of a table larger
    /// than one waits two, since it shares a fork with seat 1.
    pub fn initial_stagger(&self, id: usize) -> Duration {
        if !self.stagger || id % 2 == 0 {
            return Duration::ZERO;
        }
        if id == self.philosophers && self.philosophers != 1 {
            self.time_to_eat * 2
        } else {
            self.time_to_eat
        }
    }
}

fn parse_non_negative(raw: &str, name: &str) -> Result<u64, ConfigError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(format!("{} must be a valid integer", name)))?;
    u64::try_from(value).map_err(|_| ConfigError::invalid(format!("{} must be non-negative", name)))
}
