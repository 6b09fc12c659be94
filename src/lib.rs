//! Dining philosophers: N philosophers share N forks, eat under a deadline,
//! and a liveness monitor stops the table at the first starvation.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use philo::{ConsoleSink, Simulation, SimulationConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = SimulationConfig::new(
//!     5,
//!     Duration::from_millis(800),
//!     Duration::from_millis(200),
//!     Duration::from_millis(200),
//! )?
//! .with_meal_quota(7)?;
//!
//! let simulation = Simulation::new(config, Arc::new(ConsoleSink))?;
//! let report = simulation.run(CancellationToken::new()).await?;
//! println!("{:?}", report.outcome);
//! # Ok(())
//! # }
//! ```

pub mod actors;
pub mod domain;
pub mod messaging;
pub mod metrics;
pub mod utils;

pub use actors::Simulation;
pub use domain::{
    ConfigError, Outcome, SimulationConfig, SimulationError, SimulationReport, StarvationReport,
};
pub use messaging::{ConsoleSink, EventSink, MemorySink};
