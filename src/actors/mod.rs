// ============================================================================
// Actors Module
// ============================================================================
//
// Concurrent tasks of a simulation run.
//
// Structure:
// - core/           - Health abstractions shared by philosophers and monitor
// - fork            - The exclusive resource philosophers compete for
// - philosopher     - One philosopher's state machine and vitals
// - infrastructure/ - Liveness monitor and the coordinating Simulation
//
// ============================================================================

pub mod core;
pub mod fork;
pub mod infrastructure;
pub mod philosopher;

pub use self::core::{HealthCheckable, HealthStatus, PhilosopherHealth};
pub use fork::{Fork, ForkGuard};
pub use infrastructure::{LivenessMonitor, MonitorExit, Simulation};
pub use philosopher::{Philosopher, PhilosopherExit, PhilosopherVitals, VitalSigns};
