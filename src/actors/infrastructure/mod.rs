// ============================================================================
// Infrastructure Actors
// ============================================================================
//
// The tasks that sit above the philosophers:
// - Liveness monitoring
// - Coordination of one simulation run
//
// ============================================================================

mod coordinator;
mod liveness_monitor;

pub use coordinator::Simulation;
pub use liveness_monitor::{LivenessMonitor, MonitorExit};
