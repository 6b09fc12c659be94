// ============================================================================
// Core Actor Abstractions
// ============================================================================
//
// Traits and types shared by the philosophers and the liveness monitor.
//
// ============================================================================

pub mod health;

pub use health::*;
