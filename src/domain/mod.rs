// ============================================================================
// Domain Layer
// ============================================================================
//
// Plain data shared by the actors: the validated run configuration, the
// event-log vocabulary, the run outcome, and the error taxonomy.
//
// ============================================================================

pub mod config;
pub mod errors;
pub mod events;
pub mod outcome;

pub use config::*;
pub use errors::*;
pub use events::*;
pub use outcome::*;
