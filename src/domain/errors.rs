use tokio::task::JoinError;

// ============================================================================
// Configuration Errors
// ============================================================================
//
// Raised before any philosopher starts. A run never begins with an invalid
// configuration.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid number of arguments: expected 4-5 arguments, got {got}")]
    InvalidArgs { got: usize },

    #[error("invalid argument value: {0}")]
    InvalidValue(String),
}

impl ConfigError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(reason.into())
    }
}

// ============================================================================
// Simulation Errors
// ============================================================================
//
// Starvation is NOT an error: it is reported as `Outcome::Starved`.
// These variants cover harness failures only.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// A fork's semaphore was closed. `Fork` never closes it, so this is
    /// unreachable today; `acquire` propagates it rather than panicking.
    #[error("fork {position} was closed while a philosopher waited on it")]
    ForkClosed { position: usize },

    #[error("simulation task panicked: {0}")]
    TaskPanicked(#[source] JoinError),

    #[error("simulation task was aborted before it finished")]
    TaskAborted,

    #[error("failed to set up metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl From<JoinError> for SimulationError {
    fn from(err: JoinError) -> Self {
        if err.is_panic() {
            SimulationError::TaskPanicked(err)
        } else {
            SimulationError::TaskAborted
        }
    }
}
