use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// Simulation Outcome
// ============================================================================
//
// Decided exactly once per run, by whichever terminal event happens first.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarvationReport {
    pub philosopher: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Every philosopher reached its meal quota.
    Completed,
    Starved(StarvationReport),
    /// Stopped by the caller's cancellation token.
    Cancelled,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Starved(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MealTally {
    pub philosopher: usize,
    pub meals_eaten: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub outcome: Outcome,
    pub elapsed_ms: u64,
    pub meals: Vec<MealTally>,
}

impl SimulationReport {
    pub fn meals_of(&self, philosopher: usize) -> Option<u32> {
        self.meals
            .iter()
            .find(|tally| tally.philosopher == philosopher)
            .map(|tally| tally.meals_eaten)
    }
}
