use std::sync::{Arc, Mutex, PoisonError};

use super::sink::EventSink;
use crate::domain::{Action, LogEntry, LogLine, Terminal};
use crate::utils::SimClock;

// ============================================================================
// Event Log
// ============================================================================
//
// Serializes every line of a run through one lock so lines are written in
// timestamp order. The log is also the arbiter of the run's outcome: the
// first caller to `conclude` writes the terminal line and seals it, and
// nothing is written after that.
//
// ============================================================================

pub struct EventLog {
    sink: Arc<dyn EventSink>,
    clock: SimClock,
    sealed: Mutex<bool>,
}

impl EventLog {
    pub fn new(sink: Arc<dyn EventSink>, clock: SimClock) -> Self {
        Self {
            sink,
            clock,
            sealed: Mutex::new(false),
        }
    }

    /// Write a philosopher event. Returns `false` once the log is sealed.
    pub fn emit(&self, philosopher: usize, action: Action) -> bool {
        let sealed = self.sealed.lock().unwrap_or_else(PoisonError::into_inner);
        if *sealed {
            return false;
        }
        self.write(LogEntry::Action { philosopher, action });
        true
    }

    /// Write the terminal line and seal the log.
    ///
    /// Returns the terminal line's timestamp, only for the caller that
    /// actually concluded the run.
    pub fn conclude(&self, terminal: Terminal) -> Option<u64> {
        let mut sealed = self.sealed.lock().unwrap_or_else(PoisonError::into_inner);
        if *sealed {
            return None;
        }
        let elapsed_ms = self.write(terminal.entry());
        *sealed = true;
        Some(elapsed_ms)
    }

    /// Seal without a terminal line.
    pub fn seal(&self) {
        *self.sealed.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    pub fn is_sealed(&self) -> bool {
        *self.sealed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Caller holds the `sealed` lock.
    fn write(&self, entry: LogEntry) -> u64 {
        let elapsed_ms = self.clock.elapsed_ms();
        self.sink.record(LogLine { elapsed_ms, entry });
        elapsed_ms
    }
}
