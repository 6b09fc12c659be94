use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::domain::LogLine;

// ============================================================================
// Event Sinks
// ============================================================================
//
// Where rendered log lines go. The console sink is the production output;
// the memory sink keeps lines around so tests can inspect a run.
//
// ============================================================================

pub trait EventSink: Send + Sync {
    fn record(&self, line: LogLine);
}

/// Writes each line to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn record(&self, line: LogLine) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{}", line) {
            tracing::warn!(error = %e, "Failed to write event line to stdout");
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<LogLine>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.lines().iter().map(ToString::to_string).collect()
    }
}

impl EventSink for MemorySink {
    fn record(&self, line: LogLine) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }
}
