use std::fmt;

// ============================================================================
// Event Log Lines
// ============================================================================
//
// One line per event, `<elapsed_ms> <philosopher_id> <event>`, plus the
// terminal `<elapsed_ms> all philosophers have eaten enough` on success.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Thinking,
    TookFork,
    Eating,
    Sleeping,
    Died,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Action::Thinking => "is thinking",
            Action::TookFork => "has taken a fork",
            Action::Eating => "is eating",
            Action::Sleeping => "is sleeping",
            Action::Died => "died",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEntry {
    Action { philosopher: usize, action: Action },
    AllFed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogLine {
    pub elapsed_ms: u64,
    pub entry: LogEntry,
}

impl LogLine {
    pub fn philosopher(&self) -> Option<usize> {
        match self.entry {
            LogEntry::Action { philosopher, .. } => Some(philosopher),
            LogEntry::AllFed => None,
        }
    }

    pub fn action(&self) -> Option<Action> {
        match self.entry {
            LogEntry::Action { action, .. } => Some(action),
            LogEntry::AllFed => None,
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entry {
            LogEntry::Action { philosopher, action } => {
                write!(f, "{} {} {}", self.elapsed_ms, philosopher, action)
            }
            LogEntry::AllFed => write!(f, "{} all philosophers have eaten enough", self.elapsed_ms),
        }
    }
}

/// The single line that closes a run's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Died { philosopher: usize },
    AllFed,
}

impl Terminal {
    pub(crate) fn entry(self) -> LogEntry {
        match self {
            Terminal::Died { philosopher } => LogEntry::Action {
                philosopher,
                action: Action::Died,
            },
            Terminal::AllFed => LogEntry::AllFed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_line_format() {
        let line = LogLine {
            elapsed_ms: 200,
            entry: LogEntry::Action {
                philosopher: 3,
                action: Action::TookFork,
            },
        };
        assert_eq!(line.to_string(), "200 3 has taken a fork");
        assert_eq!(line.philosopher(), Some(3));
    }

    #[test]
    fn test_all_fed_line_format() {
        let line = LogLine {
            elapsed_ms: 1210,
            entry: Terminal::AllFed.entry(),
        };
        assert_eq!(line.to_string(), "1210 all philosophers have eaten enough");
        assert_eq!(line.action(), None);
    }

    #[test]
    fn test_died_terminal_is_an_action_line() {
        let line = LogLine {
            elapsed_ms: 61,
            entry: Terminal::Died { philosopher: 2 }.entry(),
        };
        assert_eq!(line.to_string(), "61 2 died");
        assert_eq!(line.action(), Some(Action::Died));
    }
}
