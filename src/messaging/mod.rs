mod event_log;
mod sink;

pub use event_log::EventLog;
pub use sink::{ConsoleSink, EventSink, MemorySink};
