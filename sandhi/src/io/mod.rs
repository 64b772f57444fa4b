//! Trace I/O layer.
//!
//! - [`trace`]: JSON-lines trace format, reader and writer
//! - [`replay`]: Drives a controller from a trace on a manual clock

pub mod replay;
pub mod trace;

pub use replay::{ModeTransition, ReplaySummary, Replayer};
pub use trace::{load_trace, parse_line, read_trace, write_trace, TraceEvent, TraceReader};
