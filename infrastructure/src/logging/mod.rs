//! Logging infrastructure: structured activity logging.
//!
//! Provides [`JsonlActivityLogger`], a JSONL file writer that implements
//! the [`ActivityLogger`](selfcheck_application::ActivityLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlActivityLogger;
