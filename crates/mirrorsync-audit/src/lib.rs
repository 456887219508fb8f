//! mirrorsync Audit - Append-only action log
//!
//! Provides:
//! - `ActionLog`: the production `IActionReporter`, writing one flushed line
//!   per action record to a log file and echoing it to the console

pub mod logger;

pub use logger::ActionLog;
