//! Action reporting port (driven/secondary port)
//!
//! The reconciler and scheduler describe everything they do as
//! [`ActionRecord`]s and hand them to an [`IActionReporter`]. The production
//! adapter appends each record to a log file and echoes it to the console;
//! tests substitute an in-memory recorder.
//!
//! ## Design Notes
//!
//! - Reporting is infallible from the caller's point of view. An adapter
//!   that cannot persist a record logs the failure through `tracing` and
//!   returns normally, so a full disk never aborts a sync cycle.
//! - When `report` returns, the record has been written and flushed.
//! - Implementations must serialize concurrent calls so that records are
//!   never interleaved within a line.

use crate::domain::action::ActionRecord;

/// Port trait for the action sink
#[async_trait::async_trait]
pub trait IActionReporter: Send + Sync {
    /// Emits exactly one record
    async fn report(&self, record: ActionRecord);
}
