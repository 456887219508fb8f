//! Sync scheduler - runs reconciliation cycles at a fixed interval
//!
//! The [`SyncScheduler`] drives the [`TreeReconciler`] until its
//! [`CancellationToken`] fires. Each cycle is bracketed by start and finish
//! records; a failing cycle is reported and the loop carries on after the
//! normal wait.
//!
//! ## Flow
//!
//! ```text
//! Idle ──→ Running ──→ CycleComplete ──(interval elapsed)──→ Running
//!                           │
//!                     (cancelled) ──→ Stopped
//! ```
//!
//! Cancellation is cooperative. It is checked before the first cycle and
//! during the wait between cycles. A cycle that is already running always
//! completes.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use mirrorsync_core::{
    config::SyncParameters,
    domain::{action::ActionRecord, newtypes::CycleId},
    ports::{action_reporter::IActionReporter, local_filesystem::ILocalFileSystem},
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::reconciler::TreeReconciler;

// ============================================================================
// SchedulerState / SchedulerExit
// ============================================================================

/// Lifecycle state of a [`SyncScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Constructed, `run` not called yet
    Idle,
    /// A reconciliation cycle is in progress
    Running,
    /// The last cycle finished; waiting for the next one
    CycleComplete,
    /// The loop has exited
    Stopped,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Running => "running",
            SchedulerState::CycleComplete => "cycle_complete",
            SchedulerState::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}

/// Why [`SyncScheduler::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerExit {
    /// The cancellation token fired
    Cancelled,
    /// A root directory was missing at startup; no cycle ran
    PreconditionFailed,
}

// ============================================================================
// SyncScheduler
// ============================================================================

/// Periodic, cancellable driver for [`TreeReconciler`]
pub struct SyncScheduler {
    source: PathBuf,
    replica: PathBuf,
    interval: Duration,
    filesystem: Arc<dyn ILocalFileSystem>,
    reporter: Arc<dyn IActionReporter>,
    reconciler: TreeReconciler,
    state_tx: watch::Sender<SchedulerState>,
}

impl SyncScheduler {
    /// Creates a scheduler for the roots and interval in `params`
    ///
    /// The same filesystem and reporter are shared with the reconciler.
    pub fn new(
        params: &SyncParameters,
        filesystem: Arc<dyn ILocalFileSystem>,
        reporter: Arc<dyn IActionReporter>,
    ) -> Self {
        info!(
            source = %params.source().display(),
            replica = %params.replica().display(),
            interval_secs = params.interval_secs(),
            "Creating sync scheduler"
        );

        let reconciler = TreeReconciler::new(Arc::clone(&filesystem), Arc::clone(&reporter));
        let (state_tx, _) = watch::channel(SchedulerState::Idle);

        Self {
            source: params.source().to_path_buf(),
            replica: params.replica().to_path_buf(),
            interval: params.interval(),
            filesystem,
            reporter,
            reconciler,
            state_tx,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SchedulerState {
        *self.state_tx.borrow()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: SchedulerState) {
        self.state_tx.send_replace(state);
    }

    /// Runs cycles until `shutdown` is cancelled
    ///
    /// Returns [`SchedulerExit::PreconditionFailed`] without running any
    /// cycle if the source or replica root is not an existing directory.
    /// Reconciliation errors never end the loop.
    pub async fn run(&self, shutdown: CancellationToken) -> SchedulerExit {
        info!("Sync scheduler starting");

        if !self.roots_exist().await {
            self.set_state(SchedulerState::Stopped);
            return SchedulerExit::PreconditionFailed;
        }

        let mut cycle = CycleId::first();

        while !shutdown.is_cancelled() {
            self.set_state(SchedulerState::Running);
            self.reporter
                .report(ActionRecord::cycle_started(cycle, Local::now()))
                .await;

            let summary = match self.reconciler.reconcile(&self.source, &self.replica).await {
                Ok(summary) => Some(summary),
                Err(e) => {
                    error!(cycle = cycle.value(), error = %format!("{e:#}"), "Sync cycle failed");
                    self.reporter.report(ActionRecord::cycle_failed(&e)).await;
                    None
                }
            };

            self.reporter
                .report(ActionRecord::cycle_finished(
                    cycle,
                    Local::now(),
                    summary.as_ref(),
                ))
                .await;
            self.set_state(SchedulerState::CycleComplete);

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received while waiting for next cycle");
                    self.reporter.report(ActionRecord::wait_cancelled()).await;
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            cycle = cycle.next();
        }

        self.set_state(SchedulerState::Stopped);
        info!("Sync scheduler stopped");
        SchedulerExit::Cancelled
    }

    /// Reports the first root that is not an existing directory
    async fn roots_exist(&self) -> bool {
        for root in [&self.source, &self.replica] {
            let is_dir = match self.filesystem.is_directory(root).await {
                Ok(is_dir) => is_dir,
                Err(e) => {
                    warn!(path = %root.display(), error = %format!("{e:#}"), "Cannot inspect root");
                    false
                }
            };
            if !is_dir {
                self.reporter.report(ActionRecord::missing_root(root)).await;
                return false;
            }
        }
        true
    }
}

impl fmt::Debug for SyncScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncScheduler")
            .field("source", &self.source)
            .field("replica", &self.replica)
            .field("interval", &self.interval)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Unit tests
// ============================================================================
