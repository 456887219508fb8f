//! Action records
//!
//! An [`ActionRecord`] is the human-readable description of one mutation of
//! the replica tree or one lifecycle event of the scheduler. Records are not
//! retained: they are handed to an
//! [`IActionReporter`](crate::ports::action_reporter::IActionReporter) and
//! written through immediately.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local, Utc};

use super::newtypes::CycleId;
use super::summary::ReconcileSummary;

/// Format used for the wall-clock time in cycle boundary records
const CYCLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Kinds of reportable actions and events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// A source file was copied over its replica counterpart
    FileCopied,
    /// A replica-only file was deleted
    FileDeleted,
    /// A replica directory was created to mirror a source directory
    DirectoryCreated,
    /// A replica-only directory subtree was deleted
    DirectoryDeleted,
    /// A sync cycle began
    CycleStarted,
    /// A sync cycle ended (successfully or not)
    CycleFinished,
    /// A sync cycle aborted with an error
    CycleFailed,
    /// The inter-cycle wait was interrupted by cancellation
    WaitCancelled,
    /// An external interrupt asked the scheduler to stop
    ShutdownRequested,
    /// A root directory is missing; the scheduler will not start
    PreconditionFailed,
}

impl ActionKind {
    /// Returns true for the four kinds that mutate the replica tree
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ActionKind::FileCopied
                | ActionKind::FileDeleted
                | ActionKind::DirectoryCreated
                | ActionKind::DirectoryDeleted
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::FileCopied => "file_copied",
            ActionKind::FileDeleted => "file_deleted",
            ActionKind::DirectoryCreated => "directory_created",
            ActionKind::DirectoryDeleted => "directory_deleted",
            ActionKind::CycleStarted => "cycle_started",
            ActionKind::CycleFinished => "cycle_finished",
            ActionKind::CycleFailed => "cycle_failed",
            ActionKind::WaitCancelled => "wait_cancelled",
            ActionKind::ShutdownRequested => "shutdown_requested",
            ActionKind::PreconditionFailed => "precondition_failed",
        };
        write!(f, "{}", s)
    }
}

/// One reportable action, rendered as a single log line by [`fmt::Display`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    timestamp: DateTime<Utc>,
    kind: ActionKind,
    message: String,
}

impl ActionRecord {
    /// Creates a record of the given kind with a free-form message
    ///
    /// Line breaks are folded into spaces so that every record stays a
    /// single line in the log.
    pub fn new(kind: ActionKind, message: impl Into<String>) -> Self {
        let message: String = message.into();
        let message = if message.contains(&['\n', '\r'][..]) {
            message
                .split(&['\n', '\r'][..])
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            message
        };
        Self {
            timestamp: Utc::now(),
            kind,
            message,
        }
    }

    pub fn file_copied(source: &Path, replica: &Path) -> Self {
        Self::new(
            ActionKind::FileCopied,
            format!("Copied: {} -> {}", source.display(), replica.display()),
        )
    }

    pub fn file_deleted(path: &Path) -> Self {
        Self::new(
            ActionKind::FileDeleted,
            format!("Deleted: {}", path.display()),
        )
    }

    pub fn directory_created(path: &Path) -> Self {
        Self::new(
            ActionKind::DirectoryCreated,
            format!("Created directory: {}", path.display()),
        )
    }

    pub fn directory_deleted(path: &Path) -> Self {
        Self::new(
            ActionKind::DirectoryDeleted,
            format!("Deleted directory: {}", path.display()),
        )
    }

    pub fn cycle_started(cycle: CycleId, at: DateTime<Local>) -> Self {
        Self::new(
            ActionKind::CycleStarted,
            format!("Sync {} started at {}", cycle, at.format(CYCLE_TIME_FORMAT)),
        )
    }

    /// Cycle end marker; `summary` is `None` when the cycle failed
    pub fn cycle_finished(
        cycle: CycleId,
        at: DateTime<Local>,
        summary: Option<&ReconcileSummary>,
    ) -> Self {
        let mut message = format!("Sync {} finished at {}", cycle, at.format(CYCLE_TIME_FORMAT));
        if let Some(s) = summary {
            message.push_str(&format!(
                " ({} copied, {} deleted, {} directories created, {} directories deleted)",
                s.files_copied, s.files_deleted, s.dirs_created, s.dirs_deleted
            ));
        }
        Self::new(ActionKind::CycleFinished, message)
    }

    pub fn cycle_failed(error: &anyhow::Error) -> Self {
        Self::new(
            ActionKind::CycleFailed,
            format!("Error during sync: {error:#}"),
        )
    }

    pub fn wait_cancelled() -> Self {
        Self::new(ActionKind::WaitCancelled, "The syncing task was canceled")
    }

    pub fn shutdown_requested(message: impl Into<String>) -> Self {
        Self::new(ActionKind::ShutdownRequested, message)
    }

    pub fn missing_root(path: &Path) -> Self {
        Self::new(
            ActionKind::PreconditionFailed,
            format!("One of the directories does not exist: {}", path.display()),
        )
    }

    /// When the record was created
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
