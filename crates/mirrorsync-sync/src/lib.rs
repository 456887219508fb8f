//! mirrorsync Sync - One-way tree mirroring engine
//!
//! Provides:
//! - Content equality checks (size + MD5 fingerprint)
//! - Recursive, pre-order reconciliation of a replica tree against a source tree
//! - A cancellable scheduler that runs reconciliation cycles at a fixed interval
//!
//! ## Modules
//!
//! - [`comparator`] - [`ContentComparator`](comparator::ContentComparator), decides whether two files hold the same bytes
//! - [`reconciler`] - [`TreeReconciler`](reconciler::TreeReconciler), copies/deletes until replica matches source
//! - [`scheduler`] - [`SyncScheduler`](scheduler::SyncScheduler), periodic cycles with cooperative cancellation
//! - [`filesystem`] - Local filesystem adapter (listing, copy with mtime, MD5)

pub mod comparator;
pub mod filesystem;
pub mod reconciler;
pub mod scheduler;

use std::path::PathBuf;

use thiserror::Error;

pub use comparator::ContentComparator;
pub use filesystem::LocalFileSystemAdapter;
pub use reconciler::TreeReconciler;
pub use scheduler::{SchedulerExit, SchedulerState, SyncScheduler};

/// Errors that can occur during synchronization operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error occurred during file operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Insufficient filesystem permissions
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// A path expected to be a directory is something else
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

impl SyncError {
    /// Classify an I/O error against the path it concerns
    pub fn from_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => SyncError::PathNotFound(path.into()),
            std::io::ErrorKind::PermissionDenied => SyncError::PermissionDenied(path.into()),
            _ => SyncError::IoError(err),
        }
    }
}
