//! Local filesystem port (driven/secondary port)
//!
//! This module defines the interface the reconciler uses to inspect and
//! mutate the source and replica trees.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because filesystem errors are adapter-specific
//!   and are reported to the user with their full cause chain.
//! - Listings are non-recursive: the reconciler drives the recursion itself.
//! - No operation retries or times out; a blocked call blocks the cycle.

use std::path::Path;

use crate::domain::entry::DirectoryEntry;
use crate::domain::newtypes::ContentFingerprint;

/// Port trait for local filesystem operations
///
/// ## Implementation Notes
///
/// - `list_entries` returns every child in the order the filesystem yields
///   them. Symbolic links and special files are never followed and come
///   back as `EntryKind::Other`.
/// - `remove_file` also unlinks special entries (a link, not its target).
/// - `copy_file` overwrites an existing destination and gives it the
///   source's modification time.
/// - `remove_directory_all` deletes the directory and everything below it.
#[async_trait::async_trait]
pub trait ILocalFileSystem: Send + Sync {
    /// Lists the files and subdirectories directly under `dir`
    async fn list_entries(&self, dir: &Path) -> anyhow::Result<Vec<DirectoryEntry>>;

    /// Returns true if `path` exists and is a directory
    async fn is_directory(&self, path: &Path) -> anyhow::Result<bool>;

    /// Copies the file at `from` to `to`, replacing `to` if present
    async fn copy_file(&self, from: &Path, to: &Path) -> anyhow::Result<()>;

    /// Deletes a single regular file or special entry
    async fn remove_file(&self, path: &Path) -> anyhow::Result<()>;

    /// Creates a directory (parents must already exist)
    async fn create_directory(&self, path: &Path) -> anyhow::Result<()>;

    /// Deletes a directory and its whole subtree
    async fn remove_directory_all(&self, path: &Path) -> anyhow::Result<()>;

    /// Computes the content fingerprint over the full byte stream of a file
    async fn compute_fingerprint(&self, path: &Path) -> anyhow::Result<ContentFingerprint>;
}
