//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`ILocalFileSystem`] using `tokio::fs` for async file operations.
//!
//! ## Design Decisions
//!
//! - **Non-recursive listing**: `list_entries` reads one directory level.
//!   Entry types are taken from the directory entry itself, so symbolic
//!   links are never followed; they and other special files are listed as
//!   [`EntryKind::Other`](mirrorsync_core::domain::entry::EntryKind::Other).
//! - **Copy keeps mtime**: the copied file receives the source's last
//!   modification time, so the next cycle's staleness check sees the replica
//!   as current.
//! - **MD5 fingerprint**: computed over the full byte stream in fixed-size
//!   chunks; adequate for change detection only.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use mirrorsync_core::{
    domain::{entry::DirectoryEntry, newtypes::ContentFingerprint},
    ports::local_filesystem::ILocalFileSystem,
};
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument};

use crate::SyncError;

/// Size of the buffer used when streaming a file through the hasher
const READ_CHUNK_SIZE: usize = 64 * 1024;

// ============================================================================
// LocalFileSystemAdapter struct
// ============================================================================

/// Adapter that bridges the [`ILocalFileSystem`] port to the real filesystem.
///
/// This is a zero-sized struct because all operations derive their context
/// from the path arguments. The source and replica roots live in the
/// scheduler.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystemAdapter;

impl LocalFileSystemAdapter {
    /// Create a new `LocalFileSystemAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Wrap an I/O error with its classification and the operation that failed.
fn io_failure(err: std::io::Error, path: &Path, operation: &str) -> anyhow::Error {
    anyhow::Error::new(SyncError::from_io(err, path))
        .context(format!("Failed to {operation} {}", path.display()))
}

// ============================================================================
// ILocalFileSystem implementation
// ============================================================================

#[async_trait::async_trait]
impl ILocalFileSystem for LocalFileSystemAdapter {
    #[instrument(skip_all, fields(dir = %dir.display()))]
    async fn list_entries(&self, dir: &Path) -> anyhow::Result<Vec<DirectoryEntry>> {
        let mut reader = match tokio::fs::read_dir(dir).await {
            Ok(reader) => reader,
            Err(e) => {
                let is_file = tokio::fs::metadata(dir)
                    .await
                    .map(|m| !m.is_dir())
                    .unwrap_or(false);
                if is_file {
                    return Err(anyhow::Error::new(SyncError::NotADirectory(dir.to_path_buf()))
                        .context(format!("Failed to read directory {}", dir.display())));
                }
                return Err(io_failure(e, dir, "read directory"));
            }
        };

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| io_failure(e, dir, "read directory"))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| io_failure(e, &path, "inspect"))?;

            let metadata = entry
                .metadata()
                .await
                .map_err(|e| io_failure(e, &path, "read metadata of"))?;
            let modified = metadata.modified().ok().map(DateTime::<Utc>::from);

            if file_type.is_dir() {
                entries.push(DirectoryEntry::directory(path, modified));
            } else if file_type.is_file() {
                entries.push(DirectoryEntry::file(path, metadata.len(), modified));
            } else {
                debug!(path = %path.display(), "special entry listed");
                entries.push(DirectoryEntry::other(path, modified));
            }
        }

        debug!(count = entries.len(), "directory listed");
        Ok(entries)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    async fn is_directory(&self, path: &Path) -> anyhow::Result<bool> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_failure(e, path, "inspect")),
        }
    }

    #[instrument(skip_all, fields(from = %from.display(), to = %to.display()))]
    async fn copy_file(&self, from: &Path, to: &Path) -> anyhow::Result<()> {
        let source = from.to_path_buf();
        let target = to.to_path_buf();

        let bytes = tokio::task::spawn_blocking(move || -> std::io::Result<u64> {
            let bytes = std::fs::copy(&source, &target)?;
            let modified = std::fs::metadata(&source)?.modified()?;
            let copied = std::fs::OpenOptions::new().write(true).open(&target)?;
            copied.set_modified(modified)?;
            Ok(bytes)
        })
        .await
        .context("Copy task failed to complete")?
        .map_err(SyncError::IoError)
        .with_context(|| format!("Failed to copy {} -> {}", from.display(), to.display()))?;

        debug!(bytes, "copy complete");
        Ok(())
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    async fn remove_file(&self, path: &Path) -> anyhow::Result<()> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| io_failure(e, path, "delete file"))?;
        debug!("file removed");
        Ok(())
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    async fn create_directory(&self, path: &Path) -> anyhow::Result<()> {
        tokio::fs::create_dir(path)
            .await
            .map_err(|e| io_failure(e, path, "create directory"))?;
        debug!("directory created");
        Ok(())
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    async fn remove_directory_all(&self, path: &Path) -> anyhow::Result<()> {
        tokio::fs::remove_dir_all(path)
            .await
            .map_err(|e| io_failure(e, path, "delete directory"))?;
        debug!("directory removed recursively");
        Ok(())
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    async fn compute_fingerprint(&self, path: &Path) -> anyhow::Result<ContentFingerprint> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| io_failure(e, path, "open"))?;

        let mut hasher = Md5::new();
        let mut buffer = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let read = file
                .read(&mut buffer)
                .await
                .map_err(|e| io_failure(e, path, "read"))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        let mut bytes = [0u8; ContentFingerprint::LEN];
        bytes.copy_from_slice(&hasher.finalize());
        let fingerprint = ContentFingerprint::from_bytes(bytes);

        debug!(fingerprint = %fingerprint, "fingerprint computed");
        Ok(fingerprint)
    }
}

// ============================================================================
// Unit tests
// ============================================================================
