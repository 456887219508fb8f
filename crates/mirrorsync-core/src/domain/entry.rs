//! Directory entry snapshot
//!
//! A [`DirectoryEntry`] is what a non-recursive listing of one directory
//! yields for each child. Entries are recomputed on
//! every reconciliation call and never cached across cycles.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Kind of a listed entry
///
/// Symbolic links, sockets, devices and FIFOs are [`EntryKind::Other`].
/// Links are never followed: a link to a directory is still `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// A file, subdirectory or special entry discovered directly under a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Final path component, unique within the parent directory
    name: OsString,
    /// Full path of the entry
    path: PathBuf,
    kind: EntryKind,
    /// Size in bytes (always 0 for directories and special entries)
    size: u64,
    /// Last modification time, if the platform reports one
    modified: Option<DateTime<Utc>>,
}

impl DirectoryEntry {
    /// Snapshot of a regular file
    pub fn file(path: impl Into<PathBuf>, size: u64, modified: Option<DateTime<Utc>>) -> Self {
        Self::new(path.into(), EntryKind::File, size, modified)
    }

    /// Snapshot of a directory
    pub fn directory(path: impl Into<PathBuf>, modified: Option<DateTime<Utc>>) -> Self {
        Self::new(path.into(), EntryKind::Directory, 0, modified)
    }

    /// Snapshot of a symbolic link or other special file
    pub fn other(path: impl Into<PathBuf>, modified: Option<DateTime<Utc>>) -> Self {
        Self::new(path.into(), EntryKind::Other, 0, modified)
    }

    fn new(path: PathBuf, kind: EntryKind, size: u64, modified: Option<DateTime<Utc>>) -> Self {
        let name = path
            .file_name()
            .map(OsStr::to_os_string)
            .unwrap_or_else(|| path.as_os_str().to_os_string());
        Self {
            name,
            path,
            kind,
            size,
            modified,
        }
    }

    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Neither a regular file nor a directory
    pub fn is_other(&self) -> bool {
        self.kind == EntryKind::Other
    }

    /// Returns true if this entry was modified at or after `other`
    ///
    /// An entry with an unknown modification time is never considered
    /// up to date.
    pub fn is_not_older_than(&self, other: &DirectoryEntry) -> bool {
        match (self.modified, other.modified) {
            (Some(mine), Some(theirs)) => mine >= theirs,
            _ => false,
        }
    }
}
