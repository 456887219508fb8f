//! Content equality check
//!
//! [`ContentComparator`] decides whether two regular files hold the same
//! bytes. Cheap checks run first: differing names or sizes answer `false`
//! without touching file content. Only when both match are the MD5
//! fingerprints of the two files computed and compared.

use std::sync::Arc;

use mirrorsync_core::{domain::entry::DirectoryEntry, ports::local_filesystem::ILocalFileSystem};
use tracing::{instrument, trace};

/// Compares files by name, size, then content fingerprint
#[derive(Clone)]
pub struct ContentComparator {
    filesystem: Arc<dyn ILocalFileSystem>,
}

impl ContentComparator {
    pub fn new(filesystem: Arc<dyn ILocalFileSystem>) -> Self {
        Self { filesystem }
    }

    /// Returns true if both files have the same name and byte content
    ///
    /// # Errors
    ///
    /// Fails if either file cannot be read while computing its fingerprint.
    /// Read failures are never treated as "not equal".
    #[instrument(skip_all, fields(a = %a.path().display(), b = %b.path().display()))]
    pub async fn are_equal(&self, a: &DirectoryEntry, b: &DirectoryEntry) -> anyhow::Result<bool> {
        if a.name() != b.name() {
            trace!("names differ");
            return Ok(false);
        }
        if a.size() != b.size() {
            trace!(a_size = a.size(), b_size = b.size(), "sizes differ");
            return Ok(false);
        }

        let fingerprint_a = self.filesystem.compute_fingerprint(a.path()).await?;
        let fingerprint_b = self.filesystem.compute_fingerprint(b.path()).await?;

        let equal = fingerprint_a == fingerprint_b;
        trace!(equal, "fingerprints compared");
        Ok(equal)
    }
}

impl std::fmt::Debug for ContentComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentComparator").finish_non_exhaustive()
    }
}
