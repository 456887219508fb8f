//! Tree reconciliation
//!
//! [`TreeReconciler`] makes a replica directory tree match a source tree.
//! The walk is depth-first and pre-order. At each level:
//!
//! 1. Both directories are listed (one level, no recursion).
//! 2. Every source file is copied over the replica unless the replica holds
//!    a same-named file that is at least as new and byte-equal. A replica
//!    directory or special entry in the way is removed first.
//! 3. Replica files and special entries without a same-named source file
//!    are deleted.
//! 4. Both directories are listed again for their subdirectories.
//! 5. Source subdirectories missing from the replica are created; every
//!    source subdirectory is then reconciled recursively.
//! 6. Replica subdirectories without a same-named source subdirectory are
//!    deleted together with everything beneath them.
//!
//! Source entries that are neither files nor directories (symbolic links,
//! devices) are not mirrored. Replica special entries are always unlinked,
//! never written through.
//!
//! Every mutation is reported through the injected [`IActionReporter`] as
//! soon as it has happened. The first I/O failure aborts the remaining work
//! and is returned to the caller; nothing is kept between calls.

use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use mirrorsync_core::{
    domain::{action::ActionRecord, entry::DirectoryEntry, summary::ReconcileSummary},
    ports::{action_reporter::IActionReporter, local_filesystem::ILocalFileSystem},
};
use tracing::{debug, info, instrument};

use crate::comparator::ContentComparator;

type ReconcileFuture<'a> = Pin<Box<dyn Future<Output = Result<ReconcileSummary>> + Send + 'a>>;

/// One-way, recursive reconciliation of a replica tree against a source tree
pub struct TreeReconciler {
    filesystem: Arc<dyn ILocalFileSystem>,
    reporter: Arc<dyn IActionReporter>,
    comparator: ContentComparator,
}

impl TreeReconciler {
    pub fn new(filesystem: Arc<dyn ILocalFileSystem>, reporter: Arc<dyn IActionReporter>) -> Self {
        let comparator = ContentComparator::new(Arc::clone(&filesystem));
        Self {
            filesystem,
            reporter,
            comparator,
        }
    }

    /// Reconciles `replica` against `source`, both of which must exist
    ///
    /// Returns the counts of everything done across the whole tree.
    ///
    /// # Errors
    ///
    /// Returns the first filesystem failure encountered. Work done before
    /// the failure has already been applied and reported.
    #[instrument(skip_all, fields(source = %source.display(), replica = %replica.display()))]
    pub async fn reconcile(&self, source: &Path, replica: &Path) -> Result<ReconcileSummary> {
        let summary = self.reconcile_dir(source, replica).await?;
        info!(
            copied = summary.files_copied,
            deleted = summary.files_deleted,
            unchanged = summary.files_unchanged,
            dirs_created = summary.dirs_created,
            dirs_deleted = summary.dirs_deleted,
            "Reconciliation complete"
        );
        Ok(summary)
    }

    fn reconcile_dir<'a>(&'a self, source: &'a Path, replica: &'a Path) -> ReconcileFuture<'a> {
        Box::pin(async move {
            debug!(source = %source.display(), replica = %replica.display(), "Reconciling directory");
            let mut summary = ReconcileSummary::default();

            // Files
            let source_entries = self.filesystem.list_entries(source).await?;
            let replica_entries = self.filesystem.list_entries(replica).await?;
            let replica_by_name = index_by_name(&replica_entries);

            for source_file in source_entries.iter().filter(|e| e.is_file()) {
                let target = replica.join(source_file.name());
                match replica_by_name.get(source_file.name()) {
                    Some(existing) if existing.is_file() => {
                        if self.is_up_to_date(source_file, existing).await? {
                            summary.files_unchanged += 1;
                            continue;
                        }
                    }
                    Some(blocking_dir) if blocking_dir.is_dir() => {
                        self.filesystem
                            .remove_directory_all(blocking_dir.path())
                            .await?;
                        self.reporter
                            .report(ActionRecord::directory_deleted(blocking_dir.path()))
                            .await;
                        summary.dirs_deleted += 1;
                    }
                    Some(special) => {
                        self.filesystem.remove_file(special.path()).await?;
                        self.reporter
                            .report(ActionRecord::file_deleted(special.path()))
                            .await;
                        summary.files_deleted += 1;
                    }
                    None => {}
                }

                self.filesystem
                    .copy_file(source_file.path(), &target)
                    .await?;
                self.reporter
                    .report(ActionRecord::file_copied(source_file.path(), &target))
                    .await;
                summary.files_copied += 1;
            }

            for skipped in source_entries.iter().filter(|e| e.is_other()) {
                debug!(path = %skipped.path().display(), "Not mirroring special entry");
            }

            let source_file_names = names_of_kind(&source_entries, DirectoryEntry::is_file);
            for replica_file in replica_entries.iter().filter(|e| !e.is_dir()) {
                if source_file_names.contains(replica_file.name()) {
                    continue;
                }
                self.filesystem.remove_file(replica_file.path()).await?;
                self.reporter
                    .report(ActionRecord::file_deleted(replica_file.path()))
                    .await;
                summary.files_deleted += 1;
            }

            // Directories
            let source_dirs: Vec<DirectoryEntry> = self
                .filesystem
                .list_entries(source)
                .await?
                .into_iter()
                .filter(DirectoryEntry::is_dir)
                .collect();
            let replica_dirs: Vec<DirectoryEntry> = self
                .filesystem
                .list_entries(replica)
                .await?
                .into_iter()
                .filter(DirectoryEntry::is_dir)
                .collect();
            let replica_dir_names = names_of_kind(&replica_dirs, DirectoryEntry::is_dir);

            for source_dir in &source_dirs {
                let target = replica.join(source_dir.name());
                if !replica_dir_names.contains(source_dir.name()) {
                    self.filesystem.create_directory(&target).await?;
                    self.reporter
                        .report(ActionRecord::directory_created(&target))
                        .await;
                    summary.dirs_created += 1;
                }
                let nested = self.reconcile_dir(source_dir.path(), &target).await?;
                summary.merge(nested);
            }

            let source_dir_names = names_of_kind(&source_dirs, DirectoryEntry::is_dir);
            for replica_dir in &replica_dirs {
                if source_dir_names.contains(replica_dir.name()) {
                    continue;
                }
                self.filesystem
                    .remove_directory_all(replica_dir.path())
                    .await?;
                self.reporter
                    .report(ActionRecord::directory_deleted(replica_dir.path()))
                    .await;
                summary.dirs_deleted += 1;
            }

            Ok(summary)
        })
    }

    /// A replica file is current when it is at least as new as the source
    /// file and holds the same bytes
    async fn is_up_to_date(
        &self,
        source_file: &DirectoryEntry,
        replica_file: &DirectoryEntry,
    ) -> Result<bool> {
        if !replica_file.is_not_older_than(source_file) {
            return Ok(false);
        }
        self.comparator.are_equal(source_file, replica_file).await
    }
}

impl std::fmt::Debug for TreeReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeReconciler")
            .field("comparator", &self.comparator)
            .finish_non_exhaustive()
    }
}

fn index_by_name(entries: &[DirectoryEntry]) -> HashMap<&OsStr, &DirectoryEntry> {
    entries.iter().map(|e| (e.name(), e)).collect()
}

fn names_of_kind(entries: &[DirectoryEntry], keep: fn(&DirectoryEntry) -> bool) -> HashSet<&OsStr> {
    entries
        .iter()
        .filter(|e| keep(e))
        .map(DirectoryEntry::name)
        .collect()
}
