//! Per-cycle reconciliation counters

/// Summary of the mutations performed by one reconciliation call
///
/// Counters cover the whole subtree below the roots passed to the
/// reconciler, so nested calls are folded into their parent with
/// [`ReconcileSummary::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Files copied from source to replica (new or changed)
    pub files_copied: u32,
    /// Replica files removed because the source no longer has them
    pub files_deleted: u32,
    /// Source files left alone because the replica copy is current
    pub files_unchanged: u32,
    /// Replica directories created to mirror a source directory
    pub dirs_created: u32,
    /// Replica directory subtrees removed
    pub dirs_deleted: u32,
}

impl ReconcileSummary {
    /// Fold the counters of a nested call into this one
    pub fn merge(&mut self, other: ReconcileSummary) {
        self.files_copied += other.files_copied;
        self.files_deleted += other.files_deleted;
        self.files_unchanged += other.files_unchanged;
        self.dirs_created += other.dirs_created;
        self.dirs_deleted += other.dirs_deleted;
    }

    /// Number of mutations applied to the replica tree
    pub fn total_changes(&self) -> u32 {
        self.files_copied + self.files_deleted + self.dirs_created + self.dirs_deleted
    }

    /// Returns true if the cycle found the replica already in sync
    pub fn is_noop(&self) -> bool {
        self.total_changes() == 0
    }
}
