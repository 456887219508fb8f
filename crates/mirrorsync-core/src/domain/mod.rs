//! Domain entities
//!
//! This module contains the core domain types for mirrorsync:
//! - Directory entry snapshots produced by non-recursive listings
//! - Newtypes for content fingerprints and cycle identifiers
//! - Action records describing every mutation and lifecycle event
//! - Per-cycle reconciliation counters
//! - Domain-specific error types

pub mod action;
pub mod entry;
pub mod errors;
pub mod newtypes;
pub mod summary;

// Re-export commonly used types
pub use action::{ActionKind, ActionRecord};
pub use entry::{DirectoryEntry, EntryKind};
pub use errors::DomainError;
pub use newtypes::{ContentFingerprint, CycleId};
pub use summary::ReconcileSummary;
