//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. The sync engine depends on these interfaces;
//! their implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ILocalFileSystem`] - Directory listing, copy/delete and content fingerprints
//! - [`IActionReporter`] - Sink for human-readable action records

pub mod action_reporter;
pub mod local_filesystem;

pub use action_reporter::IActionReporter;
pub use local_filesystem::ILocalFileSystem;
