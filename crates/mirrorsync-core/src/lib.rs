//! mirrorsync Core - Domain types, configuration and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `DirectoryEntry`, `ContentFingerprint`, `ActionRecord`
//! - **Configuration** - `SyncParameters` with validation and a builder
//! - **Port definitions** - Traits for adapters: `ILocalFileSystem`, `IActionReporter`
//!
//! # Architecture
//!
//! The domain module holds plain data types with no I/O. Ports define the
//! trait interfaces that the sync engine depends on and that adapter crates
//! implement (the real filesystem, the append-only action log).

pub mod config;
pub mod domain;
pub mod ports;
