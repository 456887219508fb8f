//! Domain error types
//!
//! This module defines error types for configuration values.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid sync interval (expected a non-negative integer number of seconds)
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
