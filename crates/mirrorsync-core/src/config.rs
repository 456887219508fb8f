//! Configuration module for mirrorsync.
//!
//! Provides the immutable [`SyncParameters`] for one run, with validation,
//! interval parsing, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::errors::DomainError;

// ---------------------------------------------------------------------------
// SyncParameters
// ---------------------------------------------------------------------------

/// Parameters for one mirroring run.
///
/// Created once at startup and read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncParameters {
    /// Root of the authoritative tree.
    source: PathBuf,
    /// Root of the tree kept identical to `source`.
    replica: PathBuf,
    /// Append-only action log.
    log_file: PathBuf,
    /// Seconds to wait between cycles. Zero means back-to-back cycles.
    interval_secs: u64,
}

impl SyncParameters {
    pub fn new(
        source: impl Into<PathBuf>,
        replica: impl Into<PathBuf>,
        log_file: impl Into<PathBuf>,
        interval_secs: u64,
    ) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            log_file: log_file.into(),
            interval_secs,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn replica(&self) -> &Path {
        &self.replica
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// The inter-cycle wait as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Parse an interval given in whole seconds.
///
/// Only non-negative integers are accepted; zero is legal.
pub fn parse_interval(raw: &str) -> Result<u64, DomainError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| DomainError::InvalidInterval(raw.to_string()))
}

// ---------------------------------------------------------------------------
// SyncParameters::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending field, e.g. `"replica"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Resolve symlinks and `..` when the path exists; otherwise keep it as given.
fn normalized(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }

    // Resolve the deepest existing ancestor and re-append the missing tail
    let mut tail = Vec::new();
    let mut current = path;
    while let (Some(parent), Some(name)) = (current.parent(), current.file_name()) {
        tail.push(name);
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if let Ok(resolved) = parent.canonicalize() {
            return tail.iter().rev().fold(resolved, |acc, name| acc.join(name));
        }
        current = parent;
    }
    path.to_path_buf()
}

impl SyncParameters {
    /// Validate the parameters and return all errors found.
    ///
    /// An empty vector means the parameters are valid. Whether the roots
    /// exist is not checked here: the scheduler reports missing roots
    /// through the action log before entering its loop.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (field, path) in [
            ("source", &self.source),
            ("replica", &self.replica),
            ("log_file", &self.log_file),
        ] {
            if path.as_os_str().is_empty() {
                errors.push(ValidationError {
                    field: field.into(),
                    message: "must not be empty".into(),
                });
            }
        }

        if self.source.as_os_str().is_empty() || self.replica.as_os_str().is_empty() {
            return errors;
        }

        let source = normalized(&self.source);
        let replica = normalized(&self.replica);

        if source == replica {
            errors.push(ValidationError {
                field: "replica".into(),
                message: format!("must differ from source: {}", self.replica.display()),
            });
        } else if replica.starts_with(&source) {
            errors.push(ValidationError {
                field: "replica".into(),
                message: format!(
                    "must not be inside source: {} is under {}",
                    self.replica.display(),
                    self.source.display()
                ),
            });
        } else if source.starts_with(&replica) {
            errors.push(ValidationError {
                field: "source".into(),
                message: format!(
                    "must not be inside replica: {} is under {}",
                    self.source.display(),
                    self.replica.display()
                ),
            });
        }

        if !self.log_file.as_os_str().is_empty() {
            let log_file = normalized(&self.log_file);
            for (root_name, root, resolved) in [
                ("replica", &self.replica, &replica),
                ("source", &self.source, &source),
            ] {
                if log_file.starts_with(resolved) {
                    errors.push(ValidationError {
                        field: "log_file".into(),
                        message: format!(
                            "must not be inside {root_name}: {} is under {}",
                            self.log_file.display(),
                            root.display()
                        ),
                    });
                }
            }
        }

        errors
    }

    /// Like [`validate`](Self::validate), folding every error into one
    /// [`DomainError::ValidationFailed`].
    pub fn ensure_valid(&self) -> Result<(), DomainError> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(DomainError::ValidationFailed(joined))
    }
}

// ---------------------------------------------------------------------------
// SyncParametersBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing [`SyncParameters`] programmatically.
///
/// # Example
///
/// ```rust
/// use mirrorsync_core::config::SyncParametersBuilder;
///
/// let params = SyncParametersBuilder::new()
///     .source("/data/source")
///     .replica("/backup/replica")
///     .log_file("/var/log/mirrorsync.log")
///     .interval_secs(60)
///     .build();
/// assert_eq!(params.interval_secs(), 60);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncParametersBuilder {
    source: PathBuf,
    replica: PathBuf,
    log_file: PathBuf,
    interval_secs: u64,
}

impl SyncParametersBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = path.into();
        self
    }

    pub fn replica(mut self, path: impl Into<PathBuf>) -> Self {
        self.replica = path.into();
        self
    }

    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = path.into();
        self
    }

    pub fn interval_secs(mut self, seconds: u64) -> Self {
        self.interval_secs = seconds;
        self
    }

    pub fn build(self) -> SyncParameters {
        SyncParameters::new(self.source, self.replica, self.log_file, self.interval_secs)
    }

    /// Build and validate in one step.
    ///
    /// # Errors
    ///
    /// [`DomainError::ValidationFailed`] listing every problem found.
    pub fn build_validated(self) -> Result<SyncParameters, DomainError> {
        let params = self.build();
        params.ensure_valid()?;
        Ok(params)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
