//! ActionLog - append-only, line-oriented action log
//!
//! Implements `IActionReporter` by writing each record's message as one
//! line to a file opened in append mode, flushing before returning, and
//! echoing the same line to stdout (or any injected writer). All methods that report are non-fatal:
//! write errors are logged via `tracing::warn!` but never propagated.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use mirrorsync_core::{domain::action::ActionRecord, ports::action_reporter::IActionReporter};
use tokio::{
    fs::{File, OpenOptions},
    io::AsyncWriteExt,
    sync::Mutex,
};

/// Action log backed by an append-mode file.
///
/// A single async mutex guards both the file and the echo writer, so
/// concurrent reports never interleave and the echo shows lines in the
/// same order as the file.
pub struct ActionLog {
    path: PathBuf,
    sinks: Mutex<Sinks>,
}

struct Sinks {
    file: File,
    echo: Option<Box<dyn Write + Send>>,
}

impl ActionLog {
    /// Opens (or creates) the log at `path` for appending.
    ///
    /// Missing parent directories are created. Console echo is enabled.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Action log opened");

        Ok(Self {
            path,
            sinks: Mutex::new(Sinks {
                file,
                echo: Some(Box::new(std::io::stdout())),
            }),
        })
    }

    /// Enables or disables the stdout echo.
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.sinks.get_mut().echo = if enabled {
            Some(Box::new(std::io::stdout()))
        } else {
            None
        };
        self
    }

    /// Echoes every line to `writer` instead of stdout.
    pub fn with_echo_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.sinks.get_mut().echo = Some(Box::new(writer));
        self
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line and flush it, then echo it, holding the lock for
    /// the whole write.
    async fn append_line(&self, line: &str) -> std::io::Result<()> {
        let mut sinks = self.sinks.lock().await;
        let Sinks { file, echo } = &mut *sinks;

        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;
        file.sync_data().await?;

        if let Some(echo) = echo {
            writeln!(echo, "{line}")?;
            echo.flush()?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl IActionReporter for ActionLog {
    async fn report(&self, record: ActionRecord) {
        if let Err(e) = self.append_line(record.message()).await {
            tracing::warn!(
                error = %e,
                path = %self.path.display(),
                kind = %record.kind(),
                timestamp = %record.timestamp(),
                "Failed to write action log entry"
            );
        }
    }
}

impl std::fmt::Debug for ActionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionLog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
