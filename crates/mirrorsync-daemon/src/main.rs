//! mirrorsync - periodic one-way directory mirroring
//!
//! Usage: `mirrorsync <SOURCE> <REPLICA> <LOG_FILE> <INTERVAL_SECS>`
//!
//! Keeps REPLICA identical to SOURCE, running a reconciliation cycle every
//! INTERVAL_SECS seconds until interrupted. Every action is appended to
//! LOG_FILE and echoed to stdout.
//!
//! # Architecture
//!
//! The binary parses its arguments, opens the action log, then hands the
//! roots and interval to a `SyncScheduler`. The loop is controlled by a
//! `CancellationToken` that is triggered on receipt of SIGINT or SIGTERM.
//! The process exits once the scheduler has observed the cancellation.

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::Result;
use clap::{error::ErrorKind, Parser};
use mirrorsync_audit::ActionLog;
use mirrorsync_core::{
    config::{parse_interval, SyncParameters, SyncParametersBuilder},
    domain::{action::ActionRecord, errors::DomainError},
    ports::{action_reporter::IActionReporter, local_filesystem::ILocalFileSystem},
};
use mirrorsync_sync::{LocalFileSystemAdapter, SchedulerExit, SyncScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Printed to stdout when the arguments cannot be parsed
const USAGE: &str = "Usage: mirrorsync <SOURCE> <REPLICA> <LOG_FILE> <INTERVAL_SECS>";

/// Exit code for parameters that parse but fail validation
const EXIT_INVALID_CONFIG: u8 = 2;

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "mirrorsync",
    version,
    about = "Periodically mirror a source directory onto a replica directory"
)]
struct Args {
    /// Directory to mirror from
    source: PathBuf,

    /// Directory kept identical to SOURCE
    replica: PathBuf,

    /// File that every action is appended to
    log_file: PathBuf,

    /// Seconds to wait between cycles (0 runs cycles back to back)
    #[arg(value_parser = parse_interval)]
    interval_secs: u64,
}

impl Args {
    fn into_parameters(self) -> Result<SyncParameters, DomainError> {
        SyncParametersBuilder::new()
            .source(self.source)
            .replica(self.replica)
            .log_file(self.log_file)
            .interval_secs(self.interval_secs)
            .build_validated()
    }
}

/// `--help` and `--version` keep clap's own output
fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

// ============================================================================
// Shutdown signal handler
// ============================================================================

/// Waits for SIGINT or SIGTERM, reports it, and triggers the cancellation token
///
/// A handler that cannot be installed is logged and never fires; the other
/// one stays active.
async fn shutdown_signal(token: CancellationToken, reporter: Arc<dyn IActionReporter>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let message = tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
            "Ctrl + C pressed. Canceling sync."
        }
        _ = terminate => {
            info!("Received SIGTERM");
            "Termination requested. Canceling sync."
        }
    };

    acknowledge_shutdown(&token, reporter.as_ref(), message).await;
}

/// Logs the shutdown request, then cancels
///
/// The acknowledgement is written before the token fires, so it always
/// precedes the scheduler's cancellation record.
async fn acknowledge_shutdown(
    token: &CancellationToken,
    reporter: &dyn IActionReporter,
    message: &str,
) {
    reporter
        .report(ActionRecord::shutdown_requested(message))
        .await;
    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if is_informational(&e) => e.exit(),
        Err(_) => {
            println!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
    };

    // Diagnostics go to stderr; stdout carries the action log echo
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let params = match args.into_parameters() {
        Ok(params) => params,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::from(EXIT_INVALID_CONFIG));
        }
    };

    let reporter: Arc<dyn IActionReporter> = Arc::new(ActionLog::open(params.log_file()).await?);
    info!(
        source = %params.source().display(),
        replica = %params.replica().display(),
        log_file = %params.log_file().display(),
        interval_secs = params.interval_secs(),
        "mirrorsync starting"
    );

    println!("Press [Ctrl + C] to exit");

    let shutdown_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(
        shutdown_token.clone(),
        Arc::clone(&reporter),
    ));

    let filesystem: Arc<dyn ILocalFileSystem> = Arc::new(LocalFileSystemAdapter::new());
    let scheduler = SyncScheduler::new(&params, filesystem, reporter);

    match scheduler.run(shutdown_token).await {
        SchedulerExit::Cancelled => {
            info!("mirrorsync shut down gracefully");
            Ok(ExitCode::SUCCESS)
        }
        SchedulerExit::PreconditionFailed => {
            error!("mirrorsync exiting: source or replica directory is missing");
            Ok(ExitCode::FAILURE)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
