//! Graceful shutdown

use std::{io, time::Duration};

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum ShutdownSignalError {
    #[error("failed to install Ctrl+C handler: {0}")]
    CtrlC(#[source] io::Error),

    #[cfg(unix)]
    #[error("failed to install SIGTERM handler: {0}")]
    SigTerm(#[source] io::Error),
}

/// Wait for Ctrl+C (or SIGTERM on unix), then stop accepting connections and drain
/// in-flight requests for at most `grace`.
pub(crate) async fn listen(
    handle: ServerHandle,
    grace: Option<Duration>,
) -> Result<(), ShutdownSignalError> {
    let signal = wait_for_signal().await?;

    match grace {
        Some(grace) => info!(signal, grace_seconds = grace.as_secs(), "shutting down"),
        None => info!(signal, "shutting down, waiting for in-flight requests"),
    }

    handle.stop_graceful(grace);

    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<&'static str, ShutdownSignalError> {
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(ShutdownSignalError::SigTerm)?;

    tokio::select! {
        result = signal::ctrl_c() => {
            result.map_err(ShutdownSignalError::CtrlC)?;

            Ok("ctrl_c")
        }
        _ = terminate.recv() => Ok("sigterm"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<&'static str, ShutdownSignalError> {
    signal::ctrl_c().await.map_err(ShutdownSignalError::CtrlC)?;

    Ok("ctrl_c")
}
