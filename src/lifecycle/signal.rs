//! # Termination Signals
//!
//! Bridges OS termination requests (SIGTERM, Ctrl-C) to the table's
//! [`CancellationToken`].
//!
//! The handler Tokio installs for us does nothing in signal context except
//! record that the signal arrived; it never logs or allocates. Everything else
//! (logging, cancelling the token) happens afterwards on a normal task.

use crate::framework::error::TableError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Installs the termination handlers and spawns the task that cancels `cancel`
/// on the first signal.
///
/// Handler installation happens before this returns, so a failure to install
/// is reported as a startup error rather than a silently ignored signal.
pub fn spawn_signal_bridge(cancel: CancellationToken) -> Result<JoinHandle<()>, TableError> {
    let shutdown = shutdown_signal()?;
    Ok(tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            received = shutdown => {
                match received {
                    Ok(signal) => info!(signal, "Termination requested"),
                    Err(e) => error!(error = %e, "Termination handler failed"),
                }
                cancel.cancel();
            }
        }
    }))
}

#[cfg(unix)]
fn shutdown_signal(
) -> Result<impl std::future::Future<Output = std::io::Result<&'static str>>, TableError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    Ok(async move {
        tokio::select! {
            _ = terminate.recv() => Ok("SIGTERM"),
            _ = interrupt.recv() => Ok("SIGINT"),
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal(
) -> Result<impl std::future::Future<Output = std::io::Result<&'static str>>, TableError> {
    Ok(async move {
        tokio::signal::ctrl_c().await?;
        Ok("ctrl-c")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bridge_exits_when_table_stops_first() {
        let cancel = CancellationToken::new();
        let bridge = spawn_signal_bridge(cancel.clone()).unwrap();

        cancel.cancel();
        bridge.await.unwrap();
    }
}
