//! # Dining Philosophers
//!
//! Runs a table until the process receives SIGTERM or Ctrl-C.
//!
//! 1. Reads [`TableConfig`] from the environment.
//! 2. Starts the [`DiningTable`] with one LED per seat.
//! 3. Logs a status line every time unit.
//! 4. Stops the table on the first termination signal.
//!
//! Exits non-zero if the table cannot start or a philosopher breaks a fork invariant.

use dining_philosophers::framework::{TableError, TracingIndicator};
use dining_philosophers::lifecycle::{
    setup_tracing, spawn_signal_bridge, DiningTable, Monitor, TableConfig,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), TableError> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Dining philosophers starting.");

    let config = TableConfig::from_env()?;
    let period = config.report_period();
    let leds = Arc::new(TracingIndicator::new(config.seats()));

    // Listen for termination before any philosopher exists
    let cancel = CancellationToken::new();
    let bridge = spawn_signal_bridge(cancel.clone())?;

    let table = match DiningTable::start_with_cancel(config, leds, cancel.clone()).await {
        Ok(table) => table,
        Err(e) => {
            cancel.cancel();
            let _ = bridge.await;
            return Err(e);
        }
    };

    let span = tracing::info_span!("monitor");
    let reports = table.monitor().run(period, cancel).instrument(span).await;
    info!(reports, "Monitor stopped");

    let report = table.stop().await?;
    let _ = bridge.await;

    info!(
        status = %Monitor::status_line(&report.philosophers),
        total_served = report.total_served,
        "Dining philosophers exiting."
    );
    Ok(())
}
