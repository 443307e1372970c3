use crate::framework::error::TableError;
use crate::framework::fork::ForkPool;
use crate::framework::indicator::IndicatorSink;
use crate::lifecycle::config::TableConfig;
use crate::lifecycle::monitor::Monitor;
use crate::model::{PhilosopherSnapshot, Seat};
use crate::philosopher::{Philosopher, PhilosopherState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Final state of the table after [`DiningTable::stop`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableReport {
    pub philosophers: Vec<PhilosopherSnapshot>,
    pub total_served: u64,
}

/// The lifecycle controller for one table of philosophers.
///
/// `DiningTable` is responsible for:
/// - **Wiring**: N forks in a ring, philosopher `i` between forks `i` and `(i + 1) % N`
/// - **Startup**: One Tokio task per philosopher, confirmed running before `start` returns
/// - **Shutdown**: Cancelling every philosopher and joining its task
///
/// # Example
///
/// ```ignore
/// let table = DiningTable::start(TableConfig::default(), Arc::new(NullIndicator)).await?;
///
/// // Watch the table until someone asks us to stop
/// table.monitor().run(period, table.cancel_token()).await;
///
/// let report = table.stop().await?;
/// ```
pub struct DiningTable {
    pool: Arc<ForkPool>,
    states: Vec<Arc<PhilosopherState>>,
    indicator: Arc<dyn IndicatorSink>,
    cancel: CancellationToken,
    /// Task handles for all philosophers (joined by `stop`)
    handles: Vec<(Seat, JoinHandle<Result<u64, TableError>>)>,
}

impl DiningTable {
    /// Seats every philosopher and starts their tasks.
    ///
    /// This method:
    /// 1. Validates the configuration
    /// 2. Creates the fork ring and turns every indicator off
    /// 3. Spawns one task per philosopher, each sharing the table's cancellation token
    /// 4. Waits until every task has reported in
    ///
    /// Any failure here is fatal for the table. Nothing is rolled back: the
    /// philosophers that did start are simply cancelled.
    pub async fn start(
        config: TableConfig,
        indicator: Arc<dyn IndicatorSink>,
    ) -> Result<Self, TableError> {
        Self::start_with_cancel(config, indicator, CancellationToken::new()).await
    }

    /// Like [`DiningTable::start`], but the table obeys a token the caller
    /// already holds, so shutdown listeners can exist before any philosopher.
    /// A token cancelled during startup still seats everyone; they leave at once.
    pub async fn start_with_cancel(
        config: TableConfig,
        indicator: Arc<dyn IndicatorSink>,
        cancel: CancellationToken,
    ) -> Result<Self, TableError> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()?;
        let seats = config.seats();
        info!(seats, "Dining philosophers starting");

        let pool = Arc::new(ForkPool::new(seats));
        let timing = config.timing();
        let (ready_tx, mut ready_rx) = mpsc::channel(seats);

        let mut states = Vec::with_capacity(seats);
        let mut handles = Vec::with_capacity(seats);
        for (index, name) in config.names.iter().enumerate() {
            let seat = Seat(index);
            if let Err(e) = indicator.set_indicator(seat, false) {
                warn!(%seat, error = %e, "Indicator update failed");
            }

            let state = Arc::new(PhilosopherState::new(seat, name.clone()));
            let philosopher =
                Philosopher::new(state.clone(), pool.clone(), indicator.clone(), timing);
            let ready = ready_tx.clone();
            let cancel = cancel.clone();
            let handle = runtime.spawn(async move {
                let _ = ready.send(seat).await;
                drop(ready);
                let result = philosopher.run(cancel.clone()).await;
                if let Err(e) = &result {
                    // A broken fork invariant ends the whole table, not one seat.
                    error!(%seat, error = %e, "Philosopher failed, stopping the table");
                    cancel.cancel();
                }
                result
            });

            states.push(state);
            handles.push((seat, handle));
        }
        drop(ready_tx);

        let mut waiting: BTreeSet<Seat> = (0..seats).map(Seat).collect();
        while let Some(seat) = ready_rx.recv().await {
            waiting.remove(&seat);
            if waiting.is_empty() {
                break;
            }
        }
        if let Some(&seat) = waiting.first() {
            cancel.cancel();
            error!(%seat, "Philosopher never reported in");
            return Err(TableError::StartupFailed {
                seat,
                reason: "task ended before confirming start".into(),
            });
        }

        info!(seats, "All philosophers seated");
        Ok(Self {
            pool,
            states,
            indicator,
            cancel,
            handles,
        })
    }

    pub fn seats(&self) -> usize {
        self.states.len()
    }

    /// The token every philosopher polls. Cancelling it is equivalent to
    /// starting [`DiningTable::stop`] without joining.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// A read-only view of every seat.
    pub fn monitor(&self) -> Monitor {
        Monitor::new(self.states.clone())
    }

    pub fn snapshot(&self) -> Vec<PhilosopherSnapshot> {
        self.monitor().snapshot()
    }

    pub fn forks(&self) -> &ForkPool {
        &self.pool
    }

    /// Gracefully shuts down the table.
    ///
    /// This method:
    /// 1. Cancels the shared token
    /// 2. Waits for every philosopher task (no timeout; a philosopher blocked on
    ///    a fork leaves once its neighbor finishes eating)
    /// 3. Closes the forks and turns every indicator off
    ///
    /// # Returns
    ///
    /// - `Ok(TableReport)` if every philosopher left cleanly
    /// - `Err(TableError)` with the first failure if a philosopher broke a fork
    ///   invariant or panicked
    pub async fn stop(self) -> Result<TableReport, TableError> {
        info!("Stopping the table");
        self.cancel.cancel();

        let mut failure = None;
        for (seat, handle) in self.handles {
            match handle.await {
                Ok(Ok(served)) => debug!(%seat, served, "Philosopher joined"),
                Ok(Err(e)) => {
                    error!(%seat, error = %e, "Philosopher failed");
                    failure.get_or_insert(e);
                }
                Err(e) => {
                    error!(%seat, error = %e, "Philosopher task failed");
                    failure.get_or_insert(TableError::WorkerPanicked {
                        seat,
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.pool.close();
        for state in &self.states {
            if let Err(e) = self.indicator.set_indicator(state.seat(), false) {
                warn!(seat = %state.seat(), error = %e, "Indicator update failed");
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        let philosophers: Vec<PhilosopherSnapshot> =
            self.states.iter().map(|state| state.snapshot()).collect();
        let total_served = philosophers.iter().map(|p| p.served).sum();
        info!(total_served, "Table stopped");
        Ok(TableReport {
            philosophers,
            total_served,
        })
    }
}
