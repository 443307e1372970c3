//! # Monitor
//!
//! Periodic, read-only view of the table. The monitor copies every
//! philosopher's state without locking and renders one status line:
//!
//! ```text
//! Dining philosophers status=(01010) - (3 5 2 6 4)
//! ```
//!
//! The first group has one busy flag per seat, the second the meals eaten,
//! both in seat order. The format is for humans and may change.

use crate::model::PhilosopherSnapshot;
use crate::philosopher::PhilosopherState;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Reads every seat's state. Cloning is cheap and shares the same records.
#[derive(Debug, Clone)]
pub struct Monitor {
    states: Vec<Arc<PhilosopherState>>,
}

impl Monitor {
    pub fn new(states: Vec<Arc<PhilosopherState>>) -> Self {
        Self { states }
    }

    /// One snapshot per seat, in seat order.
    pub fn snapshot(&self) -> Vec<PhilosopherSnapshot> {
        self.states.iter().map(|state| state.snapshot()).collect()
    }

    /// Renders `(busy flags) - (meal counts)`.
    pub fn status_line(snapshots: &[PhilosopherSnapshot]) -> String {
        let flags: String = snapshots
            .iter()
            .map(|s| if s.status.is_busy() { '1' } else { '0' })
            .collect();
        let counts = snapshots
            .iter()
            .map(|s| s.served.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        format!("({flags}) - ({counts})")
    }

    /// Logs a status line every `period` until `cancel` fires.
    /// Returns the number of lines written.
    pub async fn run(&self, period: Duration, cancel: CancellationToken) -> usize {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reports = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let status = Self::status_line(&self.snapshot());
                    info!(%status, "Dining philosophers");
                    reports += 1;
                }
            }
        }

        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Seat, Status};

    fn table(seats: usize) -> Vec<Arc<PhilosopherState>> {
        (0..seats)
            .map(|i| Arc::new(PhilosopherState::new(Seat(i), format!("A{i}"))))
            .collect()
    }

    #[test]
    fn test_status_line() {
        let states = table(5);
        states[1].set_status(Status::Eating);
        states[1].record_meal(1);
        states[3].set_status(Status::Hungry);
        states[4].record_meal(2);
        states[4].record_meal(1);

        let monitor = Monitor::new(states);
        assert_eq!(
            Monitor::status_line(&monitor.snapshot()),
            "(01000) - (0 1 0 0 2)"
        );
    }

    #[test]
    fn test_snapshot_is_in_seat_order() {
        let monitor = Monitor::new(table(3));
        let seats: Vec<Seat> = monitor.snapshot().iter().map(|s| s.seat).collect();
        assert_eq!(seats, vec![Seat(0), Seat(1), Seat(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_every_period_until_cancelled() {
        let monitor = Monitor::new(table(5));
        let cancel = CancellationToken::new();
        let handle = {
            let monitor = monitor.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { monitor.run(Duration::from_secs(1), cancel).await })
        };

        // Ticks at 0s, 1s, 2s and 3s
        tokio::time::sleep(Duration::from_millis(3500)).await;
        cancel.cancel();

        assert_eq!(handle.await.unwrap(), 4);
    }
}
