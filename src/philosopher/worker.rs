//! # Philosopher Worker
//!
//! The think → hungry → eat loop each seat runs in its own Tokio task.
//!
//! ```text
//!   ┌──────────┐  think sleep   ┌────────┐  both forks   ┌────────┐
//!   │ Thinking │ ─────────────▶ │ Hungry │ ────────────▶ │ Eating │
//!   └──────────┘                └────────┘               └────────┘
//!        ▲                                                   │
//!        └──────────────── release both forks ◀──────────────┘
//! ```
//!
//! Cancellation is observed while Thinking (the think sleep races the token)
//! and between acquisition rounds. It is never observed while a fork is held,
//! and a blocking acquire is never interrupted: shutdown waits for neighbors to
//! finish their meal instead.

use crate::framework::acquisition::{AcquireOutcome, Acquirer, Acquisition};
use crate::framework::error::TableError;
use crate::framework::fork::{ForkPool, ResourcePool};
use crate::framework::indicator::IndicatorSink;
use crate::model::{ForkId, Pacing, Status};
use crate::philosopher::state::PhilosopherState;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Sleep lengths for one philosopher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub unit: Duration,
    pub think: Pacing,
    pub eat: Pacing,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            think: Pacing::default(),
            eat: Pacing::default(),
        }
    }
}

/// One seat at the table: its state record, its two forks and its indicator.
///
/// The forks are fixed at construction (`left = forks[i]`,
/// `right = forks[(i + 1) % N]`) and never change hands except through the pool.
pub struct Philosopher<P: ResourcePool + ?Sized = ForkPool> {
    state: Arc<PhilosopherState>,
    left: ForkId,
    right: ForkId,
    pool: Arc<P>,
    indicator: Arc<dyn IndicatorSink>,
    timing: Timing,
}

impl<P: ResourcePool + ?Sized> Philosopher<P> {
    /// Seats a philosopher in the ring formed by `pool`.
    pub fn new(
        state: Arc<PhilosopherState>,
        pool: Arc<P>,
        indicator: Arc<dyn IndicatorSink>,
        timing: Timing,
    ) -> Self {
        let seat = state.seat();
        let left = seat.left();
        let right = seat.right(pool.len());
        Self {
            state,
            left,
            right,
            pool,
            indicator,
            timing,
        }
    }

    pub fn forks(&self) -> (ForkId, ForkId) {
        (self.left, self.right)
    }

    /// Runs until `cancel` fires, returning the number of meals eaten.
    ///
    /// Only broken fork invariants end the loop with an error; a philosopher
    /// that cannot light its indicator keeps eating.
    #[instrument(name = "philosopher", skip_all, fields(name = %self.state.name()))]
    pub async fn run(self, cancel: CancellationToken) -> Result<u64, TableError> {
        let seat = self.state.seat();
        info!(%seat, left = %self.left, right = %self.right, "Seated");

        while !cancel.is_cancelled() {
            self.state.set_status(Status::Thinking);
            debug!("Thinking");
            let think = self.timing.think.duration(self.timing.unit);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(think) => {}
            }

            self.state.set_status(Status::Hungry);
            debug!("Hungry");
            let acquirer = Acquirer::new(&*self.pool, seat, self.left, self.right);
            match acquirer.acquire_both(&cancel).await? {
                AcquireOutcome::Acquired(acquisition) => self.eat(acquisition).await?,
                AcquireOutcome::Cancelled => break,
            }
        }

        self.state.set_status(Status::Thinking);
        let served = self.state.served();
        info!(%seat, served, "Left the table");
        Ok(served)
    }

    async fn eat(&self, acquisition: Acquisition) -> Result<(), TableError> {
        let seat = self.state.seat();
        self.state.set_status(Status::Eating);
        let served = self.state.record_meal(acquisition.probes);
        self.signal(true);
        debug!(served, probes = acquisition.probes, "Eating");

        tokio::time::sleep(self.timing.eat.duration(self.timing.unit)).await;

        // Lit only while both forks are held.
        self.state.set_status(Status::Thinking);
        self.signal(false);
        // Both releases run even if one fails, or a neighbor waits forever.
        let second = self.pool.release(acquisition.second, seat);
        let first = self.pool.release(acquisition.first, seat);
        second.and(first)
    }

    fn signal(&self, busy: bool) {
        let seat = self.state.seat();
        if let Err(e) = self.indicator.set_indicator(seat, busy) {
            warn!(%seat, busy, error = %e, "Indicator update failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::indicator::NullIndicator;
    use crate::framework::mock::RecordingIndicator;
    use crate::model::Seat;

    fn quick() -> Timing {
        Timing {
            unit: Duration::from_millis(1),
            think: Pacing::Fixed(1),
            eat: Pacing::Fixed(1),
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_start_eats_nothing() {
        let pool = Arc::new(ForkPool::new(2));
        let state = Arc::new(PhilosopherState::new(Seat(0), "Socrates"));
        let philosopher = Philosopher::new(state.clone(), pool, Arc::new(NullIndicator), quick());

        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(philosopher.run(cancel).await.unwrap(), 0);
        assert_eq!(state.status(), Status::Thinking);
    }

    #[tokio::test]
    async fn test_lone_philosopher_keeps_eating() {
        let pool = Arc::new(ForkPool::new(5));
        let state = Arc::new(PhilosopherState::new(Seat(4), "Diogenes"));
        let leds = RecordingIndicator::new(5);
        let philosopher =
            Philosopher::new(state.clone(), pool.clone(), Arc::new(leds.clone()), quick());
        assert_eq!(philosopher.forks(), (ForkId(4), ForkId(0)));

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(philosopher.run(cancel.clone()));

        while state.served() < 3 {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        cancel.cancel();
        let served = handle.await.unwrap().unwrap();

        assert!(served >= 3);
        // Uncontended: the first probe always succeeds
        assert_eq!(state.max_probes(), 1);
        assert!(leds.busy_count(Seat(4)) >= 3);
        assert_eq!(pool.holder(ForkId(4)), None);
        assert_eq!(pool.holder(ForkId(0)), None);
    }

    #[tokio::test]
    async fn test_indicator_failure_does_not_stop_eating() {
        let pool = Arc::new(ForkPool::new(3));
        let state = Arc::new(PhilosopherState::new(Seat(1), "Plato"));
        let leds = RecordingIndicator::new(3);
        leds.fail_for(Seat(1));
        let philosopher = Philosopher::new(state.clone(), pool, Arc::new(leds.clone()), quick());

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(philosopher.run(cancel.clone()));
        while state.served() < 2 {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        cancel.cancel();

        assert!(handle.await.unwrap().unwrap() >= 2);
        assert!(leds.events().is_empty());
    }

    #[tokio::test]
    async fn test_failed_release_still_frees_other_fork() {
        let pool = Arc::new(ForkPool::new(2));
        let state = Arc::new(PhilosopherState::new(Seat(0), "Socrates"));
        let timing = Timing {
            unit: Duration::from_millis(1),
            think: Pacing::Fixed(1),
            eat: Pacing::Fixed(50),
        };
        let philosopher =
            Philosopher::new(state.clone(), pool.clone(), Arc::new(NullIndicator), timing);
        let handle = tokio::spawn(philosopher.run(CancellationToken::new()));

        // Take fork_1 away from under the philosopher while it eats
        loop {
            if state.status() == Status::Eating && pool.release(ForkId(1), Seat(0)).is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let result = handle.await.unwrap();
        assert!(matches!(
            result,
            Err(TableError::NotHeld { fork: ForkId(1), seat: Seat(0) })
        ));
        assert_eq!(pool.holder(ForkId(0)), None);
    }
}
