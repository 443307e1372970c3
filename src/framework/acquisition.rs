//! # Fork Acquisition Protocol
//!
//! How a hungry philosopher picks up both forks without a waiter and without
//! circular wait.
//!
//! ## The Algorithm
//!
//! The philosopher keeps a `(primary, secondary)` pair, starting as `(left, right)`,
//! and a budget of [`MAX_PROBES`] non-blocking probes:
//!
//! 1. Block until `primary` is free and take it.
//! 2. While probes remain, *probe* `secondary` (never block on it). Once the
//!    budget is spent, block on `secondary` instead.
//! 3. Probe failed: put `primary` back, swap the pair, spend one probe, go to 1.
//! 4. Both held: done.
//!
//! Circular wait needs every philosopher to sit on one fork while blocking on
//! the next. During the probing rounds nobody blocks while holding a fork, and
//! reversing the order after each failure breaks the shared left-then-right
//! ordering. After two failed probes the philosopher commits to a blocking wait,
//! which bounds the retries.
//!
//! The committed round takes the lower-numbered fork first. For every seat but
//! the last that is simply `(left, right)` again; the last seat (whose right
//! fork is `fork_0`) starts from its right. Every hold-and-wait then points
//! from a lower fork to a higher one, so even philosophers moving in perfect
//! lockstep cannot close a cycle.
//!
//! ## State
//!
//! The loop is driven by an explicit [`AcquireState`] so the transitions can be
//! tested on their own, and the whole routine can be run against a scripted
//! pool ([`ScriptedForkPool`](crate::framework::mock::ScriptedForkPool)).
//!
//! Cancellation is looked at between rounds only, after `primary` has been put
//! back. A philosopher never drops a fork half way through a round.

use crate::framework::error::TableError;
use crate::framework::fork::ResourcePool;
use crate::model::{ForkId, Seat, Side};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Non-blocking probes allowed before the final blocking acquire.
pub const MAX_PROBES: u8 = 2;

/// Forks currently held by the acquiring philosopher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Held {
    None,
    Primary,
    Both,
}

/// Whether the pair is in its original `(left, right)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOrder {
    Normal,
    Reversed,
}

impl PickOrder {
    fn flipped(self) -> Self {
        match self {
            PickOrder::Normal => PickOrder::Reversed,
            PickOrder::Reversed => PickOrder::Normal,
        }
    }
}

/// The small state value that drives one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireState {
    pub held: Held,
    pub order: PickOrder,
    pub tries_left: u8,
    /// Probes performed so far (never exceeds [`MAX_PROBES`]).
    pub probes: u8,
}

impl Default for AcquireState {
    fn default() -> Self {
        Self {
            held: Held::None,
            order: PickOrder::Normal,
            tries_left: MAX_PROBES,
            probes: 0,
        }
    }
}

impl AcquireState {
    /// The fork taken with a blocking acquire this round, and the hand used.
    pub fn primary(&self, left: ForkId, right: ForkId) -> (ForkId, Side) {
        match self.order {
            PickOrder::Normal => (left, Side::Left),
            PickOrder::Reversed => (right, Side::Right),
        }
    }

    /// The fork probed (or, once out of probes, waited on) this round.
    pub fn secondary(&self, left: ForkId, right: ForkId) -> (ForkId, Side) {
        match self.order {
            PickOrder::Normal => (right, Side::Right),
            PickOrder::Reversed => (left, Side::Left),
        }
    }

    /// True once the probe budget is spent and the next take must block.
    pub fn must_block(&self) -> bool {
        self.tries_left == 0
    }

    pub fn took_primary(&mut self) {
        self.held = Held::Primary;
    }

    pub fn probed(&mut self) {
        self.probes += 1;
    }

    pub fn took_both(&mut self) {
        self.held = Held::Both;
    }

    /// A probe failed and `primary` went back on the table: swap the pair
    /// and spend one try.
    pub fn back_off(&mut self) {
        self.held = Held::None;
        self.order = self.order.flipped();
        self.tries_left = self.tries_left.saturating_sub(1);
    }

    /// Orders the committed (blocking) round lowest fork first.
    pub fn commit(&mut self, left: ForkId, right: ForkId) {
        self.order = if left < right {
            PickOrder::Normal
        } else {
            PickOrder::Reversed
        };
    }
}

/// Both forks are held. Release them with [`ResourcePool::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquisition {
    pub first: ForkId,
    pub second: ForkId,
    pub order: PickOrder,
    pub probes: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    Acquired(Acquisition),
    /// Cancellation was seen between rounds. No fork is held.
    Cancelled,
}

/// Runs the protocol for one seat against one pair of forks.
pub struct Acquirer<'a, P: ResourcePool + ?Sized> {
    pool: &'a P,
    seat: Seat,
    left: ForkId,
    right: ForkId,
}

impl<'a, P: ResourcePool + ?Sized> Acquirer<'a, P> {
    pub fn new(pool: &'a P, seat: Seat, left: ForkId, right: ForkId) -> Self {
        Self {
            pool,
            seat,
            left,
            right,
        }
    }

    /// Takes both forks, or gives up between rounds if `cancel` fires.
    pub async fn acquire_both(
        &self,
        cancel: &CancellationToken,
    ) -> Result<AcquireOutcome, TableError> {
        let seat = self.seat;
        let mut state = AcquireState::default();

        loop {
            let (primary, primary_side) = state.primary(self.left, self.right);
            let (secondary, secondary_side) = state.secondary(self.left, self.right);

            self.pool.acquire(primary, seat).await?;
            state.took_primary();
            debug!(%seat, fork = %primary, side = %primary_side, "Took fork");

            let taken = if state.must_block() {
                self.pool.acquire(secondary, seat).await?;
                true
            } else {
                state.probed();
                self.pool.try_acquire(secondary, seat)?
            };

            if taken {
                state.took_both();
                debug!(%seat, fork = %secondary, side = %secondary_side, "Took fork");
                return Ok(AcquireOutcome::Acquired(Acquisition {
                    first: primary,
                    second: secondary,
                    order: state.order,
                    probes: state.probes,
                }));
            }

            debug!(%seat, fork = %secondary, tries_left = state.tries_left, "Switching fork order");
            self.pool.release(primary, seat)?;
            state.back_off();
            if state.must_block() {
                state.commit(self.left, self.right);
            }

            if cancel.is_cancelled() {
                return Ok(AcquireOutcome::Cancelled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{PoolCall, ScriptedForkPool};

    const SEAT: Seat = Seat(0);
    const LEFT: ForkId = ForkId(0);
    const RIGHT: ForkId = ForkId(1);

    #[test]
    fn test_state_transitions() {
        let mut state = AcquireState::default();
        assert_eq!(state.primary(LEFT, RIGHT), (LEFT, Side::Left));
        assert!(!state.must_block());

        state.took_primary();
        state.probed();
        state.back_off();
        assert_eq!(state.held, Held::None);
        assert_eq!(state.order, PickOrder::Reversed);
        assert_eq!(state.primary(LEFT, RIGHT), (RIGHT, Side::Right));
        assert_eq!(state.secondary(LEFT, RIGHT), (LEFT, Side::Left));

        state.probed();
        state.back_off();
        assert_eq!(state.order, PickOrder::Normal);
        assert!(state.must_block());

        // Budget never goes negative
        state.back_off();
        assert_eq!(state.tries_left, 0);

        state.commit(LEFT, RIGHT);
        assert_eq!(state.order, PickOrder::Normal);
        state.commit(ForkId(4), ForkId(0));
        assert_eq!(state.primary(ForkId(4), ForkId(0)), (ForkId(0), Side::Right));
    }

    #[tokio::test]
    async fn test_first_probe_succeeds() {
        let mut mock = ScriptedForkPool::new(5);
        mock.expect_probe(RIGHT).return_available();

        let outcome = Acquirer::new(&mock, SEAT, LEFT, RIGHT)
            .acquire_both(&CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            AcquireOutcome::Acquired(Acquisition {
                first: LEFT,
                second: RIGHT,
                order: PickOrder::Normal,
                probes: 1,
            })
        );
        assert_eq!(
            mock.calls(),
            vec![PoolCall::Acquire(LEFT), PoolCall::TryAcquire(RIGHT, true)]
        );
        mock.verify();
    }

    #[tokio::test]
    async fn test_failed_probe_reverses_order() {
        let mut mock = ScriptedForkPool::new(5);
        mock.expect_probe(RIGHT).return_busy();
        mock.expect_probe(LEFT).return_available();

        let outcome = Acquirer::new(&mock, SEAT, LEFT, RIGHT)
            .acquire_both(&CancellationToken::new())
            .await
            .unwrap();

        let AcquireOutcome::Acquired(acquisition) = outcome else {
            panic!("expected both forks, got {outcome:?}");
        };
        assert_eq!(acquisition.first, RIGHT);
        assert_eq!(acquisition.second, LEFT);
        assert_eq!(acquisition.order, PickOrder::Reversed);
        assert_eq!(acquisition.probes, 2);

        assert_eq!(
            mock.calls(),
            vec![
                PoolCall::Acquire(LEFT),
                PoolCall::TryAcquire(RIGHT, false),
                PoolCall::Release(LEFT),
                PoolCall::Acquire(RIGHT),
                PoolCall::TryAcquire(LEFT, true),
            ]
        );
        mock.verify();
    }

    #[tokio::test]
    async fn test_blocks_after_two_failed_probes() {
        let mut mock = ScriptedForkPool::new(5);
        mock.expect_probe(RIGHT).return_busy();
        mock.expect_probe(LEFT).return_busy();

        let outcome = Acquirer::new(&mock, SEAT, LEFT, RIGHT)
            .acquire_both(&CancellationToken::new())
            .await
            .unwrap();

        let AcquireOutcome::Acquired(acquisition) = outcome else {
            panic!("expected both forks, got {outcome:?}");
        };
        assert_eq!(acquisition.probes, MAX_PROBES);
        assert_eq!(acquisition.order, PickOrder::Normal);

        let calls = mock.calls();
        let probes = calls
            .iter()
            .filter(|call| matches!(call, PoolCall::TryAcquire(..)))
            .count();
        assert_eq!(probes, 2);
        // Third round: both forks taken with blocking acquires
        assert_eq!(
            &calls[calls.len() - 2..],
            &[PoolCall::Acquire(LEFT), PoolCall::Acquire(RIGHT)]
        );
        mock.verify();
    }

    #[tokio::test]
    async fn test_last_seat_commits_lowest_fork_first() {
        // Seat 4 of 5 sits between fork_4 (left) and fork_0 (right)
        let (seat, left, right) = (Seat(4), ForkId(4), ForkId(0));
        let mut mock = ScriptedForkPool::new(5);
        mock.expect_probe(right).return_busy();
        mock.expect_probe(left).return_busy();

        let outcome = Acquirer::new(&mock, seat, left, right)
            .acquire_both(&CancellationToken::new())
            .await
            .unwrap();

        let AcquireOutcome::Acquired(acquisition) = outcome else {
            panic!("expected both forks, got {outcome:?}");
        };
        assert_eq!(acquisition.first, ForkId(0));
        assert_eq!(acquisition.second, ForkId(4));
        assert_eq!(acquisition.order, PickOrder::Reversed);

        let calls = mock.calls();
        assert_eq!(
            &calls[calls.len() - 2..],
            &[PoolCall::Acquire(ForkId(0)), PoolCall::Acquire(ForkId(4))]
        );
        assert_eq!(mock.held_by(seat), vec![ForkId(0), ForkId(4)]);
        mock.verify();
    }

    #[tokio::test]
    async fn test_cancel_between_rounds_holds_nothing() {
        let mut mock = ScriptedForkPool::new(5);
        mock.expect_probe(RIGHT).return_busy();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = Acquirer::new(&mock, SEAT, LEFT, RIGHT)
            .acquire_both(&cancel)
            .await
            .unwrap();

        assert_eq!(outcome, AcquireOutcome::Cancelled);
        // The round in flight completed: primary was taken and put back
        assert_eq!(
            mock.calls(),
            vec![
                PoolCall::Acquire(LEFT),
                PoolCall::TryAcquire(RIGHT, false),
                PoolCall::Release(LEFT),
            ]
        );
        assert!(mock.held_by(SEAT).is_empty());
        mock.verify();
    }
}
