//! # Mock Framework
//!
//! Test doubles for the two seams of the table.
//!
//! - [`ScriptedForkPool`]: a [`ResourcePool`] whose probe results are scripted up
//!   front, so the acquisition protocol can be exercised deterministically
//!   without real contention.
//! - [`RecordingIndicator`]: an [`IndicatorSink`] that records every change,
//!   flags neighbors that are lit at the same time, and can be told to fail.

use crate::framework::error::{IndicatorError, TableError};
use crate::framework::fork::ResourcePool;
use crate::framework::indicator::IndicatorSink;
use crate::model::{ForkId, Seat};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// SCRIPTED FORK POOL
// =============================================================================

/// One call made against a [`ScriptedForkPool`], in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolCall {
    Acquire(ForkId),
    TryAcquire(ForkId, bool),
    Release(ForkId),
}

struct ProbeExpectation {
    fork: ForkId,
    available: bool,
}

#[derive(Default)]
struct ScriptState {
    probes: VecDeque<ProbeExpectation>,
    calls: Vec<PoolCall>,
    held: HashMap<ForkId, Seat>,
}

/// A fork pool whose non-blocking probes answer from a script.
///
/// Blocking acquires always succeed immediately. Releases are checked against
/// the forks the mock handed out, so a protocol that frees a fork it does not
/// hold gets [`TableError::NotHeld`] exactly like the real pool.
///
/// # Example
/// ```ignore
/// let mut mock = ScriptedForkPool::new(5);
/// mock.expect_probe(ForkId(1)).return_busy();
/// mock.expect_probe(ForkId(0)).return_available();
///
/// Acquirer::new(&mock, Seat(0), ForkId(0), ForkId(1)).acquire_both(&cancel).await?;
/// mock.verify(); // Every scripted probe was used
/// ```
pub struct ScriptedForkPool {
    forks: usize,
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedForkPool {
    pub fn new(forks: usize) -> Self {
        Self {
            forks,
            state: Arc::new(Mutex::new(ScriptState::default())),
        }
    }

    /// Scripts the next probe, which must target `fork`.
    pub fn expect_probe(&mut self, fork: ForkId) -> ProbeExpectationBuilder {
        ProbeExpectationBuilder {
            fork,
            state: self.state.clone(),
        }
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<PoolCall> {
        lock(&self.state).calls.clone()
    }

    /// Forks the mock believes `seat` is holding.
    pub fn held_by(&self, seat: Seat) -> Vec<ForkId> {
        let mut forks: Vec<ForkId> = lock(&self.state)
            .held
            .iter()
            .filter(|(_, holder)| **holder == seat)
            .map(|(fork, _)| *fork)
            .collect();
        forks.sort();
        forks
    }

    /// Verifies that every scripted probe was consumed.
    pub fn verify(&self) {
        let state = lock(&self.state);
        if !state.probes.is_empty() {
            panic!(
                "Not all probe expectations were met. {} remaining",
                state.probes.len()
            );
        }
    }

    fn check(&self, fork: ForkId) -> Result<(), TableError> {
        if fork.0 >= self.forks {
            return Err(TableError::UnknownFork(fork));
        }
        Ok(())
    }
}

/// Builder for probe expectations.
pub struct ProbeExpectationBuilder {
    fork: ForkId,
    state: Arc<Mutex<ScriptState>>,
}

impl ProbeExpectationBuilder {
    /// The probe finds the fork free and takes it.
    pub fn return_available(self) {
        self.push(true);
    }

    /// The probe finds the fork held by a neighbor.
    pub fn return_busy(self) {
        self.push(false);
    }

    fn push(self, available: bool) {
        lock(&self.state).probes.push_back(ProbeExpectation {
            fork: self.fork,
            available,
        });
    }
}

#[async_trait]
impl ResourcePool for ScriptedForkPool {
    fn len(&self) -> usize {
        self.forks
    }

    fn try_acquire(&self, fork: ForkId, seat: Seat) -> Result<bool, TableError> {
        self.check(fork)?;
        let mut state = lock(&self.state);
        let expectation = match state.probes.pop_front() {
            Some(expectation) if expectation.fork == fork => expectation,
            Some(expectation) => panic!(
                "Unexpected probe of {fork}, script expected {}",
                expectation.fork
            ),
            None => panic!("Unexpected probe of {fork}, script is empty"),
        };
        state.calls.push(PoolCall::TryAcquire(fork, expectation.available));
        if expectation.available {
            state.held.insert(fork, seat);
        }
        Ok(expectation.available)
    }

    async fn acquire(&self, fork: ForkId, seat: Seat) -> Result<(), TableError> {
        self.check(fork)?;
        let mut state = lock(&self.state);
        state.calls.push(PoolCall::Acquire(fork));
        state.held.insert(fork, seat);
        Ok(())
    }

    fn release(&self, fork: ForkId, seat: Seat) -> Result<(), TableError> {
        self.check(fork)?;
        let mut state = lock(&self.state);
        state.calls.push(PoolCall::Release(fork));
        match state.held.get(&fork) {
            Some(holder) if *holder == seat => {
                state.held.remove(&fork);
                Ok(())
            }
            _ => Err(TableError::NotHeld { fork, seat }),
        }
    }
}

// =============================================================================
// RECORDING INDICATOR
// =============================================================================

struct Lights {
    lit: Vec<bool>,
    events: Vec<(Seat, bool)>,
    overlaps: usize,
    failing: HashSet<Seat>,
}

/// Records indicator changes for `seats` seats arranged in a ring.
///
/// Lighting a seat while either neighbor is lit counts as an overlap: two
/// philosophers sharing a fork were eating at the same time.
#[derive(Clone)]
pub struct RecordingIndicator {
    seats: usize,
    lights: Arc<Mutex<Lights>>,
}

impl RecordingIndicator {
    pub fn new(seats: usize) -> Self {
        Self {
            seats,
            lights: Arc::new(Mutex::new(Lights {
                lit: vec![false; seats],
                events: Vec::new(),
                overlaps: 0,
                failing: HashSet::new(),
            })),
        }
    }

    /// Makes every future update for `seat` fail.
    pub fn fail_for(&self, seat: Seat) {
        lock(&self.lights).failing.insert(seat);
    }

    pub fn events(&self) -> Vec<(Seat, bool)> {
        lock(&self.lights).events.clone()
    }

    /// Number of successful "busy" updates recorded for `seat`.
    pub fn busy_count(&self, seat: Seat) -> usize {
        lock(&self.lights)
            .events
            .iter()
            .filter(|(s, busy)| *s == seat && *busy)
            .count()
    }

    pub fn overlaps(&self) -> usize {
        lock(&self.lights).overlaps
    }

    pub fn is_lit(&self, seat: Seat) -> bool {
        lock(&self.lights).lit.get(seat.0).copied().unwrap_or(false)
    }
}

impl IndicatorSink for RecordingIndicator {
    fn set_indicator(&self, seat: Seat, busy: bool) -> Result<(), IndicatorError> {
        let mut lights = lock(&self.lights);
        if lights.failing.contains(&seat) || seat.0 >= self.seats {
            return Err(IndicatorError::Unavailable(format!("seat {seat}")));
        }
        if busy {
            let (before, after) = seat.neighbors(self.seats);
            if lights.lit[before.0] || lights.lit[after.0] {
                lights.overlaps += 1;
            }
        }
        lights.lit[seat.0] = busy;
        lights.events.push((seat, busy));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_pool_tracks_holders() {
        let mut mock = ScriptedForkPool::new(3);
        mock.expect_probe(ForkId(2)).return_available();

        mock.acquire(ForkId(1), Seat(1)).await.unwrap();
        assert!(mock.try_acquire(ForkId(2), Seat(1)).unwrap());
        assert_eq!(mock.held_by(Seat(1)), vec![ForkId(1), ForkId(2)]);

        assert!(matches!(
            mock.release(ForkId(1), Seat(0)),
            Err(TableError::NotHeld { .. })
        ));
        mock.release(ForkId(1), Seat(1)).unwrap();
        assert_eq!(mock.held_by(Seat(1)), vec![ForkId(2)]);
        mock.verify();
    }

    #[test]
    #[should_panic(expected = "Not all probe expectations were met")]
    fn test_verify_reports_unused_script() {
        let mut mock = ScriptedForkPool::new(3);
        mock.expect_probe(ForkId(0)).return_busy();
        mock.verify();
    }

    #[test]
    fn test_recording_indicator_flags_neighbors() {
        let leds = RecordingIndicator::new(5);
        leds.set_indicator(Seat(0), true).unwrap();
        leds.set_indicator(Seat(2), true).unwrap();
        assert_eq!(leds.overlaps(), 0);

        // Seat 1 shares a fork with both 0 and 2
        leds.set_indicator(Seat(1), true).unwrap();
        assert_eq!(leds.overlaps(), 1);

        leds.fail_for(Seat(3));
        assert!(leds.set_indicator(Seat(3), true).is_err());
        assert!(!leds.is_lit(Seat(3)));
        assert_eq!(leds.busy_count(Seat(0)), 1);
    }
}
