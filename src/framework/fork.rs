//! # Fork Pool
//!
//! The ring of forks. Each fork is a single-permit [`Semaphore`]; a philosopher
//! holds a fork by taking its permit and `forget`ting it, and gives it back
//! with [`ResourcePool::release`]. The pool also remembers which seat holds each
//! fork so that a release by anyone else is reported instead of silently
//! freeing somebody else's fork.

use crate::framework::error::TableError;
use crate::model::{ForkId, Seat};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::{Semaphore, TryAcquireError};
use tracing::{error, warn};

/// Per-fork acquisition primitives. No queueing or fairness beyond what the
/// implementation's primitive provides.
///
/// The acquisition protocol in [`crate::framework::acquisition`] is written
/// against this trait so it can be driven by a scripted pool in tests
/// (see [`crate::framework::mock::ScriptedForkPool`]).
#[async_trait]
pub trait ResourcePool: Send + Sync {
    /// Number of forks in the ring.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-blocking probe. `Ok(true)` means the fork is now held by `seat`.
    fn try_acquire(&self, fork: ForkId, seat: Seat) -> Result<bool, TableError>;

    /// Waits until the fork is free, then holds it for `seat`.
    async fn acquire(&self, fork: ForkId, seat: Seat) -> Result<(), TableError>;

    /// Frees a fork. `seat` must be the current holder.
    fn release(&self, fork: ForkId, seat: Seat) -> Result<(), TableError>;
}

const FREE: usize = usize::MAX;

struct Fork {
    permit: Semaphore,
    holder: AtomicUsize,
}

/// The real fork ring used by [`DiningTable`](crate::lifecycle::DiningTable).
pub struct ForkPool {
    forks: Vec<Fork>,
    violations: AtomicU64,
}

impl ForkPool {
    /// Creates `count` free forks.
    pub fn new(count: usize) -> Self {
        let forks = (0..count)
            .map(|_| Fork {
                permit: Semaphore::new(1),
                holder: AtomicUsize::new(FREE),
            })
            .collect();
        Self {
            forks,
            violations: AtomicU64::new(0),
        }
    }

    /// The seat currently holding `fork`, if any.
    pub fn holder(&self, fork: ForkId) -> Option<Seat> {
        let holder = self.forks.get(fork.0)?.holder.load(Ordering::Acquire);
        (holder != FREE).then_some(Seat(holder))
    }

    /// How many times a fork was handed to a seat while another seat still held it.
    /// Always zero unless the semaphore guarantee is broken.
    pub fn violations(&self) -> u64 {
        self.violations.load(Ordering::Relaxed)
    }

    /// Closes every fork; pending and future acquisitions fail with
    /// [`TableError::PoolClosed`]. Called once all philosophers have left.
    pub fn close(&self) {
        for (index, fork) in self.forks.iter().enumerate() {
            if let Some(seat) = self.holder(ForkId(index)) {
                warn!(fork = %ForkId(index), %seat, "Fork still held at close");
            }
            fork.permit.close();
        }
    }

    fn fork(&self, id: ForkId) -> Result<&Fork, TableError> {
        self.forks.get(id.0).ok_or(TableError::UnknownFork(id))
    }

    fn mark_held(&self, fork: &Fork, id: ForkId, seat: Seat) {
        let previous = fork.holder.swap(seat.0, Ordering::AcqRel);
        if previous != FREE {
            self.violations.fetch_add(1, Ordering::Relaxed);
            error!(fork = %id, %seat, previous, "Fork handed out while held");
        }
    }
}

#[async_trait]
impl ResourcePool for ForkPool {
    fn len(&self) -> usize {
        self.forks.len()
    }

    fn try_acquire(&self, id: ForkId, seat: Seat) -> Result<bool, TableError> {
        let fork = self.fork(id)?;
        match fork.permit.try_acquire() {
            Ok(permit) => {
                permit.forget();
                self.mark_held(fork, id, seat);
                Ok(true)
            }
            Err(TryAcquireError::NoPermits) => Ok(false),
            Err(TryAcquireError::Closed) => Err(TableError::PoolClosed(id)),
        }
    }

    async fn acquire(&self, id: ForkId, seat: Seat) -> Result<(), TableError> {
        let fork = self.fork(id)?;
        fork.permit
            .acquire()
            .await
            .map_err(|_| TableError::PoolClosed(id))?
            .forget();
        self.mark_held(fork, id, seat);
        Ok(())
    }

    fn release(&self, id: ForkId, seat: Seat) -> Result<(), TableError> {
        let fork = self.fork(id)?;
        // Clear the holder before handing the permit back so the next taker sees FREE.
        fork.holder
            .compare_exchange(seat.0, FREE, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TableError::NotHeld { fork: id, seat })?;
        fork.permit.add_permits(1);
        Ok(())
    }
}
