//! Observable state of one philosopher.

use crate::model::{PhilosopherSnapshot, Seat, Status};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Status and meal counter of one seat.
///
/// Only the philosopher sitting at `seat` writes these fields; the monitor and
/// tests read them. Every field is a plain atomic with relaxed ordering: readers
/// get a recent value and never a torn one, and nothing downstream uses these
/// values for correctness decisions.
#[derive(Debug)]
pub struct PhilosopherState {
    seat: Seat,
    name: String,
    status: AtomicU8,
    served: AtomicU64,
    max_probes: AtomicU8,
}

impl PhilosopherState {
    pub fn new(seat: Seat, name: impl Into<String>) -> Self {
        Self {
            seat,
            name: name.into(),
            status: AtomicU8::new(Status::Thinking as u8),
            served: AtomicU64::new(0),
            max_probes: AtomicU8::new(0),
        }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::Relaxed))
    }

    /// Meals eaten so far. Never decreases.
    pub fn served(&self) -> u64 {
        self.served.load(Ordering::Relaxed)
    }

    pub fn max_probes(&self) -> u8 {
        self.max_probes.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> PhilosopherSnapshot {
        PhilosopherSnapshot {
            seat: self.seat,
            name: self.name.clone(),
            status: self.status(),
            served: self.served(),
            max_probes: self.max_probes(),
        }
    }

    pub(crate) fn set_status(&self, status: Status) {
        self.status.store(status as u8, Ordering::Relaxed);
    }

    /// Counts one meal that needed `probes` non-blocking probes. Returns the new total.
    pub(crate) fn record_meal(&self, probes: u8) -> u64 {
        self.max_probes.fetch_max(probes, Ordering::Relaxed);
        self.served.fetch_add(1, Ordering::Relaxed) + 1
    }
}
