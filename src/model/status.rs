use super::Seat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a philosopher is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Status {
    Thinking = 0,
    Hungry = 1,
    Eating = 2,
}

impl Status {
    /// Decodes the value stored in a philosopher's status cell.
    /// Unknown values read as `Thinking`.
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Status::Hungry,
            2 => Status::Eating,
            _ => Status::Thinking,
        }
    }

    /// Busy means "currently holding both forks and eating".
    pub fn is_busy(self) -> bool {
        matches!(self, Status::Eating)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Thinking => f.write_str("thinking"),
            Status::Hungry => f.write_str("hungry"),
            Status::Eating => f.write_str("eating"),
        }
    }
}

/// Point-in-time copy of one philosopher's observable state.
///
/// Produced by [`PhilosopherState::snapshot`](crate::philosopher::PhilosopherState::snapshot)
/// and consumed by the [`Monitor`](crate::lifecycle::Monitor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhilosopherSnapshot {
    pub seat: Seat,
    pub name: String,
    pub status: Status,
    /// Number of meals eaten so far.
    pub served: u64,
    /// Largest number of non-blocking probes any single acquisition needed.
    pub max_probes: u8,
}
