use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a philosopher around the table (index `0..N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Seat(pub usize);

/// Identity of a fork in the ring (index `0..N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ForkId(pub usize);

impl Seat {
    /// The fork on this seat's left: `forks[i]`.
    pub fn left(self) -> ForkId {
        ForkId(self.0)
    }

    /// The fork on this seat's right: `forks[(i + 1) % seats]`.
    pub fn right(self, seats: usize) -> ForkId {
        ForkId((self.0 + 1) % seats)
    }

    /// The two seats that share a fork with this one.
    pub fn neighbors(self, seats: usize) -> (Seat, Seat) {
        (Seat((self.0 + seats - 1) % seats), Seat((self.0 + 1) % seats))
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ForkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fork_{}", self.0)
    }
}

/// Which hand a fork is picked up with, used for narration only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_wiring() {
        assert_eq!(Seat(0).left(), ForkId(0));
        assert_eq!(Seat(0).right(5), ForkId(1));
        assert_eq!(Seat(4).left(), ForkId(4));
        assert_eq!(Seat(4).right(5), ForkId(0));
    }

    #[test]
    fn test_neighbors_wrap_around() {
        assert_eq!(Seat(0).neighbors(5), (Seat(4), Seat(1)));
        assert_eq!(Seat(4).neighbors(5), (Seat(3), Seat(0)));
    }
}
