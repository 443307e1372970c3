use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a philosopher thinks or eats, in time units.
///
/// The default is a uniform pick in `1..=8` units per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pacing {
    /// Always the same number of units.
    Fixed(u32),
    /// Uniformly random in `min..=max` units.
    Random { min: u32, max: u32 },
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::Random { min: 1, max: 8 }
    }
}

impl Pacing {
    /// Draws the number of units for one phase.
    pub fn units(&self) -> u32 {
        match *self {
            Pacing::Fixed(units) => units,
            // The thread-local RNG is dropped before the caller awaits.
            Pacing::Random { min, max } => rand::thread_rng().gen_range(min..=max),
        }
    }

    /// Draws one phase and scales it by `unit`.
    pub fn duration(&self, unit: Duration) -> Duration {
        unit * self.units()
    }

    /// Upper bound of [`Pacing::units`].
    pub fn max_units(&self) -> u32 {
        match *self {
            Pacing::Fixed(units) => units,
            Pacing::Random { max, .. } => max,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Pacing::Random { min, max } if min > max => {
                Err(format!("empty pacing range {min}..={max}"))
            }
            _ => Ok(()),
        }
    }
}
