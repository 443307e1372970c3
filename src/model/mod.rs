//! Pure data structures (DTOs) shared by the forks, the philosophers and the monitor.

pub mod pacing;
pub mod seat;
pub mod status;

pub use pacing::*;
pub use seat::*;
pub use status::*;
