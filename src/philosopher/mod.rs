//! Philosopher state and worker loop.

pub mod state;
pub mod worker;

pub use state::*;
pub use worker::*;
