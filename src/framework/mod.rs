//! Fork ring and acquisition protocol.
//!
//! This module provides the building blocks every philosopher uses: the shared
//! forks, the deadlock-avoiding way of picking two of them up, and the output
//! seam for busy/idle indicators.
//!
//! # Main Components
//!
//! - [`ResourcePool`] / [`ForkPool`] - Per-fork probe, blocking acquire and release
//! - [`Acquirer`] - The reorder-and-retry protocol driven by [`AcquireState`]
//! - [`IndicatorSink`] - Best-effort busy/idle output per seat
//! - [`TableError`] - Errors surfaced to the operator
//!
//! # Testing
//!
//! See [`mock`] module for a scripted fork pool and a recording indicator.

pub mod acquisition;
pub mod error;
pub mod fork;
pub mod indicator;
pub mod mock;

// Re-export core types for convenience
pub use acquisition::{
    AcquireOutcome, AcquireState, Acquirer, Acquisition, Held, PickOrder, MAX_PROBES,
};
pub use error::{IndicatorError, TableError};
pub use fork::{ForkPool, ResourcePool};
pub use indicator::{IndicatorSink, NullIndicator, TracingIndicator};
