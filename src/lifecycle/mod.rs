//! # Table Lifecycle & Orchestration
//!
//! This module manages the runtime lifecycle of a table: seating the philosophers,
//! watching them, and shutting them down on request.
//!
//! **Key Responsibilities:**
//! 1. **Configuration** - Seat names and time unit ([`TableConfig`])
//! 2. **Wiring** - Fork ring and one task per philosopher ([`DiningTable::start`])
//! 3. **Observation** - Periodic read-only status lines ([`Monitor`])
//! 4. **Termination** - OS signals to cancellation ([`spawn_signal_bridge`])
//! 5. **Graceful Shutdown** - Cancel, join, release ([`DiningTable::stop`])
//! 6. **Observability Setup** - [`setup_tracing`]
//!
//! ## Graceful Shutdown
//!
//! 1. **Cancel the token** - every philosopher shares one
//!    [`CancellationToken`](tokio_util::sync::CancellationToken)
//! 2. **Philosophers notice** - while thinking, or between acquisition rounds
//! 3. **In-flight meals finish** - nobody drops a fork mid-meal or mid-round
//! 4. **Await completion** - `stop` joins every task, then closes the forks
//!
//! A philosopher blocked on its final (blocking) acquire is not interrupted; it
//! leaves as soon as its neighbor puts the fork down, so shutdown latency is
//! bounded by one meal.

pub mod config;
pub mod monitor;
pub mod signal;
pub mod table;
pub mod tracing;

pub use config::*;
pub use monitor::*;
pub use signal::*;
pub use table::*;
pub use self::tracing::setup_tracing;
