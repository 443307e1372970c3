//! # Observability & Tracing
//!
//! This module provides the tracing infrastructure for the whole table.
//!
//! ## Overview
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//! Every philosopher runs inside a `philosopher{name=...}` span, so each line says whose
//! fork it is talking about without repeating the name in every event.
//!
//! ## What Gets Traced
//!
//! - **Table Lifecycle** (`info`): starting, all seated, stopping, stopped, final report
//! - **Status Line** (`info`): the monitor's `(01010) - (3 5 2 6 4)` line every period
//! - **Philosopher Phases** (`debug`): Thinking, Hungry, Took fork, Switching fork order, Eating
//! - **Indicators** (`debug`): every LED change from
//!   [`TracingIndicator`](crate::framework::TracingIndicator)
//! - **Problems** (`warn`/`error`): indicator failures, broken fork invariants, failed tasks
//!
//! ## Usage Examples
//!
//! ```bash
//! # Status lines only
//! RUST_LOG=info cargo run
//!
//! # Every fork pick-up and order switch
//! RUST_LOG=debug cargo run
//!
//! # Only the acquisition protocol
//! RUST_LOG=dining_philosophers::framework=debug cargo run
//! ```
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=debug`**:
//!
//! ```text
//! DEBUG philosopher: Hungry name=Plato
//! DEBUG philosopher: Took fork name=Plato seat=1 fork=fork_1 side=left
//! DEBUG philosopher: Switching fork order name=Plato seat=1 fork=fork_2 tries_left=2
//! DEBUG philosopher: Took fork name=Plato seat=1 fork=fork_2 side=right
//! DEBUG philosopher: Took fork name=Plato seat=1 fork=fork_1 side=left
//! DEBUG philosopher: Eating name=Plato served=4 probes=2
//! ```
//!
//! Without `RUST_LOG` the table logs at `info`, so the status line is visible by default.

use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(directives.as_deref()))
        .with_target(false) // Spans already say which philosopher is talking
        .compact() // Compact format shows spans inline (e.g., "philosopher: Eating")
        .init();
}

/// `RUST_LOG` directives if set and non-empty, `info` otherwise.
fn env_filter(directives: Option<&str>) -> EnvFilter {
    match directives {
        Some(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::new("info"),
    }
}
