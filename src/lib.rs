#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Dining Philosophers
//!
//! > **Five philosophers, five forks, no waiter, no deadlock.**
//!
//! This crate runs the classic dining philosophers problem on Tokio. A ring of N forks
//! is shared by N philosophers; each needs both of its neighboring forks to eat, and
//! nobody coordinates them. The system must never reach the state where every
//! philosopher holds one fork and waits forever for the other.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Why Reorder-and-Retry?
//!
//! The textbook deadlock happens when everyone picks up the left fork and then blocks
//! on the right one. Instead of a central arbiter or a global fork ordering, each
//! philosopher:
//! - **Blocks only on the first fork** of a round, and *probes* the second one.
//! - **Puts the first fork back** if the probe fails, and swaps which fork comes first.
//! - **Commits after two probes**, blocking on the second fork to bound the retries.
//!
//! See [`framework::acquisition`] for the full protocol.
//!
//! ## 🚀 Core Concepts
//!
//! ### The Fork Pool
//! Forks are single-permit semaphores behind the [`ResourcePool`](framework::ResourcePool)
//! trait. The protocol only sees the trait, so tests can script every probe result with
//! [`ScriptedForkPool`](framework::mock::ScriptedForkPool).
//!
//! ### Observation Without Interference
//! Each philosopher publishes its status and meal count in a
//! [`PhilosopherState`](philosopher::PhilosopherState) made of atomics. Only the owner
//! writes it; the [`Monitor`](lifecycle::Monitor) reads it without taking any lock.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! [`TableError`](framework::TableError) covers the failures that matter to the operator:
//! bad configuration, startup failures and broken fork invariants. A failed probe is
//! not an error, and a failed indicator update is only logged.
//!
//! ### 2. Injected Outputs
//! Busy/idle indicators (LEDs on a development board) are an injected
//! [`IndicatorSink`](framework::IndicatorSink), so the philosophers never depend on
//! the output medium.
//!
//! ### 3. Concurrency Model
//! Each philosopher runs in its own Tokio task on the multi-threaded runtime, so they
//! truly run in parallel. Shutdown is cooperative through one shared
//! [`CancellationToken`](tokio_util::sync::CancellationToken).
//!
//! ### 4. Observability
//! We use `tracing` everywhere with structured logging. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Forks, the acquisition protocol, indicators, errors and test doubles.
//!
//! ### 2. The Actors ([`philosopher`])
//! The per-seat state record and the think → hungry → eat loop.
//!
//! ### 3. The Orchestrator ([`lifecycle`])
//! Configuration, [`DiningTable`](lifecycle::DiningTable) start/stop, the monitor and the
//! signal bridge.
//!
//! ### 4. The Vocabulary ([`model`])
//! Seats, fork ids, statuses, pacing and snapshots.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Status line every second
//! RUST_LOG=info cargo run
//!
//! # Seven philosophers, 100ms time unit, every fork pick-up logged
//! DINING_SEATS=7 DINING_TIME_UNIT_MS=100 RUST_LOG=debug cargo run
//! ```
//!
//! Stop it with Ctrl-C or SIGTERM.

pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod philosopher;
