//! # Table Errors
//!
//! This module defines the error types used throughout the table. Only
//! initialization failures and broken fork invariants are ever surfaced to the
//! operator; a failed probe is ordinary control flow and indicator failures are
//! logged and dropped by the philosopher that hit them.

use crate::model::{ForkId, Seat};

/// Errors that stop the table (or prevent it from starting).
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Invalid table configuration: {0}")]
    InvalidConfig(String),
    #[error("No Tokio runtime to host the philosophers: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
    #[error("Failed to install termination handler: {0}")]
    Signal(#[from] std::io::Error),
    #[error("Philosopher at seat {seat} failed to start: {reason}")]
    StartupFailed { seat: Seat, reason: String },
    #[error("Unknown fork: {0}")]
    UnknownFork(ForkId),
    #[error("Seat {seat} released {fork} without holding it")]
    NotHeld { fork: ForkId, seat: Seat },
    #[error("Fork closed: {0}")]
    PoolClosed(ForkId),
    #[error("Philosopher at seat {seat} panicked: {reason}")]
    WorkerPanicked { seat: Seat, reason: String },
}

/// Failure to drive a busy/idle indicator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IndicatorError {
    #[error("Indicator unavailable: {0}")]
    Unavailable(String),
}
