// src/error.rs
#![forbid(unsafe_code)]

use thiserror::Error;

use crate::policy::PolicyError;

/// Failures surfaced by the collector.
///
/// Simulator-internal conditions (collision, game over, line clears) are
/// ordinary state transitions, never errors. Nothing here is retried or
/// swallowed: every variant reaches the caller of the collector entry point
/// that triggered it.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A worker woke up for a job while no policy was installed.
    #[error("no policy installed (worker {worker})")]
    PolicyNotSet { worker: usize },

    #[error("collector is closed")]
    Closed,

    /// The user-supplied policy failed; carries the underlying cause.
    #[error("policy callback failed: {source}")]
    PolicyFailure {
        #[source]
        source: PolicyError,
    },
}
