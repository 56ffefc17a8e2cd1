//! Error types for the benchmark sweep
//!
//! Per-tuple failures ([`AfinarError::BenchmarkTimeout`],
//! [`AfinarError::UnparsableOutput`]) are contained by the sweep driver: the
//! failing tuple is logged and skipped. Only
//! [`AfinarError::ProcessSpawnFailure`] is fatal - if the benchmark
//! executable cannot be started at all, every remaining tuple would fail the
//! same way, so the sweep terminates immediately.

use thiserror::Error;

/// Errors produced while benchmarking a single parameter tuple
#[derive(Debug, Error)]
pub enum AfinarError {
    /// The external process did not complete within the per-run ceiling
    #[error("benchmark timed out after {seconds}s")]
    BenchmarkTimeout {
        /// Ceiling that was exceeded, in seconds
        seconds: u64,
    },

    /// The process completed but its output never matched the metric pattern
    #[error("could not parse tokens/sec from benchmark output")]
    UnparsableOutput {
        /// Full captured stdout, kept for the diagnostic dump
        output: String,
    },

    /// The benchmark executable could not be started at all
    #[error("failed to spawn {program}: {source}")]
    ProcessSpawnFailure {
        /// Program that failed to start
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

impl AfinarError {
    /// Whether this error terminates the whole sweep
    ///
    /// Timeouts and unparsable output are local to one tuple; a spawn
    /// failure means no tuple can run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ProcessSpawnFailure { .. })
    }
}

/// Result type alias for afinar operations
pub type Result<T> = std::result::Result<T, AfinarError>;
