//! # Afinar
//!
//! Afinar (Spanish: "to tune") performs an exhaustive parameter sweep over an
//! external LM benchmark executable and reports the configuration with the
//! highest measured throughput (tokens/sec).
//!
//! The whole system is one linear sweep-and-measure loop:
//!
//! 1. Generate the Cartesian product of models x thread counts x precision
//!    modes x GPU flags ([`space::parameter_space`]).
//! 2. Invoke the benchmark executable once per combination, capture its
//!    output, and extract the throughput metric ([`bench::BenchRunner`]).
//! 3. Select the best measurement ([`sweep::run_sweep`]).
//!
//! Benchmarks run strictly one at a time, in deterministic order: concurrent
//! invocations would contend for the same CPU/GPU and bias the measurements.
//!
//! ## Example
//!
//! ```rust
//! use afinar::{MockRunner, SweepConfig, SweepOutcome};
//!
//! let config = SweepConfig::default();
//! let runner = MockRunner::with_stdout("Average tokens/sec: 42.5");
//! let outcome = afinar::run_sweep(&config, &runner).unwrap();
//! match outcome {
//!     SweepOutcome::Best(best) => assert_eq!(best.tokens_per_second, 42.5),
//!     SweepOutcome::NoValidResults => unreachable!(),
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::float_cmp)] // Parsed metrics are compared exactly in tests

pub mod bench;
pub mod config;
pub mod error;
pub mod space;
pub mod sweep;

pub use bench::{
    extract_tokens_per_sec, BenchRunner, MockRunner, ProcessOutput, ProcessRunner, SystemRunner,
};
pub use config::SweepConfig;
pub use error::{AfinarError, Result};
pub use space::{parameter_space, ParameterTuple, Precision};
pub use sweep::{report_outcome, run_sweep, MeasurementResult, SweepOutcome};
