//! Parameter space generation
//!
//! Produces the Cartesian product of the four option domains as a lazy
//! iterator. The product iterates the rightmost domain fastest
//! (models, then threads, then precision, with the GPU flag innermost),
//! and is restartable: the domains are fixed configuration, so regenerating
//! yields the identical sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SweepConfig;

/// Numeric precision mode passed to the benchmark executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    /// 32-bit floating point
    Fp32,
    /// 16-bit floating point
    Fp16,
    /// 8-bit integer quantization
    Int8,
}

impl Precision {
    /// Get string representation (the literal text sent on the command line)
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fp32 => "fp32",
            Self::Fp16 => "fp16",
            Self::Int8 => "int8",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fp32" | "f32" => Some(Self::Fp32),
            "fp16" | "f16" => Some(Self::Fp16),
            "int8" | "i8" => Some(Self::Int8),
            _ => None,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One concrete combination of benchmark parameters
///
/// Created by [`parameter_space`], consumed exactly once per sweep by the
/// benchmark runner, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterTuple {
    /// Model identifier or file path
    pub model: String,
    /// Number of inference threads
    pub threads: usize,
    /// Numeric precision mode
    pub precision: Precision,
    /// Whether GPU acceleration is requested
    pub use_gpu: bool,
}

impl fmt::Display for ParameterTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "model={}, threads={}, precision={}, use_gpu={}",
            self.model, self.threads, self.precision, self.use_gpu
        )
    }
}

/// Lazily generate every [`ParameterTuple`] in the configured domains
///
/// Standard lexicographic product order: for each model, each thread count,
/// each precision, each GPU flag. All domains are fixed non-empty literals,
/// so there are no failure modes.
pub fn parameter_space(config: &SweepConfig) -> impl Iterator<Item = ParameterTuple> + '_ {
    config.models.iter().flat_map(move |model| {
        config.thread_options.iter().flat_map(move |&threads| {
            config.precision_options.iter().flat_map(move |&precision| {
                config.gpu_options.iter().map(move |&use_gpu| ParameterTuple {
                    model: model.clone(),
                    threads,
                    precision,
                    use_gpu,
                })
            })
        })
    })
}
