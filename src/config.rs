//! Sweep configuration
//!
//! The option domains, executable path, and per-run timeout are fixed
//! literals of the program - there is deliberately no CLI or file surface
//! for them. The configuration is built once at startup and passed by
//! reference into the sweep driver, never read as ambient global state.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::space::Precision;

/// Immutable configuration for one full parameter sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Path to the benchmark-capable executable
    pub executable: String,
    /// Model identifiers to benchmark
    pub models: Vec<String>,
    /// Thread-count options
    pub thread_options: Vec<usize>,
    /// Precision-mode options
    pub precision_options: Vec<Precision>,
    /// GPU-enable options
    pub gpu_options: Vec<bool>,
    /// Wall-clock ceiling for each benchmark invocation
    pub timeout: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            executable: "lmstudio.exe".to_string(),
            models: vec!["modelA.bin".to_string(), "modelB.bin".to_string()],
            thread_options: vec![8, 16, 32, 64],
            precision_options: vec![Precision::Fp32, Precision::Fp16, Precision::Int8],
            gpu_options: vec![true, false],
            timeout: Duration::from_secs(300),
        }
    }
}

impl SweepConfig {
    /// Total number of parameter tuples this configuration generates
    #[must_use]
    pub fn tuple_count(&self) -> usize {
        self.models.len()
            * self.thread_options.len()
            * self.precision_options.len()
            * self.gpu_options.len()
    }
}
