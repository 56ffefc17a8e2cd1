//! Sweep driver: orchestrates the full parameter sweep
//!
//! A single straight-line pass: generate every tuple, benchmark each one
//! synchronously, collect the successful measurements, and reduce to the
//! best result. Per-tuple failures (timeout, unparsable output) are logged
//! and skipped; only a spawn failure aborts the sweep, since no tuple could
//! run after it.
//!
//! Benchmarks never overlap: one tuple fully completes before the next
//! begins. This is a measurement-validity requirement - concurrent runs of
//! the same executable would contend for CPU/GPU and bias the results.

use serde::{Deserialize, Serialize};

use crate::bench::{BenchRunner, ProcessRunner};
use crate::config::SweepConfig;
use crate::error::{AfinarError, Result};
use crate::space::{parameter_space, ParameterTuple};

/// One successful throughput measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    /// The configuration that was benchmarked
    pub tuple: ParameterTuple,
    /// Measured throughput
    pub tokens_per_second: f64,
}

/// Final outcome of one complete sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SweepOutcome {
    /// The measurement with the maximum tokens/sec (first maximum on ties)
    Best(MeasurementResult),
    /// Every tuple failed - no measurement was collected
    NoValidResults,
}

/// Run the full sweep over every tuple in the configured parameter space
///
/// Results are collected in generation order. A timeout or unparsable
/// output on one tuple is logged and the sweep continues; a process spawn
/// failure propagates immediately and terminates the sweep.
///
/// # Errors
///
/// Returns `AfinarError::ProcessSpawnFailure` if the benchmark executable
/// could not be started.
pub fn run_sweep(config: &SweepConfig, runner: &dyn ProcessRunner) -> Result<SweepOutcome> {
    let bench = BenchRunner::new(config, runner);
    let mut results: Vec<MeasurementResult> = Vec::new();

    for tuple in parameter_space(config) {
        match bench.run_tuple(&tuple) {
            Ok(tokens_per_second) => {
                results.push(MeasurementResult {
                    tuple,
                    tokens_per_second,
                });
            },
            Err(e) if e.is_fatal() => return Err(e),
            Err(AfinarError::UnparsableOutput { output }) => {
                eprintln!("Could not parse tokens/sec from output for {tuple}:");
                eprintln!("{output}");
            },
            Err(e) => {
                eprintln!("{e} for configuration: {tuple}");
            },
        }
    }

    Ok(best_result(results))
}

/// Reduce the ordered measurements to the sweep outcome
///
/// Explicit fold comparing strictly greater than the current best, which
/// preserves first-occurrence-on-tie semantics.
fn best_result(results: Vec<MeasurementResult>) -> SweepOutcome {
    let mut best: Option<MeasurementResult> = None;
    for candidate in results {
        match &best {
            Some(current) if candidate.tokens_per_second <= current.tokens_per_second => {},
            _ => best = Some(candidate),
        }
    }
    best.map_or(SweepOutcome::NoValidResults, SweepOutcome::Best)
}

/// Report the sweep outcome on the console
pub fn report_outcome(outcome: &SweepOutcome) {
    match outcome {
        SweepOutcome::Best(best) => {
            println!();
            println!("--- Best Configuration Found ---");
            println!("Model: {}", best.tuple.model);
            println!("Threads: {}", best.tuple.threads);
            println!("Precision: {}", best.tuple.precision);
            println!("Use GPU: {}", best.tuple.use_gpu);
            println!("Tokens/sec: {}", best.tokens_per_second);
        },
        SweepOutcome::NoValidResults => {
            println!("No valid results obtained from benchmarking.");
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::bench::{MockRunner, ProcessOutput};
    use crate::error::AfinarError;
    use crate::space::Precision;

    use super::*;

    /// Mock runner scripted per invocation: yields the nth canned stdout on
    /// the nth call (cycling is not needed - one sweep consumes exactly one
    /// entry per tuple).
    struct ScriptedRunner {
        outputs: Mutex<Vec<String>>,
        calls: Mutex<usize>,
    }

    impl ScriptedRunner {
        fn new(outputs: Vec<String>) -> Self {
            Self {
                outputs: Mutex::new(outputs),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn run(
            &self,
            _program: &str,
            _args: &[String],
            _timeout: Duration,
        ) -> crate::Result<ProcessOutput> {
            let mut calls = self.calls.lock().unwrap();
            let outputs = self.outputs.lock().unwrap();
            let stdout = outputs.get(*calls).cloned().unwrap_or_default();
            *calls += 1;
            Ok(ProcessOutput {
                stdout,
                stderr: String::new(),
                exit_code: Some(0),
            })
        }
    }

    fn measurement(model: &str, tps: f64) -> MeasurementResult {
        MeasurementResult {
            tuple: ParameterTuple {
                model: model.to_string(),
                threads: 8,
                precision: Precision::Fp32,
                use_gpu: false,
            },
            tokens_per_second: tps,
        }
    }

    #[test]
    fn test_best_result_empty_collection() {
        assert_eq!(best_result(vec![]), SweepOutcome::NoValidResults);
    }

    #[test]
    fn test_best_result_single() {
        let outcome = best_result(vec![measurement("a", 10.0)]);
        assert_eq!(outcome, SweepOutcome::Best(measurement("a", 10.0)));
    }

    #[test]
    fn test_best_result_first_maximum_wins_on_tie() {
        let outcome = best_result(vec![
            measurement("a", 50.0),
            measurement("b", 200.0),
            measurement("c", 200.0),
        ]);
        match outcome {
            SweepOutcome::Best(best) => {
                assert_eq!(best.tuple.model, "b");
                assert_eq!(best.tokens_per_second, 200.0);
            },
            SweepOutcome::NoValidResults => panic!("Expected a best result"),
        }
    }

    #[test]
    fn test_sweep_visits_every_tuple_once() {
        let config = SweepConfig::default();
        let runner = ScriptedRunner::new(vec![]);
        let outcome = run_sweep(&config, &runner).unwrap();

        assert_eq!(runner.call_count(), 48);
        assert_eq!(outcome, SweepOutcome::NoValidResults);
    }

    #[test]
    fn test_sweep_tie_at_maximum_reports_first_in_generation_order() {
        // 48 tuples; tuples 5, 20, and 33 succeed with {50.0, 200.0, 200.0}.
        let mut outputs = vec![String::from("no metric"); 48];
        outputs[5] = "Average tokens/sec: 50.0".to_string();
        outputs[20] = "Average tokens/sec: 200.0".to_string();
        outputs[33] = "Average tokens/sec: 200.0".to_string();

        let config = SweepConfig::default();
        let runner = ScriptedRunner::new(outputs);
        let outcome = run_sweep(&config, &runner).unwrap();

        let expected_tuple = parameter_space(&config).nth(20).unwrap();
        match outcome {
            SweepOutcome::Best(best) => {
                assert_eq!(best.tokens_per_second, 200.0);
                assert_eq!(best.tuple, expected_tuple);
            },
            SweepOutcome::NoValidResults => panic!("Expected a best result"),
        }
    }

    #[test]
    fn test_sweep_all_timeouts_yield_no_valid_results() {
        let config = SweepConfig::default();
        let runner = MockRunner::hanging();
        let outcome = run_sweep(&config, &runner).unwrap();
        assert_eq!(outcome, SweepOutcome::NoValidResults);
    }

    #[test]
    fn test_sweep_timeout_is_contained_and_sweep_continues() {
        struct TimeoutThenSucceed {
            calls: Mutex<usize>,
        }
        impl ProcessRunner for TimeoutThenSucceed {
            fn run(
                &self,
                _program: &str,
                _args: &[String],
                timeout: Duration,
            ) -> crate::Result<ProcessOutput> {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                if *calls == 1 {
                    return Err(AfinarError::BenchmarkTimeout {
                        seconds: timeout.as_secs(),
                    });
                }
                Ok(ProcessOutput {
                    stdout: "Average tokens/sec: 7.5".to_string(),
                    stderr: String::new(),
                    exit_code: Some(0),
                })
            }
        }

        let config = SweepConfig::default();
        let runner = TimeoutThenSucceed {
            calls: Mutex::new(0),
        };
        let outcome = run_sweep(&config, &runner).unwrap();

        match outcome {
            SweepOutcome::Best(best) => {
                // First tuple timed out, so the second tuple holds the best.
                assert_eq!(best.tokens_per_second, 7.5);
                assert_eq!(best.tuple, parameter_space(&config).nth(1).unwrap());
            },
            SweepOutcome::NoValidResults => panic!("Expected a best result"),
        }
    }

    #[test]
    fn test_sweep_is_idempotent_over_identical_behavior() {
        let config = SweepConfig::default();
        let first = run_sweep(
            &config,
            &MockRunner::with_stdout("Average tokens/sec: 99.9"),
        )
        .unwrap();
        let second = run_sweep(
            &config,
            &MockRunner::with_stdout("Average tokens/sec: 99.9"),
        )
        .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_outcome_serde_roundtrip() {
        let outcome = SweepOutcome::Best(measurement("modelA.bin", 123.45));
        let json = serde_json::to_string(&outcome).unwrap();
        let back: SweepOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
