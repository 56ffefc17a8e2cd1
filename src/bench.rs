//! Benchmark runner: external process execution and metric extraction
//!
//! Process execution is an explicit abstraction ([`ProcessRunner`]) separate
//! from the parsing step ([`extract_tokens_per_sec`]), so each can be tested
//! independently with injected fake process behavior.
//!
//! [`SystemRunner`] is the real implementation: it spawns the benchmark
//! executable with captured stdio and enforces a wall-clock ceiling by
//! polling the child, killing it on overrun. [`MockRunner`] replays canned
//! output for tests.

use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::config::SweepConfig;
use crate::error::{AfinarError, Result};
use crate::space::ParameterTuple;

/// Captured output of one completed external process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Exit code, if the platform reported one
    ///
    /// Captured for diagnostics only - success/failure classification is
    /// driven entirely by the output contents, never the exit status.
    pub exit_code: Option<i32>,
}

/// Trait for external process execution
///
/// The single seam between the sweep and the operating system. Tests inject
/// a [`MockRunner`]; production uses [`SystemRunner`].
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args`, blocking until exit or `timeout`
    ///
    /// # Errors
    ///
    /// Returns `AfinarError::BenchmarkTimeout` if the process outlives the
    /// ceiling (the child is killed and reaped first), or
    /// `AfinarError::ProcessSpawnFailure` if it could not be started at all.
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<ProcessOutput>;
}

/// Poll interval while waiting for the child to exit
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Real process runner backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<ProcessOutput> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AfinarError::ProcessSpawnFailure {
                program: program.to_string(),
                source: e,
            })?;

        // Drain both pipes on background threads. Reading after the child
        // exits would deadlock once a pipe buffer fills.
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_handle = std::thread::spawn(move || drain_pipe(stdout_pipe));
        let stderr_handle = std::thread::spawn(move || drain_pipe(stderr_pipe));

        let start = Instant::now();
        let exit_code = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status.code(),
                Ok(None) => {
                    if start.elapsed() >= timeout {
                        // Kill the hung process and reap the zombie; the
                        // reader threads finish once the pipes close.
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = stdout_handle.join();
                        let _ = stderr_handle.join();
                        return Err(AfinarError::BenchmarkTimeout {
                            seconds: timeout.as_secs(),
                        });
                    }
                    std::thread::sleep(WAIT_POLL_INTERVAL);
                },
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stdout_handle.join();
                    let _ = stderr_handle.join();
                    return Err(AfinarError::ProcessSpawnFailure {
                        program: program.to_string(),
                        source: e,
                    });
                },
            }
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();

        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code,
        })
    }
}

/// Read a captured pipe to completion, lossily decoding as UTF-8
fn drain_pipe<R: Read>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Mock process runner replaying canned output
///
/// Ignores the program and arguments; every invocation yields the same
/// captured output (or the same canned error).
pub struct MockRunner {
    stdout: String,
    stderr: String,
    exit_code: Option<i32>,
    timeout_always: bool,
}

impl MockRunner {
    /// Mock a process that prints `stdout` and exits zero
    #[must_use]
    pub fn with_stdout(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: Some(0),
            timeout_always: false,
        }
    }

    /// Mock a process that never terminates (every run times out)
    #[must_use]
    pub fn hanging() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            timeout_always: true,
        }
    }

    /// Set the mocked exit code
    #[must_use]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Set the mocked stderr
    #[must_use]
    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }
}

impl ProcessRunner for MockRunner {
    fn run(&self, _program: &str, _args: &[String], timeout: Duration) -> Result<ProcessOutput> {
        if self.timeout_always {
            return Err(AfinarError::BenchmarkTimeout {
                seconds: timeout.as_secs(),
            });
        }
        Ok(ProcessOutput {
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            exit_code: self.exit_code,
        })
    }
}

/// Literal marker preceding the throughput value in benchmark output
const METRIC_MARKER: &str = "Average tokens/sec:";

/// Extract the throughput metric from captured benchmark output
///
/// Scans for the literal text `Average tokens/sec:` followed (after optional
/// whitespace) by a decimal number. The matched run may contain only digits
/// and at most one decimal point - no exponent notation, thousands
/// separators, or sign. The first valid match anywhere in the output wins.
/// No range validation is performed.
#[must_use]
pub fn extract_tokens_per_sec(output: &str) -> Option<f64> {
    for line in output.lines() {
        let Some(pos) = line.find(METRIC_MARKER) else {
            continue;
        };
        let rest = line[pos + METRIC_MARKER.len()..].trim_start();
        let run: &str = rest
            .split(|c: char| !c.is_ascii_digit() && c != '.')
            .next()
            .unwrap_or("");
        if is_valid_decimal(run) {
            if let Ok(value) = run.parse::<f64>() {
                return Some(value);
            }
        }
    }
    None
}

/// A valid metric match: at least one digit, at most one decimal point
fn is_valid_decimal(s: &str) -> bool {
    !s.is_empty()
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars().filter(|&c| c == '.').count() <= 1
}

/// Runs one parameter tuple as a single benchmark invocation
///
/// Builds the command line, executes it through the injected
/// [`ProcessRunner`], and reduces the captured output to a throughput value.
/// Each tuple is attempted exactly once per sweep - no retries.
pub struct BenchRunner<'a> {
    config: &'a SweepConfig,
    runner: &'a dyn ProcessRunner,
}

impl<'a> BenchRunner<'a> {
    /// Create a runner over the given configuration and process executor
    #[must_use]
    pub fn new(config: &'a SweepConfig, runner: &'a dyn ProcessRunner) -> Self {
        Self { config, runner }
    }

    /// Build CLI arguments for one benchmark invocation
    ///
    /// The GPU flag is present only when `use_gpu` is true; there is no
    /// explicit disable flag.
    #[must_use]
    pub fn build_cli_args(tuple: &ParameterTuple) -> Vec<String> {
        let mut args = vec![
            "--benchmark".to_string(),
            "--model".to_string(),
            tuple.model.clone(),
            "--threads".to_string(),
            tuple.threads.to_string(),
            "--precision".to_string(),
            tuple.precision.as_str().to_string(),
        ];
        if tuple.use_gpu {
            args.push("--use-gpu".to_string());
        }
        args
    }

    /// Benchmark one tuple, returning its measured tokens/sec
    ///
    /// # Errors
    ///
    /// - `BenchmarkTimeout` if the process outlives the configured ceiling
    /// - `UnparsableOutput` if no metric line is found in captured stdout
    /// - `ProcessSpawnFailure` if the executable could not be started
    pub fn run_tuple(&self, tuple: &ParameterTuple) -> Result<f64> {
        let args = Self::build_cli_args(tuple);
        println!("Running benchmark: {tuple}");

        let output = self.runner.run(&self.config.executable, &args, self.config.timeout)?;

        match extract_tokens_per_sec(&output.stdout) {
            Some(tokens_per_sec) => {
                println!("Result: {tokens_per_sec} tokens/sec");
                Ok(tokens_per_sec)
            },
            None => {
                let mut dump = output.stdout;
                if !output.stderr.is_empty() {
                    dump.push_str("\n--- stderr ---\n");
                    dump.push_str(&output.stderr);
                }
                if let Some(code) = output.exit_code {
                    dump.push_str(&format!("\n--- exit code: {code} ---"));
                }
                Err(AfinarError::UnparsableOutput { output: dump })
            },
        }
    }
}
