//! Afinar CLI - exhaustive benchmark parameter sweep
//!
//! Sweeps the LM benchmark executable across every combination of
//! model x threads x precision x GPU flag and reports the configuration
//! with the highest measured tokens/sec.
//!
//! The sweep parameters are fixed literals of the program (see
//! `SweepConfig::default`); the CLI deliberately exposes no flags for them.

use clap::Parser;

use afinar::{report_outcome, run_sweep, Result, SweepConfig, SystemRunner};

/// Afinar - find the highest-throughput benchmark configuration
///
/// Runs the benchmark executable once per parameter combination, strictly
/// one at a time (concurrent runs would bias the measurements), and prints
/// the best configuration found.
#[derive(Parser)]
#[command(name = "afinar")]
#[command(version, about, long_about = None)]
struct Cli {}

fn main() -> Result<()> {
    let _cli = Cli::parse();

    let config = SweepConfig::default();
    let runner = SystemRunner;

    let outcome = run_sweep(&config, &runner)?;
    report_outcome(&outcome);
    Ok(())
}
