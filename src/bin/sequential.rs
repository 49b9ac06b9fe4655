// SPDX-License-Identifier: MIT

use std::process::ExitCode;

use parreduce::config::SEQUENTIAL_ITERATIONS;
use parreduce::{sequential, BenchmarkReport, CliArgs, Result, SampleBuffer};

fn run() -> Result<BenchmarkReport> {
    let args = CliArgs::parse_sequential(std::env::args())?;
    let samples = SampleBuffer::load(&args.input)?;
    sequential::run(&samples, SEQUENTIAL_ITERATIONS)
}

fn main() -> ExitCode {
    parreduce::init_logging();
    match run() {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
