// SPDX-License-Identifier: MIT

use std::process::ExitCode;

use parreduce::{
    BenchmarkReport, CliArgs, ReductionConfig, ReductionCoordinator, Result,
    SampleBuffer,
};

fn run() -> Result<BenchmarkReport> {
    let args = CliArgs::parse_parallel(std::env::args())?;
    let samples = SampleBuffer::load(&args.input)?;
    let config = ReductionConfig::default().with_workers(args.workers);
    ReductionCoordinator::new(&samples, config)?.run()
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
