// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use crate::aggregate::ReductionMode;
use crate::error::{BenchError, Result};

/// Worker count used when none is given on the command line.
pub const DEFAULT_WORKERS: usize = 4;
/// Trials per phase in the parallel benchmark.
pub const PARALLEL_ITERATIONS: usize = 100;
/// Trials per phase in the sequential baseline.
pub const SEQUENTIAL_ITERATIONS: usize = 10;

const PARALLEL_USAGE: &str = "<filename> [num_threads]";
const SEQUENTIAL_USAGE: &str = "<filename>";

/// How worker threads are provided to each trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolStrategy {
    /// Spawn and join fresh scoped threads for every trial.
    #[default]
    Respawn,
    /// Keep one [`StandardPool`](crate::pools::standardpool::StandardPool)
    /// alive for all trials and join through its barrier.
    Persistent,
}

/// Settings for one run of the reduction coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionConfig {
    pub workers: usize,
    pub sum_iterations: usize,
    pub minmax_iterations: usize,
    pub strategy: PoolStrategy,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        ReductionConfig {
            workers: DEFAULT_WORKERS,
            sum_iterations: PARALLEL_ITERATIONS,
            minmax_iterations: PARALLEL_ITERATIONS,
            strategy: PoolStrategy::default(),
        }
    }
}

impl ReductionConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets both phases to the same number of trials.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.sum_iterations = iterations;
        self.minmax_iterations = iterations;
        self
    }

    pub fn with_sum_iterations(mut self, iterations: usize) -> Self {
        self.sum_iterations = iterations;
        self
    }

    pub fn with_minmax_iterations(mut self, iterations: usize) -> Self {
        self.minmax_iterations = iterations;
        self
    }

    pub fn with_strategy(mut self, strategy: PoolStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn iterations(&self, mode: ReductionMode) -> usize {
        match mode {
            ReductionMode::Sum => self.sum_iterations,
            ReductionMode::MinMax => self.minmax_iterations,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(BenchError::InvalidWorkerCount(
                self.workers.to_string(),
            ));
        }
        for mode in [ReductionMode::Sum, ReductionMode::MinMax] {
            if self.iterations(mode) == 0 {
                return Err(BenchError::InvalidIterations { mode });
            }
        }
        Ok(())
    }
}

/// Parsed command line of either entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub input: PathBuf,
    pub workers: usize,
}

impl CliArgs {
    /// Parses `<program> <filename> [num_threads]`.
    ///
    /// `num_threads` defaults to [`DEFAULT_WORKERS`]. Anything that is not
    /// an integer of at least 1 is rejected.
    pub fn parse_parallel<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let (program, rest) = split_program(args, "parreduce");
        let (input, workers) = match rest.as_slice() {
            [input] => (input, DEFAULT_WORKERS),
            [input, workers] => (input, parse_workers(workers)?),
            _ => {
                return Err(BenchError::Usage {
                    program,
                    expected: PARALLEL_USAGE,
                })
            }
        };
        Ok(CliArgs {
            input: PathBuf::from(input),
            workers,
        })
    }

    /// Parses `<program> <filename>` for the single-threaded baseline.
    pub fn parse_sequential<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let (program, rest) = split_program(args, "parreduce-seq");
        match rest.as_slice() {
            [input] => Ok(CliArgs {
                input: PathBuf::from(input),
                workers: 1,
            }),
            _ => Err(BenchError::Usage {
                program,
                expected: SEQUENTIAL_USAGE,
            }),
        }
    }
}

fn split_program<I>(args: I, fallback: &str) -> (String, Vec<String>)
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let program = args.next().unwrap_or_else(|| fallback.to_string());
    (program, args.collect())
}

fn parse_workers(raw: &str) -> Result<usize> {
    match raw.trim().parse::<i64>() {
        Ok(count) if count >= 1 => usize::try_from(count)
            .map_err(|_| BenchError::InvalidWorkerCount(raw.to_string())),
        _ => Err(BenchError::InvalidWorkerCount(raw.to_string())),
    }
}
