// SPDX-License-Identifier: MIT

use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::aggregate::ReductionMode;

/// Every fatal condition the benchmark can hit. None of them are retried;
/// the binaries print the message and exit with status 1.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Wrong number of command-line arguments.
    #[error("Usage: {program} {expected}")]
    Usage {
        program: String,
        expected: &'static str,
    },

    /// Worker count below 1 or not a number at all.
    #[error("Error: Invalid number of threads ({0:?})")]
    InvalidWorkerCount(String),

    /// A phase was configured to run zero trials.
    #[error("Error: {mode} phase needs at least one iteration")]
    InvalidIterations { mode: ReductionMode },

    #[error(
        "Error: Could not open file {}. Please check if the file with the \
         given name exists",
        .path.display()
    )]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error reading samples: {0}")]
    Read(#[from] io::Error),

    /// Growing the sample buffer or the partition list failed.
    #[error("Error allocating memory for {requested} elements")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    /// The very first token of the input was not an integer.
    #[error("Error: no integer could be read, first token was {token:?}")]
    Parse { token: String },

    #[error("Error spawning worker thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("Error: {count} worker(s) panicked during a trial")]
    WorkerPanicked { count: usize },
}

pub type Result<T> = std::result::Result<T, BenchError>;
