// SPDX-License-Identifier: MIT

//! Parallel vs. sequential reduction benchmark.
//!
//! A [`SampleBuffer`] of `i64` values is split into one contiguous
//! [`Partition`] per worker. The [`ReductionCoordinator`] then times repeated
//! sum and min/max trials, where every worker merges its partial result into
//! a mutex-guarded [`GlobalAggregate`]. The [`sequential`] module provides
//! the single-threaded baseline.
//!
//! The `parreduce` binary always runs with the default
//! [`PoolStrategy::Respawn`]. [`PoolStrategy::Persistent`] is only reachable
//! through [`ReductionConfig::with_strategy`].

pub mod aggregate;
pub mod buffer;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod partition;
pub mod pools;
pub mod report;
pub mod sequential;
pub mod worker;

pub use aggregate::{GlobalAggregate, PartialAggregate, ReductionMode};
pub use buffer::SampleBuffer;
pub use config::{CliArgs, PoolStrategy, ReductionConfig};
pub use coordinator::{PhaseTiming, ReductionCoordinator};
pub use error::{BenchError, Result};
pub use partition::{plan, Partition};
pub use report::BenchmarkReport;

/// Installs the `env_logger` backend for the binaries. Silent unless
/// `RUST_LOG` asks for output; records go to stderr so the result table on
/// stdout stays clean.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("off"),
    )
    .format_timestamp_millis()
    .try_init();
}
