// SPDX-License-Identifier: MIT

use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::aggregate::{GlobalAggregate, ReductionMode};
use crate::buffer::SampleBuffer;
use crate::coordinator::PhaseTiming;
use crate::error::{BenchError, Result};
use crate::partition::Partition;
use crate::report::BenchmarkReport;
use crate::worker;

/// Reduces the whole buffer on the calling thread.
pub fn reduce(samples: &SampleBuffer, mode: ReductionMode) -> GlobalAggregate {
    let mut global = GlobalAggregate::new();
    global.merge(worker::compute(
        samples.as_slice(),
        Partition::whole(samples.len()),
        mode,
    ));
    global
}

/// Single-threaded baseline: `iterations` timed passes per mode over the
/// whole buffer, sum first.
pub fn run(
    samples: &SampleBuffer,
    iterations: usize,
) -> Result<BenchmarkReport> {
    let mut sum = 0;
    let mut extrema = None;
    let mut averages = [Duration::ZERO; 2];

    for (slot, mode) in [ReductionMode::Sum, ReductionMode::MinMax]
        .into_iter()
        .enumerate()
    {
        if iterations == 0 {
            return Err(BenchError::InvalidIterations { mode });
        }

        let mut timing = PhaseTiming::new(mode);
        let mut result = GlobalAggregate::new();
        for _ in 0..iterations {
            let start = Instant::now();
            result = black_box(reduce(black_box(samples), mode));
            timing.record(start.elapsed());
        }
        log::info!(
            "sequential {mode} phase: {} passes, average {:.6}s",
            timing.iterations,
            timing.average().as_secs_f64()
        );

        match mode {
            ReductionMode::Sum => sum = result.sum,
            ReductionMode::MinMax => extrema = result.extrema(),
        }
        averages[slot] = timing.average();
    }

    Ok(BenchmarkReport {
        sum,
        extrema,
        avg_sum_time: averages[0],
        avg_minmax_time: averages[1],
    })
}
