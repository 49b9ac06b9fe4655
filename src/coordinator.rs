// SPDX-License-Identifier: MIT

//! Drives repeated parallel reduction trials over a fixed partition plan.
//!
//! Each trial resets the shared [`GlobalAggregate`], dispatches one worker
//! per partition, and blocks until all of them have merged their partial
//! result. The sum phase runs to completion before the min/max phase starts.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::aggregate::{
    lock_aggregate, merge_locked, GlobalAggregate, ReductionMode,
};
use crate::buffer::SampleBuffer;
use crate::config::{PoolStrategy, ReductionConfig};
use crate::error::{BenchError, Result};
use crate::partition::{self, Partition};
use crate::pools::standardpool::StandardPool;
use crate::report::BenchmarkReport;
use crate::worker::{self, ReduceTask};

/// Accumulated wall-clock time of every trial in one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTiming {
    pub mode: ReductionMode,
    pub iterations: usize,
    pub total: Duration,
}

impl PhaseTiming {
    pub fn new(mode: ReductionMode) -> Self {
        PhaseTiming {
            mode,
            iterations: 0,
            total: Duration::ZERO,
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.iterations += 1;
        self.total += elapsed;
    }

    pub fn average(&self) -> Duration {
        if self.iterations == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total.as_nanos() / self.iterations as u128;
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

pub struct ReductionCoordinator {
    samples: Arc<[i64]>,
    partitions: Vec<Partition>,
    config: ReductionConfig,
    global: Arc<Mutex<GlobalAggregate>>,
    /// Present only for [`PoolStrategy::Persistent`].
    pool: Option<StandardPool>,
}

impl ReductionCoordinator {
    /// Plans the partitions once and, for the persistent strategy, starts
    /// the worker pool.
    pub fn new(
        samples: &SampleBuffer,
        config: ReductionConfig,
    ) -> Result<Self> {
        config.validate()?;
        let partitions = partition::plan(samples.len(), config.workers)?;
        log::info!(
            "planned {} partitions over {} samples ({:?} strategy)",
            partitions.len(),
            samples.len(),
            config.strategy
        );

        let pool = match config.strategy {
            PoolStrategy::Respawn => None,
            PoolStrategy::Persistent => {
                Some(StandardPool::new(config.workers)?)
            }
        };

        Ok(ReductionCoordinator {
            samples: samples.shared(),
            partitions,
            config,
            global: Arc::new(Mutex::new(GlobalAggregate::new())),
            pool,
        })
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// Copy of the global aggregate as the last trial left it.
    pub fn snapshot(&self) -> GlobalAggregate {
        *lock_aggregate(&self.global)
    }

    /// Runs one reset/dispatch/join cycle and returns its wall-clock time.
    ///
    /// The aggregate is complete once this returns `Ok`: every partition
    /// has been merged exactly once.
    pub fn run_trial(&self, mode: ReductionMode) -> Result<Duration> {
        lock_aggregate(&self.global).reset();

        let start = Instant::now();
        match &self.pool {
            None => self.dispatch_scoped(mode)?,
            Some(pool) => self.dispatch_pool(pool, mode)?,
        }
        let elapsed = start.elapsed();

        log::debug!("{mode} trial finished in {elapsed:?}");
        Ok(elapsed)
    }

    /// Runs the configured number of trials for `mode`.
    pub fn run_phase(&self, mode: ReductionMode) -> Result<PhaseTiming> {
        let mut timing = PhaseTiming::new(mode);
        for _ in 0..self.config.iterations(mode) {
            timing.record(self.run_trial(mode)?);
        }
        log::info!(
            "{mode} phase: {} trials, average {:.6}s",
            timing.iterations,
            timing.average().as_secs_f64()
        );
        Ok(timing)
    }

    /// Sum phase, then min/max phase, each captured when it completes.
    pub fn run(&self) -> Result<BenchmarkReport> {
        let sum_timing = self.run_phase(ReductionMode::Sum)?;
        let sum = self.snapshot().sum;

        let minmax_timing = self.run_phase(ReductionMode::MinMax)?;
        let extrema = self.snapshot().extrema();

        Ok(BenchmarkReport {
            sum,
            extrema,
            avg_sum_time: sum_timing.average(),
            avg_minmax_time: minmax_timing.average(),
        })
    }

    /// One freshly spawned scoped thread per partition, joined before
    /// returning.
    fn dispatch_scoped(&self, mode: ReductionMode) -> Result<()> {
        let samples: &[i64] = &self.samples;
        let global: &Mutex<GlobalAggregate> = &self.global;

        thread::scope(|scope| -> Result<()> {
            let mut handles = Vec::with_capacity(self.partitions.len());
            for (index, &partition) in self.partitions.iter().enumerate() {
                let handle = thread::Builder::new()
                    .name(format!("parreduce-trial-{index}"))
                    .spawn_scoped(scope, move || {
                        let partial = worker::compute(samples, partition, mode);
                        merge_locked(global, partial);
                    })
                    .map_err(BenchError::Spawn)?;
                handles.push(handle);
            }

            let count = handles
                .into_iter()
                .map(|handle| handle.join())
                .filter(|joined| joined.is_err())
                .count();
            if count > 0 {
                return Err(BenchError::WorkerPanicked { count });
            }
            Ok(())
        })
    }

    /// Queues one [`ReduceTask`] per partition on the persistent pool and
    /// waits on its barrier.
    fn dispatch_pool(
        &self,
        pool: &StandardPool,
        mode: ReductionMode,
    ) -> Result<()> {
        for &partition in &self.partitions {
            pool.add_task(Arc::new(ReduceTask::new(
                self.samples.clone(),
                partition,
                mode,
                self.global.clone(),
            )));
        }
        pool.barrier()
    }
}
