// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex};

use crate::aggregate::{
    merge_locked, GlobalAggregate, PartialAggregate, ReductionMode,
    MAX_IDENTITY, MIN_IDENTITY,
};
use crate::partition::Partition;
use crate::pools::standardpool::Task;

/// Reduces `data[partition]` in the requested mode.
///
/// Reads only the partition's own range. Sums wrap on overflow. An empty
/// partition returns [`PartialAggregate::identity`].
///
/// # Panics
/// If the partition reaches past the end of `data`.
pub fn compute(
    data: &[i64],
    partition: Partition,
    mode: ReductionMode,
) -> PartialAggregate {
    let slice = &data[partition.range()];
    match mode {
        ReductionMode::Sum => PartialAggregate::Sum(
            slice.iter().fold(0i64, |acc, &x| acc.wrapping_add(x)),
        ),
        ReductionMode::MinMax => {
            let mut min = MIN_IDENTITY;
            let mut max = MAX_IDENTITY;
            for &value in slice {
                if value < min {
                    min = value;
                }
                if value > max {
                    max = value;
                }
            }
            PartialAggregate::MinMax { min, max }
        }
    }
}

/// Pool task that reduces one partition and merges the result into the
/// trial's shared aggregate.
pub struct ReduceTask {
    samples: Arc<[i64]>,
    partition: Partition,
    mode: ReductionMode,
    global: Arc<Mutex<GlobalAggregate>>,
}

impl ReduceTask {
    pub fn new(
        samples: Arc<[i64]>,
        partition: Partition,
        mode: ReductionMode,
        global: Arc<Mutex<GlobalAggregate>>,
    ) -> Self {
        ReduceTask {
            samples,
            partition,
            mode,
            global,
        }
    }
}

impl Task for ReduceTask {
    fn execute(&self) {
        let partial = compute(&self.samples, self.partition, self.mode);
        merge_locked(&self.global, partial);
    }
}
