// SPDX-License-Identifier: MIT

use std::ops::Range;

use crate::error::{BenchError, Result};

/// Half-open index range `[start, end)` into the sample sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    pub start: usize,
    pub end: usize,
}

impl Partition {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "partition start {start} past end {end}");
        Partition { start, end }
    }

    /// A single partition spanning `len` elements.
    pub fn whole(len: usize) -> Self {
        Partition { start: 0, end: len }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Splits `total_items` into exactly `num_workers` contiguous partitions.
///
/// Every worker gets `total_items / num_workers` items, except the last one,
/// which also absorbs the remainder. When the division is not exact the last
/// worker therefore does up to `num_workers - 1` extra items of work. With
/// more workers than items the leading partitions come out empty.
///
/// # Errors
/// `InvalidWorkerCount` when `num_workers` is zero, `Allocation` when the
/// partition list itself cannot be allocated.
pub fn plan(total_items: usize, num_workers: usize) -> Result<Vec<Partition>> {
    if num_workers == 0 {
        return Err(BenchError::InvalidWorkerCount(num_workers.to_string()));
    }

    let mut partitions = Vec::new();
    partitions.try_reserve_exact(num_workers).map_err(|source| {
        BenchError::Allocation {
            requested: num_workers,
            source,
        }
    })?;

    let base_chunk_size = total_items / num_workers;
    let last = num_workers - 1;

    partitions.extend((0..num_workers).map(|worker| {
        let start = worker * base_chunk_size;
        let end = if worker == last {
            total_items
        } else {
            start + base_chunk_size
        };
        Partition::new(start, end)
    }));

    Ok(partitions)
}
