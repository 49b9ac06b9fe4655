// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Identity for the running minimum. No partition can produce anything
/// smaller than this, so an untouched partial never wins a comparison.
pub const MIN_IDENTITY: i64 = i64::MAX;

/// Identity for the running maximum.
pub const MAX_IDENTITY: i64 = i64::MIN;

/// Which aggregate a trial computes. Passed explicitly to every worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReductionMode {
    Sum,
    MinMax,
}

impl fmt::Display for ReductionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReductionMode::Sum => f.write_str("sum"),
            ReductionMode::MinMax => f.write_str("min/max"),
        }
    }
}

/// Result of one worker over one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialAggregate {
    /// Wrapping sum of the partition.
    Sum(i64),
    /// Extrema of the partition; the identities when it was empty.
    MinMax { min: i64, max: i64 },
}

impl PartialAggregate {
    /// The neutral partial for `mode`, i.e. what an empty partition yields.
    pub fn identity(mode: ReductionMode) -> Self {
        match mode {
            ReductionMode::Sum => PartialAggregate::Sum(0),
            ReductionMode::MinMax => PartialAggregate::MinMax {
                min: MIN_IDENTITY,
                max: MAX_IDENTITY,
            },
        }
    }

    pub fn mode(&self) -> ReductionMode {
        match self {
            PartialAggregate::Sum(_) => ReductionMode::Sum,
            PartialAggregate::MinMax { .. } => ReductionMode::MinMax,
        }
    }
}

/// Run-wide accumulator shared by all workers of a trial.
///
/// Only ever mutated through [`GlobalAggregate::merge`] while the owning
/// mutex is held; see [`merge_locked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalAggregate {
    pub sum: i64,
    pub min: i64,
    pub max: i64,
}

impl Default for GlobalAggregate {
    fn default() -> Self {
        GlobalAggregate {
            sum: 0,
            min: MIN_IDENTITY,
            max: MAX_IDENTITY,
        }
    }
}

impl GlobalAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the identity values at the start of a trial.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Folds one partial into the running totals.
    ///
    /// The sum wraps on overflow. Min and max use strict comparisons, so an
    /// identity partial from an empty partition leaves the state untouched.
    pub fn merge(&mut self, partial: PartialAggregate) {
        match partial {
            PartialAggregate::Sum(sum) => {
                self.sum = self.sum.wrapping_add(sum);
            }
            PartialAggregate::MinMax { min, max } => {
                if min < self.min {
                    self.min = min;
                }
                if max > self.max {
                    self.max = max;
                }
            }
        }
    }

    /// `Some((min, max))` once at least one element has been merged.
    ///
    /// The identity pair is the only state where `min > max`, which is how
    /// an empty sample sequence is told apart from real extrema.
    pub fn extrema(&self) -> Option<(i64, i64)> {
        if self.min > self.max {
            None
        } else {
            Some((self.min, self.max))
        }
    }
}

/// Locks the shared aggregate, recovering it if a previous holder panicked.
pub(crate) fn lock_aggregate(
    shared: &Mutex<GlobalAggregate>,
) -> MutexGuard<'_, GlobalAggregate> {
    match shared.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("global aggregate lock was poisoned, recovering");
            shared.clear_poison();
            poisoned.into_inner()
        }
    }
}

/// Merges `partial` while holding the lock for the whole
/// compare-and-write, so merges from different workers never interleave.
pub fn merge_locked(
    shared: &Mutex<GlobalAggregate>,
    partial: PartialAggregate,
) {
    let mut guard = lock_aggregate(shared);
    guard.merge(partial);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_partial_is_noop() {
        let mut global = GlobalAggregate::new();
        global.merge(PartialAggregate::identity(ReductionMode::MinMax));
        global.merge(PartialAggregate::identity(ReductionMode::Sum));
        assert_eq!(global, GlobalAggregate::default());
        assert_eq!(global.extrema(), None);

        global.merge(PartialAggregate::MinMax { min: -3, max: 10 });
        global.merge(PartialAggregate::identity(ReductionMode::MinMax));
        assert_eq!(global.extrema(), Some((-3, 10)));
    }

    #[test]
    fn test_extreme_values_survive_identity_merge() {
        let mut global = GlobalAggregate::new();
        global.merge(PartialAggregate::MinMax {
            min: i64::MAX,
            max: i64::MAX,
        });
        global.merge(PartialAggregate::identity(ReductionMode::MinMax));
        assert_eq!(global.extrema(), Some((i64::MAX, i64::MAX)));

        global.merge(PartialAggregate::MinMax {
            min: i64::MIN,
            max: i64::MIN,
        });
        assert_eq!(global.extrema(), Some((i64::MIN, i64::MAX)));
    }

    #[test]
    fn test_sum_wraps_on_overflow() {
        let mut global = GlobalAggregate::new();
        global.merge(PartialAggregate::Sum(i64::MAX));
        global.merge(PartialAggregate::Sum(1));
        assert_eq!(global.sum, i64::MIN);
    }

    #[test]
    fn test_reset_restores_identity() {
        let mut global = GlobalAggregate::new();
        global.merge(PartialAggregate::Sum(7));
        global.merge(PartialAggregate::MinMax { min: 1, max: 2 });
        global.reset();
        assert_eq!(global, GlobalAggregate::default());
    }

    #[test]
    fn test_merge_locked_recovers_poison() {
        use std::sync::Arc;
        use std::thread;

        let shared = Arc::new(Mutex::new(GlobalAggregate::new()));
        let poisoner = shared.clone();
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the aggregate lock");
        })
        .join();
        assert!(shared.is_poisoned());

        merge_locked(&shared, PartialAggregate::Sum(5));
        assert!(!shared.is_poisoned());
        assert_eq!(shared.lock().unwrap().sum, 5);
    }
}
