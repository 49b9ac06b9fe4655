// SPDX-License-Identifier: MIT

//! Property tests for partition planning and reduction equivalence.

use parreduce::{
    plan, sequential, PoolStrategy, ReductionConfig, ReductionCoordinator,
    ReductionMode, SampleBuffer,
};
use proptest::prelude::*;
use test_utils::samples::{reference_extrema, reference_sum};

fn strategy_choice() -> impl Strategy<Value = PoolStrategy> {
    prop_oneof![Just(PoolStrategy::Respawn), Just(PoolStrategy::Persistent)]
}

proptest! {
    #[test]
    fn partitions_cover_every_index_once(n in 0usize..5000, w in 1usize..64) {
        let parts = plan(n, w).unwrap();
        prop_assert_eq!(parts.len(), w);

        let mut next = 0;
        for part in &parts {
            prop_assert_eq!(part.start, next);
            prop_assert!(part.start <= part.end);
            next = part.end;
        }
        prop_assert_eq!(next, n);
    }

    #[test]
    fn only_last_partition_is_larger(n in 0usize..5000, w in 1usize..64) {
        let parts = plan(n, w).unwrap();
        let base = n / w;
        for part in &parts[..w - 1] {
            prop_assert_eq!(part.len(), base);
        }
        prop_assert_eq!(parts[w - 1].len(), base + n % w);
    }

    #[test]
    fn parallel_matches_reference(
        values in prop::collection::vec(any::<i64>(), 1..300),
        workers in 1usize..12,
        strategy in strategy_choice(),
    ) {
        let samples = SampleBuffer::from(values.clone());
        let config = ReductionConfig::default()
            .with_workers(workers)
            .with_iterations(1)
            .with_strategy(strategy);
        let report = ReductionCoordinator::new(&samples, config)
            .unwrap()
            .run()
            .unwrap();

        prop_assert_eq!(report.sum, reference_sum(&values));
        prop_assert_eq!(report.extrema, reference_extrema(&values));
    }

    #[test]
    fn worker_count_does_not_change_result(
        values in prop::collection::vec(-1000i64..1000, 0..200),
        workers in 2usize..16,
    ) {
        let samples = SampleBuffer::from(values);
        let single =
            ReductionConfig::default().with_workers(1).with_iterations(1);
        let many = ReductionConfig::default()
            .with_workers(workers)
            .with_iterations(1);

        let single = ReductionCoordinator::new(&samples, single).unwrap();
        let many = ReductionCoordinator::new(&samples, many).unwrap();
        for mode in [ReductionMode::Sum, ReductionMode::MinMax] {
            single.run_trial(mode).unwrap();
            many.run_trial(mode).unwrap();
            prop_assert_eq!(single.snapshot(), many.snapshot());
            let expected = sequential::reduce(&samples, mode);
            prop_assert_eq!(single.snapshot(), expected);
        }
    }
}
