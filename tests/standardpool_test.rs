// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};
use std::sync::{Arc, Mutex};

use parreduce::pools::standardpool::StandardPool;
use parreduce::worker::ReduceTask;
use parreduce::{plan, BenchError, GlobalAggregate, ReductionMode};
use test_utils::samples::{
    pseudo_random_samples, reference_extrema, reference_sum,
};
use test_utils::tasks::{FlakyTask, SharedCounterTask};

#[test]
fn test_functionality_shared_variable() {
    // Set up test parameters
    let num_workers = 32;
    let total_tasks = 2048;
    let pool = StandardPool::new(num_workers).unwrap();
    let shared_counter = Arc::new(Mutex::new(0));

    // Run tasks in 8 batches with barriers between each batch
    for _ in 0..8 {
        for _ in 0..total_tasks / 8 {
            pool.add_task(Arc::new(SharedCounterTask::new(
                shared_counter.clone(),
            )));
        }
        pool.barrier().unwrap();
    }

    assert_eq!(*shared_counter.lock().unwrap(), total_tasks);
}

#[test]
fn test_reduce_tasks_across_barriers() {
    let num_workers: usize = 8;
    let num_tasks: usize = 512;
    let samples: Arc<[i64]> =
        pseudo_random_samples(1 << 16, 0x5eed, 1_000_000).into();
    let pool = StandardPool::new(num_workers).unwrap();

    for mode in [ReductionMode::Sum, ReductionMode::MinMax] {
        let global = Arc::new(Mutex::new(GlobalAggregate::new()));
        let partitions = plan(samples.len(), num_tasks).unwrap();

        // Queue in four batches; the aggregate must be complete only after
        // the last barrier.
        for batch in partitions.chunks(num_tasks / 4) {
            for &partition in batch {
                pool.add_task(Arc::new(ReduceTask::new(
                    samples.clone(),
                    partition,
                    mode,
                    global.clone(),
                )));
            }
            pool.barrier().unwrap();
        }

        let global = *global.lock().unwrap();
        match mode {
            ReductionMode::Sum => {
                assert_eq!(global.sum, reference_sum(&samples))
            }
            ReductionMode::MinMax => {
                assert_eq!(global.extrema(), reference_extrema(&samples))
            }
        }
    }
}

#[test]
fn test_panics_surface_at_barrier() {
    let pool = StandardPool::new(4).unwrap();
    let executions = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));

    for _ in 0..40 {
        pool.add_task(Arc::new(FlakyTask::new(
            executions.clone(),
            completed.clone(),
            10,
        )));
    }

    match pool.barrier() {
        Err(BenchError::WorkerPanicked { count }) => assert_eq!(count, 4),
        other => panic!("expected WorkerPanicked, got {other:?}"),
    }
    assert_eq!(executions.load(SeqCst), 40);
    assert_eq!(completed.load(SeqCst), 36);

    // The pool is still fully usable afterwards.
    let counter = Arc::new(Mutex::new(0));
    for _ in 0..16 {
        pool.add_task(Arc::new(SharedCounterTask::new(counter.clone())));
    }
    pool.barrier().unwrap();
    assert_eq!(*counter.lock().unwrap(), 16);
}
