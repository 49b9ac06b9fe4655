// SPDX-License-Identifier: MIT

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;

use crate::error::{BenchError, Result};

/// Unit of work handed to the pool. Reduction tasks hold their own inputs
/// and publish results through shared state.
pub trait Task {
    fn execute(&self);
}

/// Task implementation that represents a barrier synchronization point.
/// Each worker thread must reach the barrier before any are allowed to proceed.
struct BarrierTask {
    /// Count of arrivals and barrier condition.
    sync_point: Arc<(Mutex<usize>, Condvar)>,
    /// Number of participants (workers plus the caller) in the barrier.
    total_workers: usize,
}

impl Task for BarrierTask {
    fn execute(&self) {
        let (ref arrival_count, ref barrier_condvar) = *self.sync_point;
        let mut count_guard = arrival_count
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Increment arrival count to signal that this worker has reached the
        // barrier.
        *count_guard += 1;

        // Notify all if this is the last worker to arrive.
        if *count_guard == self.total_workers {
            barrier_condvar.notify_all();
            return;
        }

        // Otherwise, wait for all workers to reach the barrier.
        while *count_guard != self.total_workers {
            count_guard = barrier_condvar
                .wait(count_guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }
}

/// State shared between the pool handle and its worker threads.
struct PoolSharedData {
    /// FIFO queue of pending tasks.
    task_queue: VecDeque<Arc<dyn Task + Send + Sync>>,
    /// Set once on drop; workers exit when they see it.
    shutdown_flag: bool,
    /// Tasks that panicked since the last barrier.
    panicked_tasks: usize,
}

impl PoolSharedData {
    fn new() -> Self {
        PoolSharedData {
            task_queue: VecDeque::with_capacity(128),
            shutdown_flag: false,
            panicked_tasks: 0,
        }
    }
}

/// Fixed-size pool of OS threads fed from a single FIFO queue.
///
/// The reduction coordinator keeps one of these alive across trials when it
/// runs with [`PoolStrategy::Persistent`](crate::config::PoolStrategy), and
/// uses [`StandardPool::barrier`] as the per-trial join.
pub struct StandardPool {
    /// Pool of worker threads.
    worker_threads: Vec<thread::JoinHandle<()>>,
    /// Shared data protected by a mutex.
    shared_data: Arc<Mutex<PoolSharedData>>,
    /// Condition variable to notify workers of new tasks or shutdown.
    task_available: Arc<Condvar>,
}

fn lock_shared(
    shared_data: &Mutex<PoolSharedData>,
) -> MutexGuard<'_, PoolSharedData> {
    match shared_data.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            shared_data.clear_poison();
            poisoned.into_inner()
        }
    }
}

fn worker_loop(
    shared_data: Arc<Mutex<PoolSharedData>>,
    task_available: Arc<Condvar>,
) {
    loop {
        let task = {
            let mut shared_data_guard = lock_shared(&shared_data);

            // Wait until there is a task to process or a shutdown signal.
            while shared_data_guard.task_queue.is_empty()
                && !shared_data_guard.shutdown_flag
            {
                shared_data_guard = task_available
                    .wait(shared_data_guard)
                    .unwrap_or_else(|e| e.into_inner());
            }

            if shared_data_guard.shutdown_flag {
                break;
            }

            match shared_data_guard.task_queue.pop_front() {
                Some(task) => task,
                None => continue,
            }
        };

        // Execute the task outside the lock scope. A panicking task must not
        // take the thread down with it, or the next barrier would never fill.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.execute()));
        if outcome.is_err() {
            log::error!(
                "task panicked on {}",
                thread::current().name().unwrap_or("<unnamed>")
            );
            lock_shared(&shared_data).panicked_tasks += 1;
        }
    }
}

impl StandardPool {
    /// Spawns `thread_count` named worker threads that wait for tasks.
    ///
    /// # Errors
    /// `InvalidWorkerCount` for zero threads, `Spawn` when the OS refuses a
    /// thread. Threads that did start are shut down before returning.
    pub fn new(thread_count: usize) -> Result<Self> {
        if thread_count == 0 {
            return Err(BenchError::InvalidWorkerCount(
                thread_count.to_string(),
            ));
        }

        let mut pool = StandardPool {
            worker_threads: Vec::with_capacity(thread_count),
            shared_data: Arc::new(Mutex::new(PoolSharedData::new())),
            task_available: Arc::new(Condvar::new()),
        };

        for index in 0..thread_count {
            let shared_data = pool.shared_data.clone();
            let task_available = pool.task_available.clone();
            let handle = thread::Builder::new()
                .name(format!("parreduce-worker-{index}"))
                .spawn(move || worker_loop(shared_data, task_available))
                .map_err(BenchError::Spawn)?;
            pool.worker_threads.push(handle);
        }

        log::debug!("started pool with {thread_count} worker threads");
        Ok(pool)
    }

    pub fn thread_count(&self) -> usize {
        self.worker_threads.len()
    }

    /// Adds a task to the queue and wakes one waiting worker.
    pub fn add_task(&self, task: Arc<dyn Task + Send + Sync>) {
        let mut shared_data_guard = lock_shared(&self.shared_data);
        shared_data_guard.task_queue.push_back(task);
        self.task_available.notify_one();
    }

    /// Blocks until every task queued before this call has finished.
    ///
    /// One barrier task per worker is queued behind the pending work. Since
    /// the queue is FIFO and a worker stuck in the barrier cannot dequeue
    /// anything else, all earlier tasks are complete once the caller is
    /// released.
    ///
    /// # Errors
    /// `WorkerPanicked` if any task panicked since the previous barrier.
    pub fn barrier(&self) -> Result<()> {
        let shared_sync_point = Arc::new((Mutex::new(0), Condvar::new()));
        let total_workers = self.worker_threads.len() + 1;

        for _ in 0..total_workers - 1 {
            self.add_task(Arc::new(BarrierTask {
                sync_point: shared_sync_point.clone(),
                total_workers,
            }));
        }

        // The caller takes part through its own barrier task.
        BarrierTask {
            sync_point: shared_sync_point,
            total_workers,
        }
        .execute();

        let count =
            std::mem::take(&mut lock_shared(&self.shared_data).panicked_tasks);
        if count > 0 {
            return Err(BenchError::WorkerPanicked { count });
        }
        Ok(())
    }
}

impl Drop for StandardPool {
    /// Sets the shutdown flag, wakes every worker and joins them.
    fn drop(&mut self) {
        {
            let mut shared_data_guard = lock_shared(&self.shared_data);
            shared_data_guard.shutdown_flag = true;
            self.task_available.notify_all();
        }

        for handle in self.worker_threads.drain(..) {
            let _ = handle.join();
        }
    }
}
