// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};
use std::sync::{Arc, Mutex};

use parreduce::pools::standardpool::Task;

/// Task that increments a shared counter protected by a mutex.
pub struct SharedCounterTask {
    /// Thread-safe counter variable protected by a mutex.
    counter: Arc<Mutex<u32>>,
}

impl SharedCounterTask {
    /// Creates a new SharedCounterTask with the given counter.
    pub fn new(counter: Arc<Mutex<u32>>) -> Self {
        SharedCounterTask { counter }
    }
}

impl Task for SharedCounterTask {
    fn execute(&self) {
        let mut counter_guard = self.counter.lock().unwrap();
        *counter_guard += 1;
    }
}

/// Task that panics on every `every`-th execution and counts the rest.
pub struct FlakyTask {
    executions: Arc<AtomicUsize>,
    completed: Arc<AtomicUsize>,
    every: usize,
}

impl FlakyTask {
    pub fn new(
        executions: Arc<AtomicUsize>,
        completed: Arc<AtomicUsize>,
        every: usize,
    ) -> Self {
        FlakyTask {
            executions,
            completed,
            every,
        }
    }
}

impl Task for FlakyTask {
    fn execute(&self) {
        let run = self.executions.fetch_add(1, SeqCst) + 1;
        if run % self.every == 0 {
            panic!("flaky task failed on execution {run}");
        }
        self.completed.fetch_add(1, SeqCst);
    }
}
