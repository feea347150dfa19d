// Copyright 2025 asyncflow contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A deterministic, manually-drained executor for testing scheduling order
//! without depending on a real runtime's timing.

use std::sync::Arc;
use std::time::Duration;

use asyncflow_core::Executor;
use parking_lot::Mutex;

type Task = Box<dyn FnOnce() + Send>;

struct Inner {
    queue: Mutex<Vec<Task>>,
    delayed: Mutex<Vec<(Duration, Task)>>,
}

/// Queues every task instead of running it, so a test can assert on
/// scheduling decisions (inline vs. deferred) before explicitly draining.
#[derive(Clone)]
pub struct RecordingExecutor {
    inner: Arc<Inner>,
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(Vec::new()),
                delayed: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Builds the `Executor` handle tests pass to `subscribe`/`execute`.
    /// `strict_async` controls whether the resulting executor ever allows
    /// inline delivery.
    pub fn executor(&self, strict_async: bool) -> Executor {
        let enqueue = {
            let inner = Arc::clone(&self.inner);
            move |task: Task| inner.queue.lock().push(task)
        };
        let enqueue_after = {
            let inner = Arc::clone(&self.inner);
            move |delay: Duration, task: Task| inner.delayed.lock().push((delay, task))
        };
        Executor::custom(strict_async, enqueue, enqueue_after)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.queue.lock().len()
    }

    pub fn pending_delayed_count(&self) -> usize {
        self.inner.delayed.lock().len()
    }

    /// Runs every task queued so far, in submission order. Tasks queued by
    /// a drained task itself are not run until the next `drain` call.
    pub fn drain(&self) {
        let tasks = std::mem::take(&mut *self.inner.queue.lock());
        for task in tasks {
            task();
        }
    }

    /// Runs every delayed task regardless of its requested delay, useful
    /// for deterministically fast-forwarding timer-backed tests.
    pub fn drain_delayed(&self) {
        let tasks = std::mem::take(&mut *self.inner.delayed.lock());
        for (_delay, task) in tasks {
            task();
        }
    }
}
