//! Deferred task queue.
//!
//! Work that must wait for the host to finish its current turn (a form's
//! native reset, a validation pass) is posted here and runs the next time the
//! host calls [`SharedTaskQueue::process_all`]. Posted tasks cannot be
//! withdrawn; tasks that outlive their owner check liveness themselves.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::logging::targets;

/// A unique identifier for a deferred task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

type BoxedTask = Box<dyn FnOnce() + Send + 'static>;

/// A FIFO queue of deferred tasks.
pub struct TaskQueue {
    tasks: VecDeque<BoxedTask>,
}

impl TaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            tasks: VecDeque::new(),
        }
    }

    /// Post a task to run on the next turn.
    pub fn post<F>(&mut self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = next_task_id();
        self.tasks.push_back(Box::new(task));
        id
    }

    /// Check if there are any pending tasks.
    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Get the number of pending tasks.
    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    fn take_all(&mut self) -> VecDeque<BoxedTask> {
        std::mem::take(&mut self.tasks)
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// A thread-safe task queue shared between a host and its widgets.
///
/// Tasks are executed outside the queue lock, so a running task may post
/// further tasks; those run on the following turn, not the current one.
pub struct SharedTaskQueue {
    inner: Mutex<TaskQueue>,
}

impl SharedTaskQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TaskQueue::new()),
        }
    }

    pub fn post<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.inner.lock().post(task);
        tracing::trace!(target: targets::TASK, task_id = id.as_u64(), "posted deferred task");
        id
    }

    pub fn has_pending(&self) -> bool {
        self.inner.lock().has_pending()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending_count()
    }

    /// Run one scheduler turn: every task pending at the time of the call.
    ///
    /// Returns the number of tasks processed.
    pub fn process_all(&self) -> usize {
        let batch = self.inner.lock().take_all();
        let count = batch.len();
        for task in batch {
            task();
        }
        if count > 0 {
            tracing::trace!(target: targets::TASK, count, "processed deferred tasks");
        }
        count
    }

    /// Run turns until the queue stays empty.
    ///
    /// Returns the total number of tasks processed.
    pub fn drain(&self) -> usize {
        let mut total = 0;
        loop {
            let processed = self.process_all();
            if processed == 0 {
                return total;
            }
            total += processed;
        }
    }
}

impl Default for SharedTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `task` on the next turn of `queue`, or immediately when there is none.
///
/// Hosts without an event loop (tests, headless rendering) still get the
/// work done, just without the deferral.
pub fn defer<F>(queue: Option<&Arc<SharedTaskQueue>>, task: F)
where
    F: FnOnce() + Send + 'static,
{
    match queue {
        Some(queue) => {
            queue.post(task);
        }
        None => {
            tracing::trace!(target: targets::TASK, "no task queue available, executing immediately");
            task();
        }
    }
}
