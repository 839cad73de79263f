//! Microtask queues.
//!
//! The update flush and the async tail of `connected_callback` are deferred
//! to a microtask. [`TaskQueue`] is the seam: [`LocalTaskQueue`] hands tasks
//! to tokio's `spawn_local` (so it must run inside a
//! [`LocalSet`](tokio::task::LocalSet)), [`ManualTaskQueue`] parks them on a
//! `futures` [`LocalPool`] until [`ManualTaskQueue::run_until_idle`] drives
//! it, which makes the whole lifecycle deterministic in tests.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
use tracing::warn;

/// A unit of deferred work.
pub type Task = Pin<Box<dyn Future<Output = ()>>>;

/// Something that can run deferred, single-threaded tasks.
pub trait TaskQueue {
    /// Queue `task` to run after the current synchronous turn completes.
    fn spawn(&self, task: Task);
}

// ---------------------------------------------------------------------------
// LocalTaskQueue
// ---------------------------------------------------------------------------

/// Queue backed by [`tokio::task::spawn_local`].
///
/// # Panics
///
/// `spawn` panics when called outside a `LocalSet`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalTaskQueue;

impl TaskQueue for LocalTaskQueue {
    fn spawn(&self, task: Task) {
        drop(tokio::task::spawn_local(task));
    }
}

// ---------------------------------------------------------------------------
// ManualTaskQueue
// ---------------------------------------------------------------------------

/// Task counters shared by the queue and the tasks it wraps.
#[derive(Debug, Default)]
struct Counters {
    pending: Cell<usize>,
    finished: Cell<usize>,
}

/// Deterministic in-process queue over a single-threaded [`LocalPool`].
///
/// Nothing runs until [`run_until_idle`](Self::run_until_idle) is called.
/// Cloning shares the queue.
#[derive(Clone)]
pub struct ManualTaskQueue {
    pool: Rc<RefCell<LocalPool>>,
    spawner: LocalSpawner,
    counters: Rc<Counters>,
}

impl Default for ManualTaskQueue {
    fn default() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            pool: Rc::new(RefCell::new(pool)),
            spawner,
            counters: Rc::default(),
        }
    }
}

impl ManualTaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run tasks until every remaining one is stalled. Returns how many
    /// tasks finished during this call.
    ///
    /// Tasks spawned while draining run in the same call. Tasks waiting on
    /// something that never wakes them stay pending.
    ///
    /// # Panics
    ///
    /// Panics when called from inside one of the queue's own tasks.
    pub fn run_until_idle(&self) -> usize {
        let before = self.counters.finished.get();
        self.pool.borrow_mut().run_until_stalled();
        self.counters.finished.get() - before
    }

    /// Number of spawned tasks that have not finished.
    pub fn pending_count(&self) -> usize {
        self.counters.pending.get()
    }

    /// Whether every spawned task has finished.
    pub fn is_idle(&self) -> bool {
        self.pending_count() == 0
    }
}

impl TaskQueue for ManualTaskQueue {
    fn spawn(&self, task: Task) {
        let counters = self.counters.clone();
        counters.pending.set(counters.pending.get() + 1);
        let tracked = {
            let counters = counters.clone();
            async move {
                task.await;
                counters.pending.set(counters.pending.get() - 1);
                counters.finished.set(counters.finished.get() + 1);
            }
        };
        if let Err(err) = self.spawner.spawn_local(tracked) {
            counters.pending.set(counters.pending.get() - 1);
            warn!(error = %err, "manual task queue rejected a task");
        }
    }
}

impl fmt::Debug for ManualTaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTaskQueue")
            .field("pending", &self.counters.pending.get())
            .field("finished", &self.counters.finished.get())
            .finish()
    }
}
