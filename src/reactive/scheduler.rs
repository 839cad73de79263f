//! Microtask-batched update scheduling.
//!
//! [`UpdateScheduler`] is a two-state machine (idle / pending). Any number
//! of synchronous [`schedule`](UpdateScheduler::schedule) calls coalesce into
//! one flush on the task queue. A flush that schedules again (re-entrant)
//! runs in a fresh task; callers already awaiting
//! [`update_complete`](UpdateScheduler::update_complete) are carried over and
//! observe the result of the final flush in the chain. A recursion ceiling
//! stops runaway chains and resolves them with `false`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::task::TaskQueue;

/// The flush callback. Returns whether the flush succeeded.
pub type PerformUpdate = Rc<dyn Fn() -> bool>;

// ---------------------------------------------------------------------------
// UpdateComplete
// ---------------------------------------------------------------------------

/// Future returned by [`UpdateScheduler::update_complete`].
///
/// Resolves to `true` when the flush (chain) succeeded, `false` when it
/// failed or hit the recursion ceiling.
#[derive(Debug)]
pub struct UpdateComplete {
    state: CompleteState,
}

#[derive(Debug)]
enum CompleteState {
    Settled(bool),
    Waiting(oneshot::Receiver<bool>),
}

impl UpdateComplete {
    fn settled(result: bool) -> Self {
        Self {
            state: CompleteState::Settled(result),
        }
    }
}

impl Future for UpdateComplete {
    type Output = bool;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        match &mut self.get_mut().state {
            CompleteState::Settled(result) => Poll::Ready(*result),
            // A dropped scheduler never settles; report that as failure.
            CompleteState::Waiting(rx) => Pin::new(rx).poll(cx).map(|r| r.unwrap_or(false)),
        }
    }
}

// ---------------------------------------------------------------------------
// UpdateScheduler
// ---------------------------------------------------------------------------

struct SchedulerState {
    queue: Rc<dyn TaskQueue>,
    perform: PerformUpdate,
    max_recursion: usize,
    /// A flush task is queued and has not started yet.
    pending: Cell<bool>,
    /// `perform` is running.
    flushing: Cell<bool>,
    /// Consecutive re-entrant flushes in the current chain.
    depth: Cell<usize>,
    /// Result of the last settled chain.
    last_result: Cell<bool>,
    /// Total flushes that invoked `perform`.
    flush_count: Cell<u64>,
    waiters: RefCell<Vec<oneshot::Sender<bool>>>,
}

/// Coalescing update scheduler. Cloning shares the scheduler.
#[derive(Clone)]
pub struct UpdateScheduler {
    state: Rc<SchedulerState>,
}

impl UpdateScheduler {
    /// Create an idle scheduler that runs `perform` on `queue`.
    pub fn new(
        queue: Rc<dyn TaskQueue>,
        max_recursion: usize,
        perform: impl Fn() -> bool + 'static,
    ) -> Self {
        Self {
            state: Rc::new(SchedulerState {
                queue,
                perform: Rc::new(perform),
                max_recursion,
                pending: Cell::new(false),
                flushing: Cell::new(false),
                depth: Cell::new(0),
                last_result: Cell::new(true),
                flush_count: Cell::new(0),
                waiters: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Request a flush. No-op while one is already pending.
    pub fn schedule(&self) {
        let state = &self.state;
        if state.pending.replace(true) {
            return;
        }
        let weak: Weak<SchedulerState> = Rc::downgrade(state);
        state.queue.spawn(Box::pin(async move {
            if let Some(state) = weak.upgrade() {
                state.flush();
            }
        }));
    }

    /// Future resolving once the pending flush (chain) settles.
    ///
    /// When idle, resolves immediately with the last chain's result.
    pub fn update_complete(&self) -> UpdateComplete {
        let state = &self.state;
        if !state.pending.get() && !state.flushing.get() {
            return UpdateComplete::settled(state.last_result.get());
        }
        let (tx, rx) = oneshot::channel();
        state.waiters.borrow_mut().push(tx);
        UpdateComplete {
            state: CompleteState::Waiting(rx),
        }
    }

    /// Whether a flush is queued.
    pub fn is_pending(&self) -> bool {
        self.state.pending.get()
    }

    /// Whether the flush callback is currently running.
    pub fn is_flushing(&self) -> bool {
        self.state.flushing.get()
    }

    /// Number of flushes that have invoked the callback.
    pub fn flush_count(&self) -> u64 {
        self.state.flush_count.get()
    }
}

impl SchedulerState {
    fn flush(&self) {
        self.pending.set(false);
        let depth = self.depth.get() + 1;
        if depth > self.max_recursion {
            warn!(
                max = self.max_recursion,
                "update recursion ceiling reached; abandoning re-entrant flush chain"
            );
            self.depth.set(0);
            self.settle(false);
            return;
        }
        self.depth.set(depth);

        self.flushing.set(true);
        self.flush_count.set(self.flush_count.get() + 1);
        let perform = self.perform.clone();
        let ok = perform();
        self.flushing.set(false);

        if self.pending.get() {
            // Re-entrant schedule: waiters ride along to the next flush.
            debug!(depth, "flush rescheduled itself");
            return;
        }
        self.depth.set(0);
        self.settle(ok);
    }

    fn settle(&self, result: bool) {
        self.last_result.set(result);
        let waiters = std::mem::take(&mut *self.waiters.borrow_mut());
        for tx in waiters {
            let _ = tx.send(result);
        }
    }
}

impl fmt::Debug for UpdateScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = &self.state;
        f.debug_struct("UpdateScheduler")
            .field("pending", &state.pending.get())
            .field("flushing", &state.flushing.get())
            .field("depth", &state.depth.get())
            .field("max_recursion", &state.max_recursion)
            .field("waiters", &state.waiters.borrow().len())
            .finish()
    }
}
