//! Pending list for one scheduling phase.
//!
//! A poll takes the whole pending list out of its cell before touching any
//! item. Items are advanced and sorted into "still pending" and "ready" in one
//! pass, survivors go back in insertion order, and only then are ready items
//! resolved. Resolution runs user continuations; anything they register lands
//! in the (already restored) pending list and waits for the next poll.

use crate::clock::TimeSource;
use crate::item::{ItemPool, TimedItem};
use crate::phase::Phase;
use std::cell::RefCell;

/// Scheduler state a runner needs while resolving items.
pub(crate) struct LoopContext<'a> {
    pub(crate) time: &'a dyn TimeSource,
    pub(crate) items: &'a RefCell<ItemPool>,
}

impl LoopContext<'_> {
    /// Recycles `item`, then fires its completion with no borrows held.
    pub(crate) fn resolve(&self, mut item: Box<TimedItem>) {
        let completion = item.take_completion();
        self.items.borrow_mut().recycle(item);
        completion.fire();
    }

    /// Resolves `batch` in order and returns how many items it held.
    pub(crate) fn resolve_all(&self, batch: Vec<Box<TimedItem>>) -> usize {
        let resolved = batch.len();
        for item in batch {
            self.resolve(item);
        }
        resolved
    }
}

/// Ordered pending items of one phase.
#[derive(Debug)]
pub struct PhaseRunner {
    phase: Phase,
    pending: RefCell<Vec<Box<TimedItem>>>,
    // Buffers swapped in while a poll runs so steady-state ticks do not allocate.
    spare: RefCell<Vec<Box<TimedItem>>>,
    ready: RefCell<Vec<Box<TimedItem>>>,
}

impl PhaseRunner {
    pub(crate) fn new(phase: Phase, capacity: usize) -> Self {
        Self {
            phase,
            pending: RefCell::new(Vec::with_capacity(capacity)),
            spare: RefCell::new(Vec::with_capacity(capacity)),
            ready: RefCell::new(Vec::with_capacity(capacity)),
        }
    }

    /// Phase this runner serves.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of items waiting for a future poll.
    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Returns `true` when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Queues `item`, or resolves it on the spot if it is already done.
    pub(crate) fn add(&self, item: Box<TimedItem>, cx: &LoopContext<'_>) {
        if item.is_done() {
            cx.resolve(item);
            return;
        }
        self.pending.borrow_mut().push(item);
    }

    /// Runs one poll and returns how many items were resolved.
    pub(crate) fn poll(&self, cx: &LoopContext<'_>) -> usize {
        let mut batch = self.pending.replace(self.spare.take());
        if batch.is_empty() {
            self.spare.replace(batch);
            return 0;
        }

        let mut ready = self.ready.take();
        match self.phase {
            Phase::Update => {
                for item in batch.iter_mut() {
                    item.advance(cx.time);
                }
                let mut pending = self.pending.borrow_mut();
                for item in batch.drain(..) {
                    if item.is_done() {
                        ready.push(item);
                    } else {
                        pending.push(item);
                    }
                }
            }
            Phase::PostUpdate => ready.append(&mut batch),
        }
        self.spare.replace(batch);

        let resolved = ready.len();
        for item in ready.drain(..) {
            cx.resolve(item);
        }
        self.ready.replace(ready);
        resolved
    }

    /// Takes every pending item out without resolving it. Items queued after
    /// this call start a fresh pending list.
    pub(crate) fn take_pending(&self) -> Vec<Box<TimedItem>> {
        self.pending.take()
    }

    /// Drops every pending item without resolving it. Returns how many.
    pub(crate) fn clear(&self) -> usize {
        let late = self.pending.take();
        let dropped = late.len();
        for mut item in late {
            drop(item.take_completion());
        }
        self.spare.take();
        self.ready.take();
        dropped
    }
}
