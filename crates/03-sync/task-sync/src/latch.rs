//! Countdown latch built from tasks.
//!
//! Each arrival decrements the count. The arrival that reaches zero releases
//! the latch and completes every parked waiter; arrivals after that are
//! ignored, so a latch resolves its waiters at most once.

use frame_task::{Task, TaskPool};
use log::trace;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

struct LatchInner {
    remaining: Cell<isize>,
    released: Cell<bool>,
    waiters: RefCell<SmallVec<[Task; 2]>>,
    pool: Option<TaskPool>,
}

/// Single-threaded countdown latch. Clones share one count.
#[derive(Clone)]
pub struct CountdownLatch {
    inner: Rc<LatchInner>,
}

impl CountdownLatch {
    /// Creates a latch that releases after `count` arrivals. Waiter tasks are
    /// drawn from `pool` when one is given. A zero count starts released.
    pub fn new(count: usize, pool: Option<&TaskPool>) -> Self {
        Self {
            inner: Rc::new(LatchInner {
                remaining: Cell::new(isize::try_from(count).unwrap_or(isize::MAX)),
                released: Cell::new(count == 0),
                waiters: RefCell::new(SmallVec::new()),
                pool: pool.cloned(),
            }),
        }
    }

    /// Arrivals still needed before release; negative once overshot.
    pub fn remaining(&self) -> isize {
        self.inner.remaining.get()
    }

    /// Returns `true` once the count reached zero.
    pub fn is_released(&self) -> bool {
        self.inner.released.get()
    }

    /// Records one arrival without waiting.
    pub fn count_down(&self) {
        let remaining = self.inner.remaining.get() - 1;
        self.inner.remaining.set(remaining);
        if remaining <= 0 && !self.inner.released.get() {
            self.release();
        }
    }

    /// Records one arrival and returns a task that completes on release.
    ///
    /// If this arrival releases the latch, or it was already released, the
    /// returned task is already complete.
    pub fn wait(&self) -> Task {
        self.count_down();
        let gate = Task::create(self.inner.pool.as_ref());
        if self.inner.released.get() {
            gate.set_result(());
        } else {
            self.inner.waiters.borrow_mut().push(gate.clone());
        }
        gate
    }

    fn release(&self) {
        self.inner.released.set(true);
        let waiters = std::mem::take(&mut *self.inner.waiters.borrow_mut());
        trace!("latch released; waking {} waiters", waiters.len());
        for waiter in waiters {
            waiter.set_result(());
        }
    }
}

impl fmt::Debug for CountdownLatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownLatch")
            .field("remaining", &self.remaining())
            .field("released", &self.is_released())
            .field("waiters", &self.inner.waiters.borrow().len())
            .finish()
    }
}
