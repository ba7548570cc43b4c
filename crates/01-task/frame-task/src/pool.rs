//! Free lists that recycle completion cells between frames.
//!
//! Short-lived waits are created and consumed every frame, so the cells behind
//! them are parked in a per-type free list instead of being dropped. A pool is
//! an explicit context object: each scheduler owns one, and tests can build as
//! many independent pools as they like.

use crate::task::TaskCell;
use log::trace;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

/// Default number of parked entries a free list may hold before it is cleared.
pub const DEFAULT_MAX_FREE: usize = 1000;

/// Shape of a free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Upper bound on parked entries; exceeding it drops every parked entry.
    pub max_free: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_free: DEFAULT_MAX_FREE,
        }
    }
}

/// FIFO free list with a retention cap.
///
/// Bursty workloads can park far more entries than steady state needs. Once
/// the list grows past `max_free` it is emptied outright, matching the
/// "release everything" policy hosts expect after a spike.
#[derive(Debug)]
pub struct FreeList<T> {
    entries: VecDeque<T>,
    max_free: usize,
}

impl<T> FreeList<T> {
    /// Creates an empty free list.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            max_free: config.max_free,
        }
    }

    /// Pops the oldest parked entry.
    pub fn take(&mut self) -> Option<T> {
        self.entries.pop_front()
    }

    /// Parks `entry` for reuse, trimming the list if it overflows.
    ///
    /// Returns `true` when the push caused a trim.
    pub fn give(&mut self, entry: T) -> bool {
        self.entries.push_back(entry);
        if self.entries.len() > self.max_free {
            trace!(
                "free list exceeded {} entries; releasing all",
                self.max_free
            );
            self.entries.clear();
            return true;
        }
        false
    }

    /// Number of parked entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is parked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every parked entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub(crate) type CellRef<T> = Rc<RefCell<TaskCell<T>>>;

struct PoolShared {
    config: PoolConfig,
    // TypeId of `T` -> FreeList<CellRef<T>>
    lists: RefCell<HashMap<TypeId, Box<dyn Any>>>,
}

/// Type-keyed pool of task cells.
///
/// Cloning yields another handle to the same pool. Cells hold only a weak
/// reference back, so dropping every handle releases parked cells.
#[derive(Clone)]
pub struct TaskPool {
    shared: Rc<PoolShared>,
}

impl TaskPool {
    /// Creates an empty pool.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            shared: Rc::new(PoolShared {
                config,
                lists: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Returns the configuration the pool was built with.
    pub fn config(&self) -> PoolConfig {
        self.shared.config
    }

    /// Number of parked cells for tasks carrying `T`.
    pub fn free_len<T: 'static>(&self) -> usize {
        self.shared
            .lists
            .borrow()
            .get(&TypeId::of::<T>())
            .and_then(|list| list.downcast_ref::<FreeList<CellRef<T>>>())
            .map_or(0, FreeList::len)
    }

    /// Releases every parked cell of every type.
    pub fn clear(&self) {
        self.shared.lists.borrow_mut().clear();
    }

    pub(crate) fn downgrade(&self) -> WeakPool {
        WeakPool(Rc::downgrade(&self.shared))
    }

    pub(crate) fn take<T: 'static>(&self) -> Option<CellRef<T>> {
        self.shared
            .lists
            .borrow_mut()
            .get_mut(&TypeId::of::<T>())
            .and_then(|list| list.downcast_mut::<FreeList<CellRef<T>>>())
            .and_then(FreeList::take)
    }

    pub(crate) fn recycle<T: 'static>(&self, cell: CellRef<T>) {
        let config = self.shared.config;
        let mut lists = self.shared.lists.borrow_mut();
        let list = lists
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(FreeList::<CellRef<T>>::new(config)));
        if let Some(list) = list.downcast_mut::<FreeList<CellRef<T>>>() {
            list.give(cell);
        }
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskPool")
            .field("config", &self.shared.config)
            .field("types", &self.shared.lists.borrow().len())
            .finish()
    }
}

/// Weak back-reference stored in pooled cells.
#[derive(Clone)]
pub(crate) struct WeakPool(std::rc::Weak<PoolShared>);

impl WeakPool {
    pub(crate) fn upgrade(&self) -> Option<TaskPool> {
        self.0.upgrade().map(|shared| TaskPool { shared })
    }
}
