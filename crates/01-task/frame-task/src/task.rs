//! Single-producer/single-consumer completion cell.
//!
//! A [`Task`] moves from `Pending` to exactly one terminal state. The producer
//! completes it with [`Task::set_result`] or [`Task::set_exception`]; the
//! consumer either registers one continuation and later calls
//! [`Task::consume`], or awaits it as a `std::future::Future`.
//!
//! Continuations run synchronously on the completing call. No borrow of the
//! cell is held while user code runs, so a continuation may consume the task,
//! create new tasks, or complete others.

use crate::error::{TaskError, TaskResult};
use crate::pool::{CellRef, TaskPool, WeakPool};
use log::error;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Continuation = Box<dyn FnOnce()>;

/// Completion state of a [`Task`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// The producer has not completed the task yet.
    Pending,
    /// Completed with a value.
    Succeeded,
    /// Completed with a captured fault.
    Faulted,
}

impl TaskState {
    /// Returns `true` once the task left `Pending`.
    pub fn is_completed(self) -> bool {
        !matches!(self, TaskState::Pending)
    }
}

pub(crate) struct TaskCell<T> {
    state: TaskState,
    continuation: Option<Continuation>,
    value: Option<T>,
    fault: Option<anyhow::Error>,
    home: Option<WeakPool>,
}

impl<T> TaskCell<T> {
    fn new(home: Option<WeakPool>) -> Self {
        Self {
            state: TaskState::Pending,
            continuation: None,
            value: None,
            fault: None,
            home,
        }
    }

    fn reset(&mut self) {
        self.state = TaskState::Pending;
        self.continuation = None;
        self.value = None;
        self.fault = None;
    }
}

/// Frame-friendly future with an optional pooled backing cell.
///
/// `Task` is a cheap handle; clones share the same cell. Producers and the
/// single consumer each hold one. Once the consumer reads the outcome the cell
/// is reset, and if it came from a [`TaskPool`] it is parked for reuse. Any
/// handle kept past that point may observe a later, unrelated use of the cell.
pub struct Task<T = ()> {
    cell: CellRef<T>,
}

impl<T: 'static> Task<T> {
    /// Allocates a fresh, unpooled task.
    pub fn new() -> Self {
        Self {
            cell: Rc::new(RefCell::new(TaskCell::new(None))),
        }
    }

    /// Draws a task from `pool`, allocating when nothing is parked.
    pub fn from_pool(pool: &TaskPool) -> Self {
        let cell = pool
            .take::<T>()
            .unwrap_or_else(|| Rc::new(RefCell::new(TaskCell::new(Some(pool.downgrade())))));
        Self { cell }
    }

    /// Creates a task, pooled when a pool is supplied.
    pub fn create(pool: Option<&TaskPool>) -> Self {
        match pool {
            Some(pool) => Self::from_pool(pool),
            None => Self::new(),
        }
    }

    /// Returns an unpooled task that already succeeded with `value`.
    pub fn completed(value: T) -> Self {
        let task = Self::new();
        {
            let mut cell = task.cell.borrow_mut();
            cell.state = TaskState::Succeeded;
            cell.value = Some(value);
        }
        task
    }

    /// Returns an unpooled task that already faulted with `err`.
    pub fn faulted(err: impl Into<anyhow::Error>) -> Self {
        let task = Self::new();
        {
            let mut cell = task.cell.borrow_mut();
            cell.state = TaskState::Faulted;
            cell.fault = Some(err.into());
        }
        task
    }

    /// Current state.
    pub fn state(&self) -> TaskState {
        self.cell.borrow().state
    }

    /// Returns `true` once the task left `Pending`.
    pub fn is_completed(&self) -> bool {
        self.state().is_completed()
    }

    /// Returns `true` if the backing cell belongs to a pool.
    pub fn is_pooled(&self) -> bool {
        self.cell.borrow().home.is_some()
    }

    /// Returns `true` if both handles share one cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    /// Completes the task with `value` and runs the continuation, if any.
    pub fn try_set_result(&self, value: T) -> TaskResult<()> {
        self.finish(Ok(value))
    }

    /// Faults the task with `err` and runs the continuation, if any.
    pub fn try_set_exception(&self, err: impl Into<anyhow::Error>) -> TaskResult<()> {
        self.finish(Err(err.into()))
    }

    /// Completes the task with `value`.
    ///
    /// # Panics
    ///
    /// Panics if the task already completed.
    pub fn set_result(&self, value: T) {
        if let Err(err) = self.try_set_result(value) {
            panic!("{err}");
        }
    }

    /// Faults the task with `err`.
    ///
    /// # Panics
    ///
    /// Panics if the task already completed.
    pub fn set_exception(&self, err: impl Into<anyhow::Error>) {
        if let Err(err) = self.try_set_exception(err) {
            panic!("{err}");
        }
    }

    fn finish(&self, outcome: Result<T, anyhow::Error>) -> TaskResult<()> {
        let continuation = {
            let mut cell = self.cell.borrow_mut();
            if cell.state.is_completed() {
                return Err(TaskError::AlreadyCompleted);
            }
            match outcome {
                Ok(value) => {
                    cell.state = TaskState::Succeeded;
                    cell.value = Some(value);
                }
                Err(err) => {
                    cell.state = TaskState::Faulted;
                    cell.fault = Some(err);
                }
            }
            cell.continuation.take()
        };
        if let Some(continuation) = continuation {
            continuation();
        }
        Ok(())
    }

    /// Registers the single continuation.
    ///
    /// A completed task runs `continuation` before this returns. Otherwise it
    /// is stored, replacing any continuation registered earlier; a task has
    /// one consumer, so two live registrations are a caller bug.
    pub fn on_completed(&self, continuation: impl FnOnce() + 'static) {
        let mut cell = self.cell.borrow_mut();
        if cell.state.is_completed() {
            drop(cell);
            continuation();
            return;
        }
        cell.continuation = Some(Box::new(continuation));
    }

    /// Reads the outcome exactly once and recycles the cell.
    ///
    /// Fails with [`TaskError::NotReady`] while pending and with
    /// [`TaskError::Propagated`] if the producer faulted the task.
    pub fn consume(self) -> TaskResult<T> {
        self.take_outcome()
    }

    pub(crate) fn take_outcome(&self) -> TaskResult<T> {
        let (outcome, home) = {
            let mut cell = self.cell.borrow_mut();
            let outcome = match cell.state {
                TaskState::Pending => return Err(TaskError::NotReady),
                TaskState::Succeeded => cell.value.take().ok_or(TaskError::NotReady),
                TaskState::Faulted => Err(cell
                    .fault
                    .take()
                    .map_or(TaskError::NotReady, TaskError::Propagated)),
            };
            cell.reset();
            (outcome, cell.home.clone())
        };
        if let Some(pool) = home.and_then(|home| home.upgrade()) {
            pool.recycle(Rc::clone(&self.cell));
        }
        outcome
    }

    /// Continuation-passing await: hands the consumed outcome to `f` once the
    /// task completes (immediately if it already has).
    ///
    /// The stored continuation only holds the cell weakly, so a task that is
    /// dropped without completing releases `f` and whatever it captured.
    pub fn then(self, f: impl FnOnce(TaskResult<T>) + 'static) {
        let cell = Rc::downgrade(&self.cell);
        self.on_completed(move || {
            if let Some(cell) = cell.upgrade() {
                f(Task { cell }.consume());
            }
        });
    }

    /// Consumes the task when it completes, discarding the value.
    ///
    /// A fault nobody observed is logged at error level.
    pub fn detach(self) {
        self.detach_with(|err| error!("unobserved task fault: {err:#}"));
    }

    /// Consumes the task when it completes and routes a fault to `handler`.
    pub fn detach_with(self, handler: impl FnOnce(anyhow::Error) + 'static) {
        self.then(move |outcome| match outcome {
            Ok(_) => {}
            Err(TaskError::Propagated(err)) => handler(err),
            Err(err) => handler(err.into()),
        });
    }
}

impl<T: 'static> Default for Task<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.try_borrow() {
            Ok(cell) => f
                .debug_struct("Task")
                .field("state", &cell.state)
                .field("pooled", &cell.home.is_some())
                .field("has_continuation", &cell.continuation.is_some())
                .finish(),
            Err(_) => f.write_str("Task { <borrowed> }"),
        }
    }
}
