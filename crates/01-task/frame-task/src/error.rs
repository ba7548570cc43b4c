//! Error taxonomy for task completion and consumption.
//!
//! Two of the three kinds are programmer defects (`AlreadyCompleted`,
//! `NotReady`). Only `Propagated` is a domain failure: it carries the fault a
//! producer captured with [`Task::set_exception`](crate::Task::set_exception)
//! back to the consuming call site.

use thiserror::Error;

/// Convenience result alias for task operations.
pub type TaskResult<T, E = TaskError> = Result<T, E>;

/// Errors surfaced by [`Task`](crate::Task) producers and consumers.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A producer tried to complete a task that already left `Pending`.
    #[error("task already completed")]
    AlreadyCompleted,

    /// The consumer read the task before it completed.
    #[error("task consumed before completion; await it first")]
    NotReady,

    /// The producer faulted the task; this is the captured error.
    #[error("task faulted: {0:#}")]
    Propagated(anyhow::Error),
}

impl TaskError {
    /// Unwraps the captured fault of a `Propagated` error.
    pub fn into_fault(self) -> Option<anyhow::Error> {
        match self {
            TaskError::Propagated(err) => Some(err),
            _ => None,
        }
    }
}
