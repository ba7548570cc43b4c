//! Pooled completion primitive for frame-ticked applications.
//!
//! [`Task`] is a single-assignment, single-consumer future. Producers complete
//! it once; the consumer registers a continuation (or awaits it) and reads the
//! outcome once. Cells can be drawn from a [`TaskPool`] so thousands of
//! per-frame waits do not churn the allocator.

mod cancel;
mod error;
mod future;
mod pool;
mod task;

pub use cancel::CancelToken;
pub use error::{TaskError, TaskResult};
pub use pool::{FreeList, PoolConfig, TaskPool, DEFAULT_MAX_FREE};
pub use task::{Task, TaskState};
