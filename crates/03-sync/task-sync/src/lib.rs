//! Fan-in synchronization over [`Task`](frame_task::Task)s.
//!
//! [`wait_all`] and [`wait_any`] combine many tasks into one `Task<bool>`
//! using a [`CountdownLatch`]. The boolean says whether the wait condition
//! triggered without cancellation, not whether the inputs succeeded.

mod latch;
mod wait;

pub use latch::CountdownLatch;
pub use wait::{wait_all, wait_any};
