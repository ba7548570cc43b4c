//! Frame-phase scheduler for pooled [`Task`](frame_task::Task) waits.
//!
//! A host ticks the [`Scheduler`] once per phase per frame. Timed items
//! (next-frame, end-of-frame, frame and time delays, and their fire-and-forget
//! action forms) are advanced on `Update` and resolved in insertion order;
//! resolving an item completes its task, which runs the waiting continuation
//! inline.

mod clock;
mod config;
mod item;
mod phase;
mod runner;
mod scheduler;

pub use clock::{ClockKind, ManualClock, TimeSource};
pub use config::{SchedulerConfig, DEFAULT_PENDING_CAPACITY};
pub use item::{ItemKind, ItemPool, TimedItem};
pub use phase::Phase;
pub use runner::PhaseRunner;
pub use scheduler::Scheduler;
