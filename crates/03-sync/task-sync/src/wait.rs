//! Fan-in combinators over tasks.
//!
//! Both combinators seed a [`CountdownLatch`] with one extra arrival that the
//! combinator itself makes after every watcher is registered. A task that is
//! already complete fires its watcher during registration, and the extra count
//! keeps the latch from releasing before the last watcher is in place.
//!
//! Watchers take each task's continuation slot and only observe completion;
//! they never consume the task. A faulted task counts as complete, and its
//! fault stays in the task for whoever consumes it.

use crate::latch::CountdownLatch;
use frame_task::{CancelToken, Task, TaskPool};

/// Resolves `true` once every task completed, or `false` if `cancel` was
/// cancelled by then. An empty slice resolves `false` immediately.
///
/// Each input's single continuation slot is taken by a watcher, replacing
/// anything registered there before. Registering on an input afterwards
/// (including awaiting it while pending) evicts the watcher, and the combined
/// task then never resolves. Consume the inputs once the combined task has
/// resolved.
pub fn wait_all<T: 'static>(
    tasks: &[Task<T>],
    cancel: Option<&CancelToken>,
    pool: Option<&TaskPool>,
) -> Task<bool> {
    wait_for(tasks, tasks.len() + 1, cancel, pool)
}

/// Resolves `true` once the first task completed, or `false` if `cancel` was
/// cancelled by then. An empty slice resolves `false` immediately.
///
/// Inputs' continuation slots are taken the same way as in [`wait_all`].
pub fn wait_any<T: 'static>(
    tasks: &[Task<T>],
    cancel: Option<&CancelToken>,
    pool: Option<&TaskPool>,
) -> Task<bool> {
    wait_for(tasks, 2, cancel, pool)
}

fn wait_for<T: 'static>(
    tasks: &[Task<T>],
    arrivals: usize,
    cancel: Option<&CancelToken>,
    pool: Option<&TaskPool>,
) -> Task<bool> {
    let combined = Task::create(pool);
    if tasks.is_empty() {
        combined.set_result(false);
        return combined;
    }

    let latch = CountdownLatch::new(arrivals, pool);
    for task in tasks {
        let latch = latch.clone();
        task.on_completed(move || latch.count_down());
    }

    let cancel = cancel.cloned();
    let done = combined.clone();
    latch.wait().then(move |released| {
        debug_assert!(released.is_ok(), "latch gates never fault");
        let cancelled = cancel.is_some_and(|token| token.is_cancelled());
        done.set_result(!cancelled);
    });
    combined
}
