//! Two-phase frame scheduler.
//!
//! The host calls [`Scheduler::poll`] once per phase per tick (`Update`, then
//! `PostUpdate`) and [`Scheduler::teardown`] once when it unhooks. Everything
//! else is the factory surface application code uses to create waits.

use crate::clock::{ClockKind, TimeSource};
use crate::config::SchedulerConfig;
use crate::item::{ItemKind, ItemPool, TimedItem};
use crate::phase::Phase;
use crate::runner::{LoopContext, PhaseRunner};
use frame_task::{Task, TaskPool};
use log::debug;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

struct SchedulerShared {
    config: SchedulerConfig,
    tasks: TaskPool,
    items: RefCell<ItemPool>,
    time: Rc<dyn TimeSource>,
    runners: [PhaseRunner; 2],
}

impl SchedulerShared {
    fn context(&self) -> LoopContext<'_> {
        LoopContext {
            time: &*self.time,
            items: &self.items,
        }
    }

    fn runner(&self, phase: Phase) -> &PhaseRunner {
        &self.runners[phase.index()]
    }
}

/// Owns the `Update` and `PostUpdate` runners plus the pools behind them.
///
/// `Scheduler` is a cheap handle; clones drive the same state, which lets
/// continuations capture it and queue follow-up waits.
#[derive(Clone)]
pub struct Scheduler {
    shared: Rc<SchedulerShared>,
}

impl Scheduler {
    /// Creates a scheduler reading frame time from `time`.
    pub fn new(config: SchedulerConfig, time: Rc<dyn TimeSource>) -> Self {
        debug!(
            "frame scheduler created (pending capacity {}, task cap {}, item cap {})",
            config.pending_capacity, config.tasks.max_free, config.items.max_free
        );
        Self {
            shared: Rc::new(SchedulerShared {
                config,
                tasks: TaskPool::new(config.tasks),
                items: RefCell::new(ItemPool::new(config.items)),
                time,
                runners: [
                    PhaseRunner::new(Phase::Update, config.pending_capacity),
                    PhaseRunner::new(Phase::PostUpdate, config.pending_capacity),
                ],
            }),
        }
    }

    /// Creates a scheduler with default tunables.
    pub fn with_time(time: Rc<dyn TimeSource>) -> Self {
        Self::new(SchedulerConfig::default(), time)
    }

    /// Configuration the scheduler was built with.
    pub fn config(&self) -> SchedulerConfig {
        self.shared.config
    }

    /// Pool that backs every task this scheduler hands out.
    pub fn task_pool(&self) -> &TaskPool {
        &self.shared.tasks
    }

    /// Runner for `phase`.
    pub fn runner(&self, phase: Phase) -> &PhaseRunner {
        self.shared.runner(phase)
    }

    /// Number of items pending in `phase`.
    pub fn pending(&self, phase: Phase) -> usize {
        self.shared.runner(phase).len()
    }

    /// Number of parked items of `kind`.
    pub fn free_items(&self, kind: ItemKind) -> usize {
        self.shared.items.borrow().free_len(kind)
    }

    /// Queues `item` into `phase`; an item that is already done resolves now.
    pub fn add_item(&self, item: Box<TimedItem>, phase: Phase) {
        let shared = &*self.shared;
        shared.runner(phase).add(item, &shared.context());
    }

    /// Advances and resolves `phase`. Returns the number of items resolved.
    pub fn poll(&self, phase: Phase) -> usize {
        let shared = &*self.shared;
        shared.runner(phase).poll(&shared.context())
    }

    /// Forces every pending item in both phases to resolve, then clears the
    /// pending lists and pools. Calling it again is a no-op.
    ///
    /// Both pending lists are taken before anything resolves, so waits queued
    /// by those resolutions are dropped unresolved whichever phase they land
    /// in.
    pub fn teardown(&self) {
        let shared = &*self.shared;
        let cx = shared.context();
        let batches = Phase::ALL.map(|phase| shared.runner(phase).take_pending());
        let resolved: usize = batches
            .into_iter()
            .map(|batch| cx.resolve_all(batch))
            .sum();
        let dropped: usize = shared.runners.iter().map(PhaseRunner::clear).sum();
        shared.items.borrow_mut().clear();
        shared.tasks.clear();
        if resolved > 0 || dropped > 0 {
            debug!("scheduler teardown resolved {resolved} items, dropped {dropped} late ones");
        }
    }

    fn submit(&self, item: TimedItem, phase: Phase) {
        let item = self.shared.items.borrow_mut().acquire(item);
        self.add_item(item, phase);
    }

    fn pooled_task(&self) -> Task {
        Task::from_pool(&self.shared.tasks)
    }

    /// Completes after the next `Update` poll.
    pub fn next_frame(&self) -> Task {
        let task = self.pooled_task();
        self.submit(TimedItem::next_frame(task.clone()), Phase::Update);
        task
    }

    /// Completes on the next `PostUpdate` poll.
    pub fn end_of_frame(&self) -> Task {
        let task = self.pooled_task();
        self.submit(TimedItem::end_of_frame(task.clone()), Phase::PostUpdate);
        task
    }

    /// Completes after `frames` `Update` polls; `frames <= 0` is already
    /// complete on return.
    pub fn delay_frame(&self, frames: i32) -> Task {
        let task = self.pooled_task();
        self.submit(TimedItem::delay_frame(frames, task.clone()), Phase::Update);
        task
    }

    /// Completes once `duration` of frame time has accumulated on `clock`.
    pub fn delay(&self, duration: Duration, clock: ClockKind) -> Task {
        let task = self.pooled_task();
        self.submit(TimedItem::delay(duration, clock, task.clone()), Phase::Update);
        task
    }

    /// Runs `action` once `duration` has accumulated on `clock`.
    pub fn delay_action(
        &self,
        duration: Duration,
        clock: ClockKind,
        action: impl FnOnce() + 'static,
    ) {
        self.submit(TimedItem::delay_action(duration, clock, action), Phase::Update);
    }

    /// Runs `action` after `frames` `Update` polls.
    pub fn delay_frame_action(&self, frames: i32, action: impl FnOnce() + 'static) {
        self.submit(TimedItem::delay_frame_action(frames, action), Phase::Update);
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.shared.config)
            .field("update", &self.pending(Phase::Update))
            .field("post_update", &self.pending(Phase::PostUpdate))
            .finish()
    }
}
