//! Timed items: the pending work a phase runner advances each tick.
//!
//! Every variant is one arm of a closed enum; [`TimedItem::advance`] and
//! [`TimedItem::take_completion`] dispatch over it with a single match. Items
//! that complete a [`Task`] hand it off on resolution; action items just run
//! their callback.

use crate::clock::{ClockKind, TimeSource};
use frame_task::{FreeList, PoolConfig, Task};
use log::trace;
use std::fmt;
use std::time::Duration;

type Action = Box<dyn FnOnce()>;

/// Variant tag, also the key of the item free lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// [`TimedItem::next_frame`].
    NextFrame,
    /// [`TimedItem::end_of_frame`].
    EndOfFrame,
    /// [`TimedItem::delay_frame`].
    DelayFrame,
    /// [`TimedItem::delay`].
    Delay,
    /// [`TimedItem::delay_action`].
    DelayAction,
    /// [`TimedItem::delay_frame_action`].
    DelayFrameAction,
}

impl ItemKind {
    /// Every kind, in index order.
    pub const ALL: [ItemKind; 6] = [
        ItemKind::NextFrame,
        ItemKind::EndOfFrame,
        ItemKind::DelayFrame,
        ItemKind::Delay,
        ItemKind::DelayAction,
        ItemKind::DelayFrameAction,
    ];

    fn index(self) -> usize {
        match self {
            ItemKind::NextFrame => 0,
            ItemKind::EndOfFrame => 1,
            ItemKind::DelayFrame => 2,
            ItemKind::Delay => 3,
            ItemKind::DelayAction => 4,
            ItemKind::DelayFrameAction => 5,
        }
    }
}

enum ItemBody {
    NextFrame {
        task: Option<Task>,
    },
    EndOfFrame {
        task: Option<Task>,
    },
    DelayFrame {
        remaining: i32,
        task: Option<Task>,
    },
    Delay {
        duration: Duration,
        elapsed: Duration,
        clock: ClockKind,
        task: Option<Task>,
    },
    DelayAction {
        duration: Duration,
        elapsed: Duration,
        clock: ClockKind,
        action: Option<Action>,
    },
    DelayFrameAction {
        remaining: i32,
        action: Option<Action>,
    },
}

/// What resolving an item does.
pub(crate) enum Completion {
    Task(Task),
    Action(Action),
    Nothing,
}

impl Completion {
    pub(crate) fn fire(self) {
        match self {
            Completion::Task(task) => task.set_result(()),
            Completion::Action(action) => action(),
            Completion::Nothing => {}
        }
    }
}

/// A pending timer or barrier.
pub struct TimedItem {
    body: ItemBody,
    done: bool,
}

impl TimedItem {
    /// Done after one `Update` poll.
    pub fn next_frame(task: Task) -> Self {
        Self::with_body(ItemBody::NextFrame { task: Some(task) })
    }

    /// Resolved by the first `PostUpdate` poll after registration.
    pub fn end_of_frame(task: Task) -> Self {
        Self::with_body(ItemBody::EndOfFrame { task: Some(task) })
    }

    /// Done after `frames` `Update` polls; `frames <= 0` is done immediately.
    pub fn delay_frame(frames: i32, task: Task) -> Self {
        Self::with_body(ItemBody::DelayFrame {
            remaining: frames,
            task: Some(task),
        })
    }

    /// Done once `duration` has accumulated on `clock`.
    pub fn delay(duration: Duration, clock: ClockKind, task: Task) -> Self {
        Self::with_body(ItemBody::Delay {
            duration,
            elapsed: Duration::ZERO,
            clock,
            task: Some(task),
        })
    }

    /// Runs `action` once `duration` has accumulated on `clock`.
    pub fn delay_action(
        duration: Duration,
        clock: ClockKind,
        action: impl FnOnce() + 'static,
    ) -> Self {
        Self::with_body(ItemBody::DelayAction {
            duration,
            elapsed: Duration::ZERO,
            clock,
            action: Some(Box::new(action)),
        })
    }

    /// Runs `action` after `frames` `Update` polls.
    pub fn delay_frame_action(frames: i32, action: impl FnOnce() + 'static) -> Self {
        Self::with_body(ItemBody::DelayFrameAction {
            remaining: frames,
            action: Some(Box::new(action)),
        })
    }

    fn with_body(body: ItemBody) -> Self {
        let mut item = Self { body, done: false };
        item.normalize();
        item
    }

    // Zero or negative counts mean "already elapsed".
    fn normalize(&mut self) {
        self.done = match &self.body {
            ItemBody::DelayFrame { remaining, .. }
            | ItemBody::DelayFrameAction { remaining, .. } => {
                if *remaining < 0 {
                    trace!("negative frame delay {remaining} treated as elapsed");
                }
                *remaining <= 0
            }
            ItemBody::Delay { duration, .. } | ItemBody::DelayAction { duration, .. } => {
                duration.is_zero()
            }
            ItemBody::NextFrame { .. } | ItemBody::EndOfFrame { .. } => false,
        };
    }

    /// Variant tag.
    pub fn kind(&self) -> ItemKind {
        match self.body {
            ItemBody::NextFrame { .. } => ItemKind::NextFrame,
            ItemBody::EndOfFrame { .. } => ItemKind::EndOfFrame,
            ItemBody::DelayFrame { .. } => ItemKind::DelayFrame,
            ItemBody::Delay { .. } => ItemKind::Delay,
            ItemBody::DelayAction { .. } => ItemKind::DelayAction,
            ItemBody::DelayFrameAction { .. } => ItemKind::DelayFrameAction,
        }
    }

    /// Returns `true` once the item's completion condition holds.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Advances the item by one `Update` tick.
    pub fn advance(&mut self, time: &dyn TimeSource) {
        match &mut self.body {
            ItemBody::NextFrame { .. } | ItemBody::EndOfFrame { .. } => self.done = true,
            ItemBody::DelayFrame { remaining, .. }
            | ItemBody::DelayFrameAction { remaining, .. } => {
                if *remaining > 0 {
                    *remaining -= 1;
                }
                if *remaining <= 0 {
                    self.done = true;
                }
            }
            ItemBody::Delay {
                duration,
                elapsed,
                clock,
                ..
            }
            | ItemBody::DelayAction {
                duration,
                elapsed,
                clock,
                ..
            } => {
                if *elapsed < *duration {
                    *elapsed = elapsed.saturating_add(time.frame_delta(*clock));
                }
                if *elapsed >= *duration {
                    self.done = true;
                }
            }
        }
    }

    /// Detaches the task or action so the item can be recycled before user
    /// code runs.
    pub(crate) fn take_completion(&mut self) -> Completion {
        match &mut self.body {
            ItemBody::NextFrame { task }
            | ItemBody::EndOfFrame { task }
            | ItemBody::DelayFrame { task, .. }
            | ItemBody::Delay { task, .. } => {
                task.take().map_or(Completion::Nothing, Completion::Task)
            }
            ItemBody::DelayAction { action, .. } | ItemBody::DelayFrameAction { action, .. } => {
                action.take().map_or(Completion::Nothing, Completion::Action)
            }
        }
    }

    fn reuse(&mut self, body: ItemBody) {
        self.body = body;
        self.normalize();
    }
}

impl fmt::Debug for TimedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedItem")
            .field("kind", &self.kind())
            .field("done", &self.done)
            .finish()
    }
}

/// Per-kind free lists of boxed items.
#[derive(Debug)]
pub struct ItemPool {
    lists: [FreeList<Box<TimedItem>>; 6],
}

impl ItemPool {
    /// Creates empty free lists sharing one retention cap.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            lists: std::array::from_fn(|_| FreeList::new(config)),
        }
    }

    /// Number of parked items of `kind`.
    pub fn free_len(&self, kind: ItemKind) -> usize {
        self.lists[kind.index()].len()
    }

    /// Drops every parked item.
    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }

    /// Reuses a parked item of the same kind as `item`, or boxes `item`.
    pub fn acquire(&mut self, item: TimedItem) -> Box<TimedItem> {
        match self.lists[item.kind().index()].take() {
            Some(mut parked) => {
                parked.reuse(item.body);
                parked
            }
            None => Box::new(item),
        }
    }

    /// Parks a resolved item. Any task or action still attached is dropped.
    pub fn recycle(&mut self, mut item: Box<TimedItem>) {
        drop(item.take_completion());
        item.done = false;
        let kind = item.kind();
        self.lists[kind.index()].give(item);
    }
}
