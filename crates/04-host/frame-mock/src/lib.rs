//! Scripted host for driving a [`Scheduler`] in tests and tools.
//!
//! `MockHost` plays the part of the engine loop: it owns a [`ManualClock`],
//! polls `Update` then `PostUpdate` once per tick, and calls teardown when
//! shut down or dropped.

use frame_loop::{ManualClock, Phase, Scheduler, SchedulerConfig};
use log::trace;
use std::rc::Rc;
use std::time::Duration;

/// Frame delta used when none is given (60 Hz).
pub const DEFAULT_FRAME: Duration = Duration::from_micros(16_667);

/// Items resolved by one tick, per phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Items resolved by the `Update` poll.
    pub update: usize,
    /// Items resolved by the `PostUpdate` poll.
    pub post_update: usize,
}

/// Host loop stand-in that owns the clock and the scheduler.
pub struct MockHost {
    clock: Rc<ManualClock>,
    scheduler: Scheduler,
    frame: u64,
    shut_down: bool,
}

impl MockHost {
    /// Creates a host ticking at [`DEFAULT_FRAME`] with default tunables.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default(), DEFAULT_FRAME)
    }

    /// Creates a host with explicit tunables and frame delta.
    pub fn with_config(config: SchedulerConfig, frame: Duration) -> Self {
        let clock = Rc::new(ManualClock::new(frame));
        let scheduler = Scheduler::new(config, clock.clone());
        Self {
            clock,
            scheduler,
            frame: 0,
            shut_down: false,
        }
    }

    /// Scheduler driven by this host.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Clock the host reports frame time through.
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Number of completed ticks.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Runs one tick: `Update`, then `PostUpdate`.
    pub fn tick(&mut self) -> TickReport {
        let report = TickReport {
            update: self.scheduler.poll(Phase::Update),
            post_update: self.scheduler.poll(Phase::PostUpdate),
        };
        self.frame += 1;
        trace!(
            "tick {} resolved {} update / {} post-update items",
            self.frame,
            report.update,
            report.post_update
        );
        report
    }

    /// Runs `count` ticks.
    pub fn tick_n(&mut self, count: u64) {
        for _ in 0..count {
            self.tick();
        }
    }

    /// Ticks until `done` returns `true`, at most `max_ticks` times. Returns
    /// the number of ticks run, or `None` if the budget ran out.
    pub fn run_until(&mut self, max_ticks: u64, mut done: impl FnMut() -> bool) -> Option<u64> {
        for ran in 0..=max_ticks {
            if done() {
                return Some(ran);
            }
            if ran == max_ticks {
                break;
            }
            self.tick();
        }
        None
    }

    /// Tears the scheduler down once; later calls do nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.scheduler.teardown();
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MockHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}
