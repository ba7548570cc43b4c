//! Frame timing sanity across full host ticks.

use crate::init_logging;
use frame_loop::{ClockKind, Phase};
use frame_mock::MockHost;
use frame_task::TaskState;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[test]
fn waits_resolve_on_the_expected_tick() {
    init_logging();
    let mut host = MockHost::with_config(Default::default(), Duration::from_millis(10));
    let sched = host.scheduler().clone();

    let next = sched.next_frame();
    let barrier = sched.end_of_frame();
    let three = sched.delay_frame(3);
    let timed = sched.delay(Duration::from_millis(25), ClockKind::Scaled);

    host.tick();
    assert!(next.is_completed());
    assert!(barrier.is_completed());
    assert!(!three.is_completed());
    assert!(!timed.is_completed());

    host.tick();
    assert!(!three.is_completed());
    assert!(!timed.is_completed(), "20ms < 25ms");

    host.tick();
    assert!(three.is_completed());
    assert!(timed.is_completed(), "30ms >= 25ms");
    assert_eq!(sched.pending(Phase::Update), 0);
}

/// A per-frame loop written as chained continuations: each step queues the
/// next one, so exactly one step runs per tick.
#[test]
fn chained_steps_advance_one_per_tick() {
    init_logging();
    let mut host = MockHost::new();
    let steps = Rc::new(RefCell::new(Vec::new()));

    fn step(sched: frame_loop::Scheduler, steps: Rc<RefCell<Vec<u64>>>, n: u64) {
        if n == 5 {
            return;
        }
        let next = sched.clone();
        sched.next_frame().then(move |outcome| {
            outcome.expect("frame");
            steps.borrow_mut().push(n);
            step(next, steps, n + 1);
        });
    }

    step(host.scheduler().clone(), Rc::clone(&steps), 0);
    for tick in 1..=5u64 {
        host.tick();
        assert_eq!(steps.borrow().len() as u64, tick);
    }
    host.tick();
    assert_eq!(*steps.borrow(), vec![0, 1, 2, 3, 4]);
}

/// Barrier created by an update continuation lands on that tick's post-update.
#[test]
fn end_of_frame_follows_update_within_one_tick() {
    init_logging();
    let mut host = MockHost::new();
    let sched = host.scheduler().clone();
    let states = Rc::new(RefCell::new(Vec::new()));

    let inner = sched.clone();
    let states_in = Rc::clone(&states);
    sched.next_frame().then(move |_| {
        let barrier = inner.end_of_frame();
        states_in.borrow_mut().push(barrier.state());
        let states_in = Rc::clone(&states_in);
        let observed = barrier.clone();
        barrier.on_completed(move || states_in.borrow_mut().push(observed.state()));
    });

    let report = host.tick();
    assert_eq!(report.update, 1);
    assert_eq!(report.post_update, 1);
    assert_eq!(
        *states.borrow(),
        vec![TaskState::Pending, TaskState::Succeeded]
    );
}
