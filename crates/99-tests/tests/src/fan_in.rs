//! Combinators over scheduler-driven waits.

use crate::init_logging;
use frame_mock::MockHost;
use frame_task::CancelToken;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::cell::Cell;
use std::rc::Rc;
use task_sync::{wait_all, wait_any};

#[test]
fn wait_all_over_random_frame_delays_resolves_on_longest() {
    init_logging();
    let mut rng = StdRng::seed_from_u64(7);
    let mut host = MockHost::new();
    let sched = host.scheduler().clone();

    for _ in 0..10 {
        let delays: Vec<i32> = (0..8).map(|_| rng.gen_range(1..=12)).collect();
        let longest = *delays.iter().max().expect("non-empty");
        let waits: Vec<_> = delays.iter().map(|&n| sched.delay_frame(n)).collect();
        let all = wait_all(&waits, None, Some(sched.task_pool()));

        let ticks = host
            .run_until(20, || all.is_completed())
            .expect("wait_all resolved");
        assert_eq!(ticks as i32, longest, "delays {delays:?}");
        assert!(all.consume().expect("all"));
        for wait in waits {
            wait.consume().expect("frame delay");
        }
    }
}

#[test]
fn wait_any_resolves_on_shortest() {
    init_logging();
    let mut host = MockHost::new();
    let sched = host.scheduler().clone();
    let waits = [sched.delay_frame(5), sched.delay_frame(2), sched.delay_frame(9)];
    let any = wait_any(&waits, None, None);
    assert_eq!(host.run_until(20, || any.is_completed()), Some(2));
    host.tick_n(10);
    assert!(waits.iter().all(|wait| wait.is_completed()));
    assert!(any.consume().expect("any"));
}

/// Cancellation is read when the latch releases, not when it is requested.
#[test]
fn cancel_token_is_advisory() {
    init_logging();
    let mut host = MockHost::new();
    let sched = host.scheduler().clone();
    let token = CancelToken::new();
    let waits = [sched.delay_frame(2), sched.delay_frame(4)];
    let all = wait_all(&waits, Some(&token), None);

    host.tick();
    token.cancel();
    assert!(!all.is_completed(), "cancel does not abort the wait");
    assert!(!waits[1].is_completed(), "cancel does not abort timers");
    host.tick_n(3);
    assert!(waits.iter().all(|wait| wait.is_completed()));
    assert!(!all.consume().expect("all"));
}

/// Nested fan-in: each round waits on a frame barrier plus a delay, and the
/// next round is queued from the previous round's continuation.
#[test]
fn nested_rounds_run_one_after_another() {
    init_logging();
    let mut host = MockHost::new();
    let rounds = Rc::new(Cell::new(0u32));

    fn round(sched: frame_loop::Scheduler, rounds: Rc<Cell<u32>>) {
        if rounds.get() == 4 {
            return;
        }
        let waits = [sched.end_of_frame(), sched.delay_frame(1)];
        let next = sched.clone();
        wait_all(&waits, None, Some(sched.task_pool())).then(move |outcome| {
            assert!(outcome.expect("round"));
            rounds.set(rounds.get() + 1);
            round(next, rounds);
        });
    }

    round(host.scheduler().clone(), Rc::clone(&rounds));
    for expected in 1..=4 {
        host.tick();
        assert_eq!(rounds.get(), expected);
    }
    host.tick();
    assert_eq!(rounds.get(), 4);
}
