//! `async` scripts awaiting scheduler waits under a local executor.
//!
//! The mock host ticks the scheduler; the executor then runs whatever the
//! tick woke. This is the shape of a game loop that hosts async scripts.

use crate::init_logging;
use anyhow::{anyhow, Result};
use frame_loop::{ClockKind, Scheduler};
use frame_mock::MockHost;
use frame_task::{Task, TaskError};
use futures::executor::LocalPool;
use futures::task::LocalSpawnExt;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use task_sync::{wait_all, wait_any};

type Log = Rc<RefCell<Vec<String>>>;

fn push(log: &Log, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

async fn cutscene(sched: Scheduler, log: Log) -> Result<()> {
    push(&log, "start");
    sched.next_frame().await?;
    push(&log, "frame");
    sched.delay(Duration::from_millis(40), ClockKind::Scaled).await?;
    push(&log, "delay");
    let waits = [sched.delay_frame(2), sched.end_of_frame()];
    let all = wait_all(&waits, None, Some(sched.task_pool())).await?;
    push(&log, format!("all={all}"));
    Ok(())
}

#[test]
fn cutscene_advances_with_host_ticks() {
    init_logging();
    let mut host = MockHost::with_config(Default::default(), Duration::from_millis(20));
    let mut executor = LocalPool::new();
    let log: Log = Rc::default();
    let result = Rc::new(RefCell::new(None));

    {
        let sched = host.scheduler().clone();
        let log = Rc::clone(&log);
        let result = Rc::clone(&result);
        executor
            .spawner()
            .spawn_local(async move {
                *result.borrow_mut() = Some(cutscene(sched, log).await);
            })
            .expect("spawn cutscene");
    }

    executor.run_until_stalled();
    assert_eq!(*log.borrow(), ["start"]);

    let mut ticks = 0;
    while result.borrow().is_none() {
        assert!(ticks < 20, "cutscene stalled: {:?}", log.borrow());
        host.tick();
        executor.run_until_stalled();
        ticks += 1;
    }

    assert_eq!(*log.borrow(), ["start", "frame", "delay", "all=true"]);
    assert!(matches!(result.borrow().as_ref(), Some(Ok(()))));
    // 1 tick for the frame, 2 for 40ms, 2 for the frame delay
    assert_eq!(ticks, 5);
}

#[test]
fn producer_fault_reaches_awaiting_script() {
    init_logging();
    let mut executor = LocalPool::new();
    let source = Task::<u32>::new();
    let seen = Rc::new(RefCell::new(String::new()));

    {
        let source = source.clone();
        let seen = Rc::clone(&seen);
        executor
            .spawner()
            .spawn_local(async move {
                match source.await {
                    Err(TaskError::Propagated(err)) => *seen.borrow_mut() = err.to_string(),
                    other => *seen.borrow_mut() = format!("unexpected: {other:?}"),
                }
            })
            .expect("spawn");
    }

    executor.run_until_stalled();
    source.set_exception(anyhow!("asset missing"));
    executor.run_until_stalled();
    assert_eq!(seen.borrow().as_str(), "asset missing");
}

/// A timeout race: whichever of the work and the timer finishes first wins.
#[test]
fn wait_any_races_work_against_timer() {
    init_logging();
    let mut host = MockHost::new();
    let sched = host.scheduler().clone();
    let work = Task::<()>::new();
    let timeout = sched.delay_frame(10);
    let raced = wait_any(&[work.clone(), timeout.clone()], None, None);

    host.tick_n(3);
    assert!(!raced.is_completed());
    work.set_result(());
    assert!(raced.is_completed());

    host.tick_n(10);
    assert!(timeout.is_completed());
    assert!(raced.consume().expect("race"));
}

#[test]
fn detached_fault_goes_to_handler() {
    init_logging();
    let mut host = MockHost::new();
    let sched = host.scheduler().clone();
    let reported = Rc::new(RefCell::new(Vec::new()));

    let job = Task::<()>::new();
    {
        let job = job.clone();
        sched.delay_frame_action(2, move || job.set_exception(anyhow!("save failed")));
    }
    let sink = Rc::clone(&reported);
    job.detach_with(move |err| sink.borrow_mut().push(err.to_string()));

    host.tick();
    assert!(reported.borrow().is_empty());
    host.tick();
    assert_eq!(*reported.borrow(), ["save failed"]);
}
