//! `std::future::Future` bridge so `async` code can await a [`Task`].
//!
//! Polling a pending task parks the waker in the task's continuation slot;
//! completion wakes it. Each poll re-registers, which is the single consumer
//! replacing its own continuation. A ready poll consumes the task, so a pooled
//! cell goes back to its pool as soon as the `.await` resumes.

use crate::error::TaskResult;
use crate::task::Task;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

impl<T: 'static> Future for Task<T> {
    type Output = TaskResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.is_completed() {
            return Poll::Ready(self.take_outcome());
        }
        let waker = cx.waker().clone();
        self.on_completed(move || waker.wake());
        Poll::Pending
    }
}
