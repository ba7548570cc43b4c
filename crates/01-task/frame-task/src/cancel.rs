//! Advisory cancellation flag.

use std::cell::Cell;
use std::rc::Rc;

/// Shared cancellation flag consulted after the fact by combinators.
///
/// Cancelling never aborts timers or unregisters continuations; it only
/// changes how a waiting combinator reports its result.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token, and every clone of it, as cancelled.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Returns `true` once [`CancelToken::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}
