use frame_task::PoolConfig;
use serde::{Deserialize, Serialize};

/// Default pending-list capacity reserved per phase.
pub const DEFAULT_PENDING_CAPACITY: usize = 64;

/// Tunables for a [`Scheduler`](crate::Scheduler).
///
/// Hosts that keep their settings in a document can embed this struct; every
/// field falls back to its default when omitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Retention cap for pooled task cells.
    pub tasks: PoolConfig,
    /// Retention cap for each timed-item free list.
    pub items: PoolConfig,
    /// Initial capacity of each phase's pending list.
    pub pending_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tasks: PoolConfig::default(),
            items: PoolConfig::default(),
            pending_capacity: DEFAULT_PENDING_CAPACITY,
        }
    }
}
