/// Scheduling point within one host tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Advances timers once per tick, then resolves the ones that finished.
    Update,
    /// Runs after `Update`; resolves every pending barrier unconditionally.
    PostUpdate,
}

impl Phase {
    /// Both phases in tick order.
    pub const ALL: [Phase; 2] = [Phase::Update, Phase::PostUpdate];

    /// Stable index used for per-phase arrays.
    pub fn index(self) -> usize {
        match self {
            Phase::Update => 0,
            Phase::PostUpdate => 1,
        }
    }
}
