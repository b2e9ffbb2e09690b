//! Run-wide clock and identifier allocation.

use pelagic_core::{AnimalId, TickId};

/// The tick in progress and the next free animal id.
///
/// Ids are never reused: a calf spawned after its mother died still gets
/// a fresh one.
#[derive(Clone, Debug, Default)]
pub struct SimulationContext {
    tick: TickId,
    next_id: u64,
}

impl SimulationContext {
    /// Start at tick 0 with no id handed out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick being executed (or about to be).
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Move on to the next tick.
    pub fn advance(&mut self) {
        self.tick = self.tick.next();
    }

    /// Reserve the next animal id.
    pub fn allocate_id(&mut self) -> AnimalId {
        let id = AnimalId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> u64 {
        self.next_id
    }
}
