//! Slot stores with backend-like behavior for tests.

use std::{thread, time::Duration};

use alloy_primitives::B256;
use waypoint_state::prelude::*;

/// In-memory store whose reads take a while, like a store backed by disk or
/// RPC.  Widens the window between a component's checks and its writes.
#[derive(Debug, Default)]
pub struct SlowSlotStore {
    inner: MemSlotStore,
    read_delay: Duration,
}

impl SlowSlotStore {
    pub fn new(read_delay: Duration) -> Self {
        Self {
            inner: MemSlotStore::new(),
            read_delay,
        }
    }
}

impl SlotStore for SlowSlotStore {
    fn get_slot(&self, slot: B256) -> StateResult<B256> {
        thread::sleep(self.read_delay);
        self.inner.get_slot(slot)
    }

    fn apply_batch(&self, batch: WriteBatch) -> StateResult<()> {
        self.inner.apply_batch(batch)
    }

    fn non_zero_slots(&self) -> StateResult<Vec<(B256, B256)>> {
        self.inner.non_zero_slots()
    }
}
