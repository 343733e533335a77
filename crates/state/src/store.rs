//! Per-account storage.

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256, U256};
use parking_lot::RwLock;
use waypoint_primitives::slots::{address_from_word, u256_from_word};

use crate::{batch::WriteBatch, errors::StateResult};

/// Word addressed storage of a single account.  Unset slots read as zero.
pub trait SlotStore: Send + Sync {
    fn get_slot(&self, slot: B256) -> StateResult<B256>;

    /// Applies every write in the batch at once.  Zero values clear the slot.
    fn apply_batch(&self, batch: WriteBatch) -> StateResult<()>;

    /// All slots currently holding a non-zero word, in slot order.
    fn non_zero_slots(&self) -> StateResult<Vec<(B256, B256)>>;

    fn get_u256(&self, slot: B256) -> StateResult<U256> {
        Ok(u256_from_word(self.get_slot(slot)?))
    }

    fn get_address(&self, slot: B256) -> StateResult<Address> {
        Ok(address_from_word(self.get_slot(slot)?))
    }
}

/// In-memory slot store.
#[derive(Debug, Default)]
pub struct MemSlotStore {
    slots: RwLock<BTreeMap<B256, B256>>,
}

impl MemSlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemSlotStore {
    fn get_slot(&self, slot: B256) -> StateResult<B256> {
        let tbl = self.slots.read();
        Ok(tbl.get(&slot).copied().unwrap_or_default())
    }

    fn apply_batch(&self, batch: WriteBatch) -> StateResult<()> {
        let mut tbl = self.slots.write();
        for (slot, value) in batch.into_writes() {
            if value.is_zero() {
                tbl.remove(&slot);
            } else {
                tbl.insert(slot, value);
            }
        }
        Ok(())
    }

    fn non_zero_slots(&self) -> StateResult<Vec<(B256, B256)>> {
        let tbl = self.slots.read();
        Ok(tbl.iter().map(|(k, v)| (*k, *v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_write_clears_slot() {
        let store = MemSlotStore::new();
        let slot = B256::with_last_byte(1);

        let mut batch = WriteBatch::new();
        batch.put_u256(slot, U256::from(5));
        store.apply_batch(batch).unwrap();
        assert_eq!(store.get_u256(slot).unwrap(), U256::from(5));

        let mut batch = WriteBatch::new();
        batch.clear(slot);
        store.apply_batch(batch).unwrap();
        assert_eq!(store.get_slot(slot).unwrap(), B256::ZERO);
        assert!(store.non_zero_slots().unwrap().is_empty());
    }
}
