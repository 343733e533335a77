//! Staged writes to a slot store.

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256, U256};
use waypoint_primitives::slots::{word_from_address, word_from_u256};

use crate::{errors::StateResult, store::SlotStore};

/// Collection of writes we're making to an account's storage.  Later writes to
/// the same slot replace earlier ones.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WriteBatch {
    writes: BTreeMap<B256, B256>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, slot: B256, value: B256) {
        self.writes.insert(slot, value);
    }

    pub fn put_u256(&mut self, slot: B256, value: U256) {
        self.put(slot, word_from_u256(value));
    }

    pub fn put_address(&mut self, slot: B256, addr: Address) {
        self.put(slot, word_from_address(addr));
    }

    pub fn clear(&mut self, slot: B256) {
        self.put(slot, B256::ZERO);
    }

    /// Reads a slot as it will be once this batch is applied to `store`.
    pub fn read(&self, store: &dyn SlotStore, slot: B256) -> StateResult<B256> {
        match self.writes.get(&slot) {
            Some(v) => Ok(*v),
            None => store.get_slot(slot),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn into_writes(self) -> impl Iterator<Item = (B256, B256)> {
        self.writes.into_iter()
    }
}
