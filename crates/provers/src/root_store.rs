//! Finalized root store: where a parent chain keeps commitments to a child
//! chain's state once they're final.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use parking_lot::Mutex;
use tracing::*;
use waypoint_primitives::{
    constants::ROOT_STORE_MAPPING_SLOT, events::CommitmentPosted, slots::uint_mapping_slot,
};
use waypoint_state::prelude::*;

use crate::errors::{RootStoreError, RootStoreResult};

const POSTER_SLOT: B256 = B256::ZERO;

/// Slot of `commitments[key]`.
pub fn commitment_slot(key: U256) -> B256 {
    uint_mapping_slot(key, ROOT_STORE_MAPPING_SLOT)
}

pub struct FinalizedRootStore {
    address: Address,
    store: Arc<dyn SlotStore>,
    write_lock: Mutex<()>,
}

impl FinalizedRootStore {
    /// Deploys a store at `address` accepting commitments from `poster`.
    pub fn new(
        address: Address,
        poster: Address,
        store: Arc<dyn SlotStore>,
    ) -> RootStoreResult<Self> {
        let mut batch = WriteBatch::new();
        batch.put_address(POSTER_SLOT, poster);
        store.apply_batch(batch)?;
        Ok(Self {
            address,
            store,
            write_lock: Mutex::new(()),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn poster(&self) -> RootStoreResult<Address> {
        Ok(self.store.get_address(POSTER_SLOT)?)
    }

    /// Records `commitment` under `key`.  Each key can be posted once.
    pub fn post_commitment(
        &self,
        ctx: &mut ExecCtx,
        key: U256,
        commitment: B256,
    ) -> RootStoreResult<()> {
        let _guard = self.write_lock.lock();
        if ctx.caller() != self.poster()? {
            warn!(store = %self.address, caller = %ctx.caller(), "rejected commitment from non-poster");
            return Err(RootStoreError::NotPoster(ctx.caller()));
        }
        if commitment.is_zero() {
            return Err(RootStoreError::ZeroCommitment);
        }

        let slot = commitment_slot(key);
        if !self.store.get_slot(slot)?.is_zero() {
            return Err(RootStoreError::CommitmentAlreadyPosted(key));
        }

        let mut batch = WriteBatch::new();
        batch.put(slot, commitment);
        self.store.apply_batch(batch)?;

        info!(store = %self.address, %key, %commitment, "posted commitment");
        ctx.emit(self.address, &CommitmentPosted { key, commitment });
        Ok(())
    }

    /// Commitment posted under `key`, zero if none.
    pub fn commitment(&self, key: U256) -> RootStoreResult<B256> {
        Ok(self.store.get_slot(commitment_slot(key))?)
    }
}
