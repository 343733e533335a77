use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use parking_lot::Mutex;
use tracing::*;
use waypoint_primitives::{events::MessageBroadcast, slots::message_slot};
use waypoint_state::prelude::*;

use crate::errors::{BroadcastError, BroadcastResult};

/// Records that a publisher broadcast a message, at a slot anyone can prove
/// from another chain.  The slot holds the timestamp of the broadcast.
pub struct Broadcaster {
    address: Address,
    store: Arc<dyn SlotStore>,

    /// Held from the first read to the apply of every mutating call.
    write_lock: Mutex<()>,
}

impl Broadcaster {
    pub fn new(address: Address, store: Arc<dyn SlotStore>) -> Self {
        Self {
            address,
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Broadcasts `message` with the caller as publisher.  A publisher can
    /// broadcast each message once.
    ///
    /// The record is the block timestamp, so a zero timestamp is rejected: it
    /// would store nothing and the message would never count as broadcast.
    pub fn broadcast_message(&self, ctx: &mut ExecCtx, message: B256) -> BroadcastResult<()> {
        if ctx.timestamp() == 0 {
            return Err(BroadcastError::ZeroTimestamp);
        }

        let publisher = ctx.caller();
        let slot = message_slot(message, publisher);

        let _guard = self.write_lock.lock();
        if !self.store.get_slot(slot)?.is_zero() {
            return Err(BroadcastError::MessageAlreadyBroadcast { message, publisher });
        }

        let mut batch = WriteBatch::new();
        batch.put_u256(slot, U256::from(ctx.timestamp()));
        self.store.apply_batch(batch)?;

        info!(broadcaster = %self.address, %message, %publisher, "broadcast message");
        ctx.emit(self.address, &MessageBroadcast { message, publisher });
        Ok(())
    }

    pub fn has_broadcasted(&self, message: B256, publisher: Address) -> BroadcastResult<bool> {
        Ok(!self.store.get_slot(message_slot(message, publisher))?.is_zero())
    }
}
