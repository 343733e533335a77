//! Child chain ring buffer of parent chain block hashes.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use parking_lot::Mutex;
use tracing::*;
use waypoint_primitives::{
    alias::apply_l1_to_l2_alias,
    constants::{BLOCK_HASH_MAPPING_SLOT, BUFFER_RING_BASE_SLOT},
    events::{BlockHashesPushed, PusherAddressSet},
    slots::{offset_slot, uint_mapping_slot},
};
use waypoint_state::prelude::*;

use crate::errors::{BufferError, BufferResult};

const NEWEST_BLOCK_SLOT: B256 = B256::ZERO;
const PUSHER_SLOT: B256 = B256::with_last_byte(2);
const OWNER_SLOT: B256 = B256::with_last_byte(3);

/// Slot of `blockHashMapping[number]`.
pub fn block_hash_slot(number: u64) -> B256 {
    uint_mapping_slot(U256::from(number), BLOCK_HASH_MAPPING_SLOT)
}

/// Slot of `blockNumberBuffer[number % buffer_size]`.
pub fn ring_slot(number: u64, buffer_size: u64) -> B256 {
    offset_slot(*BUFFER_RING_BASE_SLOT, number % buffer_size)
}

/// How the buffer recognizes a call as coming from its pusher.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PusherAuth {
    /// The pusher calls us itself.
    Direct,

    /// The pusher lives on the parent chain and its address is aliased on the
    /// way in.
    Aliased,

    /// Calls arrive from `messenger`, which vouches for the parent chain sender.
    Messenger { messenger: Address },
}

/// Ring buffer of parent chain block hashes.
///
/// Slot `n % buffer_size` of the ring owns block `n`.  Storing `n` there
/// evicts the previous occupant and deletes its hash, so at most
/// `buffer_size` hashes are ever live.
pub struct RingBuffer {
    address: Address,
    buffer_size: u64,
    auth: PusherAuth,
    store: Arc<dyn SlotStore>,
    write_lock: Mutex<()>,
}

impl RingBuffer {
    /// Deploys a buffer at `address` owned by `owner`.
    pub fn new(
        address: Address,
        buffer_size: u64,
        auth: PusherAuth,
        owner: Address,
        store: Arc<dyn SlotStore>,
    ) -> BufferResult<Self> {
        if buffer_size == 0 {
            return Err(BufferError::ZeroBufferSize);
        }

        let mut batch = WriteBatch::new();
        batch.put_address(OWNER_SLOT, owner);
        store.apply_batch(batch)?;

        Ok(Self {
            address,
            buffer_size,
            auth,
            store,
            write_lock: Mutex::new(()),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn buffer_size(&self) -> u64 {
        self.buffer_size
    }

    pub fn auth(&self) -> PusherAuth {
        self.auth
    }

    pub fn owner(&self) -> BufferResult<Address> {
        Ok(self.store.get_address(OWNER_SLOT)?)
    }

    /// The parent chain pusher, zero until set.
    pub fn pusher(&self) -> BufferResult<Address> {
        Ok(self.store.get_address(PUSHER_SLOT)?)
    }

    pub fn newest_block_number(&self) -> BufferResult<u64> {
        self.read_u64(NEWEST_BLOCK_SLOT, None)
    }

    /// Sets the pusher.  Owner only, and only once.
    pub fn set_pusher_address(&self, ctx: &mut ExecCtx, pusher: Address) -> BufferResult<()> {
        let _guard = self.write_lock.lock();
        if ctx.caller() != self.owner()? {
            return Err(BufferError::NotOwner(ctx.caller()));
        }
        if pusher.is_zero() {
            return Err(BufferError::InvalidPusherAddress);
        }
        if !self.pusher()?.is_zero() {
            return Err(BufferError::PusherAlreadySet);
        }

        let mut batch = WriteBatch::new();
        batch.put_address(PUSHER_SLOT, pusher);
        self.store.apply_batch(batch)?;

        info!(buffer = %self.address, %pusher, "set pusher address");
        ctx.emit(
            self.address,
            &PusherAddressSet {
                pusherAddress: pusher,
            },
        );
        Ok(())
    }

    fn check_pusher(&self, ctx: &ExecCtx) -> BufferResult<()> {
        let pusher = self.pusher()?;
        let authorized = !pusher.is_zero()
            && match self.auth {
                PusherAuth::Direct => ctx.caller() == pusher,
                PusherAuth::Aliased => ctx.caller() == apply_l1_to_l2_alias(pusher),
                PusherAuth::Messenger { messenger } => {
                    ctx.caller() == messenger && ctx.xdomain_sender() == Some(pusher)
                }
            };

        if !authorized {
            warn!(buffer = %self.address, caller = %ctx.caller(), "rejected hashes from non-pusher");
            return Err(BufferError::NotPusher(ctx.caller()));
        }
        Ok(())
    }

    /// Stores hashes of blocks `first..first + hashes.len()`.
    ///
    /// A batch ending at or below the newest stored block is dropped without
    /// effect, which makes redelivery of the same message harmless.
    ///
    /// A newer batch may overlap blocks that are already stored.  Those blocks
    /// keep the hash they were first stored with; the batch's hash for them is
    /// ignored even if it differs.  Blocks whose ring slot already holds a
    /// newer block are skipped too.
    pub fn receive_hashes(
        &self,
        ctx: &mut ExecCtx,
        first: u64,
        hashes: &[B256],
    ) -> BufferResult<()> {
        let _guard = self.write_lock.lock();
        self.check_pusher(ctx)?;

        if first == 0 {
            return Err(BufferError::InvalidBatch("first block number is zero"));
        }
        if hashes.is_empty() {
            return Err(BufferError::InvalidBatch("empty batch"));
        }
        let last = first
            .checked_add(hashes.len() as u64 - 1)
            .ok_or(BufferError::InvalidBatch("block number overflow"))?;

        let newest = self.newest_block_number()?;
        if last <= newest {
            debug!(buffer = %self.address, %first, %last, %newest, "ignoring stale batch");
            return Ok(());
        }

        let mut batch = WriteBatch::new();
        for (number, hash) in (first..=last).zip(hashes.iter()) {
            let ring = ring_slot(number, self.buffer_size);
            let occupant = self.read_u64(ring, Some(&batch))?;
            if occupant >= number {
                continue;
            }
            if occupant != 0 {
                trace!(%occupant, %number, "evicting block hash");
                batch.clear(block_hash_slot(occupant));
            }
            batch.put_u256(ring, U256::from(number));
            batch.put(block_hash_slot(number), *hash);
        }
        batch.put_u256(NEWEST_BLOCK_SLOT, U256::from(last));
        self.store.apply_batch(batch)?;

        info!(buffer = %self.address, %first, %last, "stored parent chain block hashes");
        ctx.emit(
            self.address,
            &BlockHashesPushed {
                firstBlockNumber: U256::from(first),
                lastBlockNumber: U256::from(last),
            },
        );
        Ok(())
    }

    /// Hash of parent chain block `number`, if it's still in the buffer.
    pub fn parent_chain_block_hash(&self, number: u64) -> BufferResult<B256> {
        if number == 0 {
            return Err(BufferError::UnknownParentChainBlockHash(number));
        }

        let occupant = self.read_u64(ring_slot(number, self.buffer_size), None)?;
        if occupant != number {
            return Err(BufferError::UnknownParentChainBlockHash(number));
        }

        let hash = self.store.get_slot(block_hash_slot(number))?;
        if hash.is_zero() {
            return Err(BufferError::UnknownParentChainBlockHash(number));
        }
        Ok(hash)
    }

    fn read_u64(&self, slot: B256, batch: Option<&WriteBatch>) -> BufferResult<u64> {
        let word = match batch {
            Some(b) => b.read(self.store.as_ref(), slot)?,
            None => self.store.get_slot(slot)?,
        };
        U256::from_be_bytes(word.0)
            .try_into()
            .map_err(|_| BufferError::CorruptSlot(slot))
    }
}
