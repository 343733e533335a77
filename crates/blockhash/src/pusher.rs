//! Parent chain side of the block hash relay.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolCall;
use tracing::*;
use waypoint_primitives::{abi::receiveHashesCall, events::BlockHashesPushed};
use waypoint_state::prelude::*;

use crate::{
    errors::{PusherError, PusherResult},
    messaging::CrossDomainMessenger,
};

/// Reads recent block hashes of the chain it runs on and sends them to a
/// child chain buffer.  Holds no state of its own.
pub struct Pusher {
    address: Address,
    max_batch_size: u64,
    messenger: Arc<dyn CrossDomainMessenger>,
}

impl Pusher {
    pub fn new(
        address: Address,
        max_batch_size: u64,
        messenger: Arc<dyn CrossDomainMessenger>,
    ) -> Self {
        Self {
            address,
            max_batch_size,
            messenger,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn max_batch_size(&self) -> u64 {
        self.max_batch_size
    }

    /// Pushes hashes of blocks `first..first + batch_size` to `buffer`.  Every
    /// block in the batch must be older than the executing block.
    pub fn push_hashes(
        &self,
        ctx: &mut ExecCtx,
        buffer: Address,
        first: u64,
        batch_size: u64,
        tx_data: &[u8],
    ) -> PusherResult<()> {
        if batch_size == 0 || batch_size > self.max_batch_size {
            return Err(PusherError::InvalidBatch("batch size out of range"));
        }
        if first == 0 {
            return Err(PusherError::InvalidBatch("first block number is zero"));
        }
        let last = first
            .checked_add(batch_size - 1)
            .ok_or(PusherError::InvalidBatch("block number overflow"))?;
        if last >= ctx.block_number() {
            return Err(PusherError::InvalidBatch("batch includes current or future block"));
        }

        let hashes = (first..=last)
            .map(|n| ctx.block_hash(n).ok_or(PusherError::BlockHashUnavailable(n)))
            .collect::<PusherResult<Vec<B256>>>()?;

        let calldata = receiveHashesCall {
            firstBlockNumber: U256::from(first),
            blockHashes: hashes,
        }
        .abi_encode();

        self.messenger
            .send(ctx, self.address, buffer, calldata.into(), tx_data)?;

        info!(pusher = %self.address, %buffer, %first, %last, "pushed block hashes");
        ctx.emit(
            self.address,
            &BlockHashesPushed {
                firstBlockNumber: U256::from(first),
                lastBlockNumber: U256::from(last),
            },
        );
        Ok(())
    }
}
