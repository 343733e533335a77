//! Context a single call executes in.

use std::{fmt, sync::Arc};

use alloy_primitives::{Address, Log, B256, U256};
use alloy_sol_types::SolEvent;
use tracing::*;
use waypoint_primitives::prelude::ChainId;

use crate::history::BlockHashHistory;

/// What a call can see about the chain it's executing on, who called it, and
/// the log records it has emitted so far.
#[derive(Clone)]
pub struct ExecCtx {
    chain_id: ChainId,
    block_number: u64,
    timestamp: u64,
    caller: Address,
    value: U256,
    xdomain_sender: Option<Address>,
    history: Arc<dyn BlockHashHistory>,
    logs: Vec<Log>,
}

impl ExecCtx {
    pub fn new(
        chain_id: ChainId,
        block_number: u64,
        timestamp: u64,
        history: Arc<dyn BlockHashHistory>,
    ) -> Self {
        Self {
            chain_id,
            block_number,
            timestamp,
            caller: Address::ZERO,
            value: U256::ZERO,
            xdomain_sender: None,
            history,
            logs: Vec::new(),
        }
    }

    pub fn with_caller(mut self, caller: Address) -> Self {
        self.caller = caller;
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Marks the call as delivered by a messenger on behalf of `sender` on the
    /// other domain.
    pub fn with_xdomain_sender(mut self, sender: Address) -> Self {
        self.xdomain_sender = Some(sender);
        self
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn caller(&self) -> Address {
        self.caller
    }

    pub fn value(&self) -> U256 {
        self.value
    }

    pub fn xdomain_sender(&self) -> Option<Address> {
        self.xdomain_sender
    }

    pub fn block_hash(&self, number: u64) -> Option<B256> {
        self.history.block_hash(number)
    }

    pub fn history(&self) -> &Arc<dyn BlockHashHistory> {
        &self.history
    }

    /// Records `event` as emitted by the component at `address`.
    pub fn emit<E: SolEvent>(&mut self, address: Address, event: &E) {
        trace!(%address, event = E::SIGNATURE, "emitting log");
        self.logs.push(Log {
            address,
            data: event.encode_log_data(),
        });
    }

    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Moves logs emitted in a nested context into this one.
    pub fn absorb_logs(&mut self, logs: Vec<Log>) {
        self.logs.extend(logs);
    }

    pub fn take_logs(&mut self) -> Vec<Log> {
        std::mem::take(&mut self.logs)
    }

    /// Decodes every emitted log that is an `E`.
    pub fn events<E: SolEvent>(&self) -> Vec<E> {
        self.logs
            .iter()
            .filter_map(|log| E::decode_log_data(&log.data, true).ok())
            .collect()
    }
}

impl fmt::Debug for ExecCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecCtx")
            .field("chain_id", &self.chain_id)
            .field("block_number", &self.block_number)
            .field("timestamp", &self.timestamp)
            .field("caller", &self.caller)
            .field("value", &self.value)
            .field("xdomain_sender", &self.xdomain_sender)
            .field("logs", &self.logs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use waypoint_primitives::events::PusherAddressSet;

    use super::*;
    use crate::history::EmptyHistory;

    #[test]
    fn test_emit_and_decode() {
        let mut ctx = ExecCtx::new(1, 10, 100, Arc::new(EmptyHistory));
        let emitter = Address::repeat_byte(0x11);
        let pusher = Address::repeat_byte(0x22);
        ctx.emit(
            emitter,
            &PusherAddressSet {
                pusherAddress: pusher,
            },
        );

        assert_eq!(ctx.logs().len(), 1);
        assert_eq!(ctx.logs()[0].address, emitter);
        let events = ctx.events::<PusherAddressSet>();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].pusherAddress, pusher);
    }
}
