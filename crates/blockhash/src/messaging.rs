//! Cross-domain messaging from the parent chain to a child chain.
//!
//! Sending only queues a [`PendingMessage`] on a [`MessageChannel`].  Delivery
//! happens later in a separate call on the child chain, so a pusher never
//! learns whether its hashes arrived.

use std::{collections::VecDeque, sync::Arc};

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolType};
use parking_lot::Mutex;
use tracing::*;
use waypoint_primitives::{
    abi::{receiveHashesCall, NativeMessageParams, RetryableTicketParams},
    alias::apply_l1_to_l2_alias,
};
use waypoint_state::prelude::*;

use crate::{
    buffer::RingBuffer,
    errors::{MessagingError, MessagingResult},
};

/// How the child chain presents a message's sender to the target.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Delivery {
    /// The target sees the aliased parent chain sender as its caller.
    Aliased,

    /// The target is called by `messenger`, which exposes the parent chain
    /// sender as the cross-domain sender.
    Messenger { messenger: Address },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingMessage {
    pub sender: Address,
    pub target: Address,
    pub calldata: Bytes,
    pub value: U256,
    pub delivery: Delivery,
}

impl PendingMessage {
    /// Context the target executes in when this message is delivered during a
    /// call described by `ctx`.
    pub fn delivery_ctx(&self, ctx: &ExecCtx) -> ExecCtx {
        let inner = ExecCtx::new(
            ctx.chain_id(),
            ctx.block_number(),
            ctx.timestamp(),
            ctx.history().clone(),
        )
        .with_value(self.value);

        match self.delivery {
            Delivery::Aliased => inner.with_caller(apply_l1_to_l2_alias(self.sender)),
            Delivery::Messenger { messenger } => inner
                .with_caller(messenger)
                .with_xdomain_sender(self.sender),
        }
    }

    /// Delivers this message to `buffer`.  Logs the buffer emits are moved
    /// into `ctx`.
    pub fn deliver(&self, ctx: &mut ExecCtx, buffer: &RingBuffer) -> MessagingResult<()> {
        if self.target != buffer.address() {
            return Err(MessagingError::WrongTarget(self.target));
        }

        let call = receiveHashesCall::abi_decode(&self.calldata, true)
            .map_err(|_| MessagingError::MalformedCalldata)?;
        let first: u64 = call
            .firstBlockNumber
            .try_into()
            .map_err(|_| MessagingError::MalformedCalldata)?;

        let mut inner = self.delivery_ctx(ctx);
        buffer.receive_hashes(&mut inner, first, &call.blockHashes)?;
        ctx.absorb_logs(inner.take_logs());
        Ok(())
    }
}

/// FIFO of messages sent but not yet delivered.
#[derive(Debug, Default)]
pub struct MessageChannel {
    queue: Mutex<VecDeque<PendingMessage>>,
}

impl MessageChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, msg: PendingMessage) {
        self.queue.lock().push_back(msg);
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Delivers the oldest pending message to `buffer` and returns it.  A
    /// message that fails to deliver stays at the front of the queue.
    pub fn relay_next(
        &self,
        ctx: &mut ExecCtx,
        buffer: &RingBuffer,
    ) -> MessagingResult<Option<PendingMessage>> {
        let Some(msg) = self.queue.lock().pop_front() else {
            return Ok(None);
        };

        if let Err(e) = msg.deliver(ctx, buffer) {
            warn!(to = %msg.target, err = %e, "message delivery failed");
            self.queue.lock().push_front(msg);
            return Err(e);
        }

        debug!(to = %msg.target, sender = %msg.sender, "relayed message");
        Ok(Some(msg))
    }
}

/// Parent chain side of a messaging bridge.
pub trait CrossDomainMessenger: Send + Sync {
    fn address(&self) -> Address;

    /// Sends `calldata` from `sender` to `target` on the child chain, paying
    /// `ctx.value()`.  `tx_data` carries bridge specific parameters.
    fn send(
        &self,
        ctx: &ExecCtx,
        sender: Address,
        target: Address,
        calldata: Bytes,
        tx_data: &[u8],
    ) -> MessagingResult<()>;
}

/// Arbitrum style inbox creating retryable tickets.  The message value must pay
/// for submission and execution up front, and the target sees the aliased
/// sender.
pub struct RetryableInbox {
    address: Address,
    channel: Arc<MessageChannel>,
}

impl RetryableInbox {
    pub fn new(address: Address, channel: Arc<MessageChannel>) -> Self {
        Self { address, channel }
    }
}

impl CrossDomainMessenger for RetryableInbox {
    fn address(&self) -> Address {
        self.address
    }

    fn send(
        &self,
        ctx: &ExecCtx,
        sender: Address,
        target: Address,
        calldata: Bytes,
        tx_data: &[u8],
    ) -> MessagingResult<()> {
        let params = <RetryableTicketParams as SolType>::abi_decode(tx_data, true)
            .map_err(|_| MessagingError::MalformedTxData)?;

        let expected = params
            .gasLimit
            .checked_mul(params.maxFeePerGas)
            .and_then(|exec| exec.checked_add(params.maxSubmissionCost))
            .ok_or(MessagingError::MalformedTxData)?;
        if ctx.value() != expected {
            return Err(MessagingError::IncorrectMsgValue {
                expected,
                got: ctx.value(),
            });
        }

        self.channel.enqueue(PendingMessage {
            sender,
            target,
            calldata,
            value: ctx.value(),
            delivery: Delivery::Aliased,
        });
        Ok(())
    }
}

/// OP style messenger.  Messages carry no value; on the child chain they're
/// delivered by the `remote` messenger, which exposes the sender.
pub struct NativeMessenger {
    address: Address,
    remote: Address,
    channel: Arc<MessageChannel>,
}

impl NativeMessenger {
    pub fn new(address: Address, remote: Address, channel: Arc<MessageChannel>) -> Self {
        Self {
            address,
            remote,
            channel,
        }
    }

    /// Address of the delivering messenger on the child chain.
    pub fn remote(&self) -> Address {
        self.remote
    }
}

impl CrossDomainMessenger for NativeMessenger {
    fn address(&self) -> Address {
        self.address
    }

    fn send(
        &self,
        ctx: &ExecCtx,
        sender: Address,
        target: Address,
        calldata: Bytes,
        tx_data: &[u8],
    ) -> MessagingResult<()> {
        let _params = <NativeMessageParams as SolType>::abi_decode(tx_data, true)
            .map_err(|_| MessagingError::MalformedTxData)?;

        if !ctx.value().is_zero() {
            return Err(MessagingError::IncorrectMsgValue {
                expected: U256::ZERO,
                got: ctx.value(),
            });
        }

        self.channel.enqueue(PendingMessage {
            sender,
            target,
            calldata,
            value: U256::ZERO,
            delivery: Delivery::Messenger {
                messenger: self.remote,
            },
        });
        Ok(())
    }
}
