use alloy_primitives::{Address, B256, U256};
use thiserror::Error;
use waypoint_state::errors::StateError;

pub type BufferResult<T> = Result<T, BufferError>;

#[derive(Debug, Clone, Error)]
pub enum BufferError {
    #[error("caller {0} is not the owner")]
    NotOwner(Address),

    #[error("caller {0} is not the pusher")]
    NotPusher(Address),

    #[error("pusher address already set")]
    PusherAlreadySet,

    #[error("pusher address must be nonzero")]
    InvalidPusherAddress,

    #[error("invalid batch: {0}")]
    InvalidBatch(&'static str),

    #[error("unknown parent chain block hash for block {0}")]
    UnknownParentChainBlockHash(u64),

    #[error("buffer size must be nonzero")]
    ZeroBufferSize,

    #[error("slot {0} holds an out of range value")]
    CorruptSlot(B256),

    #[error("state: {0}")]
    State(#[from] StateError),
}

pub type PusherResult<T> = Result<T, PusherError>;

#[derive(Debug, Clone, Error)]
pub enum PusherError {
    #[error("invalid batch: {0}")]
    InvalidBatch(&'static str),

    #[error("block hash for block {0} is unavailable")]
    BlockHashUnavailable(u64),

    #[error("messaging: {0}")]
    Messaging(#[from] MessagingError),
}

pub type MessagingResult<T> = Result<T, MessagingError>;

#[derive(Debug, Clone, Error)]
pub enum MessagingError {
    #[error("malformed tx data")]
    MalformedTxData,

    #[error("incorrect msg value (expected {expected}, got {got})")]
    IncorrectMsgValue { expected: U256, got: U256 },

    #[error("malformed calldata")]
    MalformedCalldata,

    #[error("message targets {0}, not this buffer")]
    WrongTarget(Address),

    #[error("buffer: {0}")]
    Buffer(#[from] BufferError),
}
