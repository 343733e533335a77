use alloy_primitives::{Address, B256, U256};
use thiserror::Error;
use waypoint_route::RouteError;
use waypoint_state::errors::StateError;

pub type BroadcastResult<T> = Result<T, BroadcastError>;

#[derive(Debug, Clone, Error)]
pub enum BroadcastError {
    #[error("message {message} already broadcast by {publisher}")]
    MessageAlreadyBroadcast { message: B256, publisher: Address },

    #[error("broadcast timestamp must be nonzero")]
    ZeroTimestamp,

    #[error("proof is for slot {actual}, message lives at {expected}")]
    WrongMessageSlot { expected: U256, actual: U256 },

    #[error("message {message} from {publisher} not found")]
    MessageNotFound { message: B256, publisher: Address },

    #[error("proof is for slot {0}, not the pointer code hash slot")]
    WrongPointerSlot(U256),

    #[error("no prover deployed at {0}")]
    UnknownProverCopy(Address),

    #[error("copy code hash {actual} != remote pointer code hash {expected}")]
    CopyCodeHashMismatch { expected: B256, actual: B256 },

    #[error("version {new} does not increase on {current}")]
    NonIncreasingVersion { current: u64, new: u64 },

    #[error("broadcast record holds an out of range timestamp")]
    CorruptTimestamp,

    #[error("route: {0}")]
    Route(#[from] RouteError),

    #[error("state: {0}")]
    State(#[from] StateError),
}
