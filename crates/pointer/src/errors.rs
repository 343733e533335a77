use alloy_primitives::Address;
use thiserror::Error;
use waypoint_primitives::prelude::ChainId;
use waypoint_state::errors::StateError;

pub type PointerResult<T> = Result<T, PointerError>;

#[derive(Debug, Clone, Error)]
pub enum PointerError {
    #[error("caller {0} is not the owner")]
    NotOwner(Address),

    #[error("no prover deployed at {0}")]
    InvalidImplementationAddress(Address),

    #[error("prover lives on chain {prover}, pointer on chain {pointer}")]
    HomeChainMismatch { prover: ChainId, pointer: ChainId },

    #[error("version {new} does not increase on {current}")]
    NonIncreasingVersion { current: u64, new: u64 },

    #[error("owner must be nonzero")]
    InvalidOwner,

    #[error("state: {0}")]
    State(#[from] StateError),
}
