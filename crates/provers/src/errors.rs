use alloy_primitives::{Address, B256, U256};
use thiserror::Error;
use waypoint_blockhash::errors::BufferError;
use waypoint_mpt::MptError;
use waypoint_primitives::prelude::ChainId;
use waypoint_state::errors::StateError;

pub type ProverResult<T> = Result<T, ProverError>;

#[derive(Debug, Clone, Error)]
pub enum ProverError {
    #[error("call on chain {0}, prover lives on chain {1}")]
    CallNotOnHomeChain(ChainId, ChainId),

    #[error("home block header does not hash to {0}")]
    InvalidHomeBlockHeader(B256),

    #[error("target block header does not hash to {0}")]
    InvalidTargetBlockHeader(B256),

    #[error("block header supplied for a state root commitment")]
    UnexpectedBlockHeader,

    #[error("no target commitment for key {0}")]
    TargetCommitmentNotFound(U256),

    #[error("account {0} not found")]
    AccountNotFound(Address),

    #[error("malformed prover input")]
    MalformedInput,

    #[error("prover copy cannot read its home chain directly")]
    NoCommitmentSource,

    #[error("address {0} already has code")]
    AddressInUse(Address),

    #[error("mpt: {0}")]
    Mpt(#[from] MptError),

    #[error("rlp: {0}")]
    Rlp(#[from] alloy_rlp::Error),

    #[error("buffer: {0}")]
    Buffer(#[from] BufferError),

    #[error("root store: {0}")]
    RootStore(#[from] RootStoreError),
}

pub type RootStoreResult<T> = Result<T, RootStoreError>;

#[derive(Debug, Clone, Error)]
pub enum RootStoreError {
    #[error("caller {0} is not the poster")]
    NotPoster(Address),

    #[error("commitment must be nonzero")]
    ZeroCommitment,

    #[error("commitment for key {0} already posted")]
    CommitmentAlreadyPosted(U256),

    #[error("state: {0}")]
    State(#[from] StateError),
}
