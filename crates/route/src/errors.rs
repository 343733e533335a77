use alloy_primitives::{Address, B256};
use thiserror::Error;
use waypoint_pointer::PointerError;
use waypoint_primitives::prelude::ChainId;
use waypoint_provers::ProverError;
use waypoint_state::errors::StateError;

pub type RouteResult<T> = Result<T, RouteError>;

#[derive(Debug, Clone, Error)]
pub enum RouteError {
    #[error("empty route")]
    EmptyRoute,

    #[error("route has {pointers} pointers but {inputs} hop inputs")]
    InputLengthMismatch { pointers: usize, inputs: usize },

    #[error("no pointer at {0}")]
    UnknownPointer(Address),

    #[error("pointer {0} has no implementation")]
    PointerNotSet(Address),

    #[error("no prover copy registered for pointer id {0}")]
    ProverCopyNotRegistered(B256),

    #[error("hop {hop}: prover code hash {actual} != expected {expected}")]
    CodeHashMismatch {
        hop: usize,
        expected: B256,
        actual: B256,
    },

    #[error("hop {hop}: prover home chain {actual}, expected {expected}")]
    RouteDiscontinuity {
        hop: usize,
        expected: ChainId,
        actual: ChainId,
    },

    #[error("hop {hop}: {source}")]
    Hop { hop: usize, source: ProverError },

    #[error("final slot proof: {0}")]
    FinalProof(ProverError),

    #[error("pointer: {0}")]
    Pointer(#[from] PointerError),

    #[error("state: {0}")]
    State(#[from] StateError),
}
