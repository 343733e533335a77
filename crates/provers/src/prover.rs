use alloy_primitives::{keccak256, Address, B256, U256};
use waypoint_primitives::prelude::*;
use waypoint_state::prelude::*;

use crate::errors::{ProverError, ProverResult};

/// A single hop of a route, from a home chain commitment to a target chain
/// commitment.
pub trait HopProver: Send + Sync {
    fn home_chain_id(&self) -> ChainId;

    fn target_chain_id(&self) -> ChainId;

    fn version(&self) -> u64;

    /// Canonical encoding of the prover's immutable configuration.
    fn code(&self) -> Vec<u8>;

    fn code_hash(&self) -> B256 {
        keccak256(self.code())
    }

    /// Reads a target commitment straight from the home chain.  Only callable
    /// on the home chain.
    fn get_target_commitment(&self, ctx: &ExecCtx, input: &[u8]) -> ProverResult<Commitment>;

    /// Proves a target commitment from a commitment to the home chain's state.
    fn verify_target_commitment(
        &self,
        home_commitment: Commitment,
        input: &[u8],
    ) -> ProverResult<Commitment>;

    /// Proves one storage slot against a target commitment, returning the
    /// account, slot and value.
    fn verify_storage_slot(
        &self,
        target_commitment: Commitment,
        input: &[u8],
    ) -> ProverResult<(Address, U256, B256)>;
}

/// Fails unless `ctx` executes on `home`.
pub(crate) fn ensure_home_chain(ctx: &ExecCtx, home: ChainId) -> ProverResult<()> {
    if ctx.chain_id() != home {
        return Err(ProverError::CallNotOnHomeChain(ctx.chain_id(), home));
    }
    Ok(())
}
