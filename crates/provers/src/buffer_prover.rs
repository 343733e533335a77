//! Child to parent hop through a block hash buffer.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use tracing::*;
use waypoint_blockhash::{block_hash_slot, RingBuffer};
use waypoint_primitives::{abi::StoredCommitmentProof, constants::BLOCK_HASH_MAPPING_SLOT, prelude::*};
use waypoint_state::prelude::*;

use crate::{
    code::{ProverCode, ProverKind},
    errors::{ProverError, ProverResult},
    proof::{decode_input, decode_uint_input, header_state_root, prove_slot, verify_slot_proof},
    prover::{ensure_home_chain, HopProver},
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BufferProverConfig {
    /// The child chain the buffer lives on.
    pub home_chain_id: ChainId,

    /// The parent chain whose block hashes are buffered.
    pub target_chain_id: ChainId,

    pub version: u64,

    /// Address of the ring buffer on the home chain.
    pub buffer: Address,
}

/// Proves parent chain block hashes out of a child chain's [`RingBuffer`].
/// Target commitments are parent chain block hashes.
pub struct BufferProver {
    config: BufferProverConfig,
    source: Option<Arc<RingBuffer>>,
}

impl BufferProver {
    /// Prover deployed on the home chain, reading `buffer` directly.
    pub fn new(
        home_chain_id: ChainId,
        target_chain_id: ChainId,
        version: u64,
        buffer: Arc<RingBuffer>,
    ) -> Self {
        let config = BufferProverConfig {
            home_chain_id,
            target_chain_id,
            version,
            buffer: buffer.address(),
        };
        Self {
            config,
            source: Some(buffer),
        }
    }

    /// Copy of a prover for use on some other chain.  It verifies exactly what
    /// the original does but can't read the buffer.
    pub fn copy(config: BufferProverConfig) -> Self {
        Self {
            config,
            source: None,
        }
    }

    pub fn config(&self) -> &BufferProverConfig {
        &self.config
    }
}

impl HopProver for BufferProver {
    fn home_chain_id(&self) -> ChainId {
        self.config.home_chain_id
    }

    fn target_chain_id(&self) -> ChainId {
        self.config.target_chain_id
    }

    fn version(&self) -> u64 {
        self.config.version
    }

    fn code(&self) -> Vec<u8> {
        ProverCode::new(
            ProverKind::Buffer,
            self.config.home_chain_id,
            self.config.target_chain_id,
            self.config.version,
            self.config.buffer,
            BLOCK_HASH_MAPPING_SLOT,
            CommitmentKind::BlockHash,
        )
        .to_bytes()
    }

    fn get_target_commitment(&self, ctx: &ExecCtx, input: &[u8]) -> ProverResult<Commitment> {
        ensure_home_chain(ctx, self.config.home_chain_id)?;
        let number = decode_uint_input(input)?;
        let number: u64 = number
            .try_into()
            .map_err(|_| ProverError::TargetCommitmentNotFound(number))?;

        let buffer = self.source.as_ref().ok_or(ProverError::NoCommitmentSource)?;
        Ok(buffer.parent_chain_block_hash(number)?)
    }

    fn verify_target_commitment(
        &self,
        home_commitment: Commitment,
        input: &[u8],
    ) -> ProverResult<Commitment> {
        let proof = decode_input::<StoredCommitmentProof>(input)?;
        let state_root = header_state_root(
            &proof.rlpBlockHeader,
            home_commitment,
            ProverError::InvalidHomeBlockHeader(home_commitment),
        )?;

        let number: u64 = proof
            .key
            .try_into()
            .map_err(|_| ProverError::TargetCommitmentNotFound(proof.key))?;
        let hash = prove_slot(
            state_root,
            self.config.buffer,
            block_hash_slot(number),
            &proof.accountProof,
            &proof.storageProof,
        )?;
        if hash == B256::ZERO {
            return Err(ProverError::TargetCommitmentNotFound(U256::from(number)));
        }

        trace!(%number, %hash, "proved buffered block hash");
        Ok(hash)
    }

    fn verify_storage_slot(
        &self,
        target_commitment: Commitment,
        input: &[u8],
    ) -> ProverResult<(Address, U256, B256)> {
        verify_slot_proof(CommitmentKind::BlockHash, target_commitment, input)
    }
}
