//! Parent to child hop through a finalized root store.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use tracing::*;
use waypoint_primitives::{abi::StoredCommitmentProof, prelude::*, slots::uint_mapping_slot};
use waypoint_state::prelude::*;

use crate::{
    code::{ProverCode, ProverKind},
    errors::{ProverError, ProverResult},
    proof::{decode_input, decode_uint_input, header_state_root, prove_slot, verify_slot_proof},
    prover::{ensure_home_chain, HopProver},
    root_store::FinalizedRootStore,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RootStoreProverConfig {
    /// The parent chain the store lives on.
    pub home_chain_id: ChainId,

    /// The child chain whose commitments are stored.
    pub target_chain_id: ChainId,

    pub version: u64,

    /// Address of the store on the home chain.
    pub store: Address,

    /// Base slot of the store's `key => commitment` mapping.
    pub mapping_slot: U256,

    /// Whether stored commitments are child block hashes or state roots.
    pub target_kind: CommitmentKind,
}

/// Proves child chain commitments out of a parent chain's finalized root
/// store.
pub struct RootStoreProver {
    config: RootStoreProverConfig,
    source: Option<Arc<FinalizedRootStore>>,
}

impl RootStoreProver {
    /// Prover deployed on the home chain, reading `store` directly.
    pub fn new(config: RootStoreProverConfig, store: Arc<FinalizedRootStore>) -> Self {
        let config = RootStoreProverConfig {
            store: store.address(),
            ..config
        };
        Self {
            config,
            source: Some(store),
        }
    }

    pub fn copy(config: RootStoreProverConfig) -> Self {
        Self {
            config,
            source: None,
        }
    }

    pub fn config(&self) -> &RootStoreProverConfig {
        &self.config
    }
}

impl HopProver for RootStoreProver {
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
            ProverKind::RootStore,
            self.config.home_chain_id,
            self.config.target_chain_id,
            self.config.version,
            self.config.store,
            self.config.mapping_slot,
            self.config.target_kind,
        )
        .to_bytes()
    }

    fn get_target_commitment(&self, ctx: &ExecCtx, input: &[u8]) -> ProverResult<Commitment> {
        ensure_home_chain(ctx, self.config.home_chain_id)?;
        let key = decode_uint_input(input)?;

        let store = self.source.as_ref().ok_or(ProverError::NoCommitmentSource)?;
        let commitment = store.commitment(key)?;
        if commitment.is_zero() {
            return Err(ProverError::TargetCommitmentNotFound(key));
        }
        Ok(commitment)
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

        let commitment = prove_slot(
            state_root,
            self.config.store,
            uint_mapping_slot(proof.key, self.config.mapping_slot),
            &proof.accountProof,
            &proof.storageProof,
        )?;
        if commitment == B256::ZERO {
            return Err(ProverError::TargetCommitmentNotFound(proof.key));
        }

        trace!(key = %proof.key, %commitment, kind = %self.config.target_kind, "proved stored commitment");
        Ok(commitment)
    }

    fn verify_storage_slot(
        &self,
        target_commitment: Commitment,
        input: &[u8],
    ) -> ProverResult<(Address, U256, B256)> {
        verify_slot_proof(self.config.target_kind, target_commitment, input)
    }
}
