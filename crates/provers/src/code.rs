use alloy_primitives::{Address, U256};
use borsh::{BorshDeserialize, BorshSerialize};
use waypoint_primitives::prelude::*;

#[derive(Copy, Clone, Debug, Eq, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum ProverKind {
    Buffer,
    RootStore,
}

/// Everything that determines a prover's behavior.  Its borsh encoding serves
/// as the prover's "code", so two provers have equal code hashes exactly when
/// they would verify the same things.
#[derive(Clone, Debug, Eq, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct ProverCode {
    kind: ProverKind,
    home_chain_id: ChainId,
    target_chain_id: ChainId,
    version: u64,
    source: [u8; 20],
    mapping_slot: [u8; 32],
    target_kind: CommitmentKind,
}

impl ProverCode {
    pub fn new(
        kind: ProverKind,
        home_chain_id: ChainId,
        target_chain_id: ChainId,
        version: u64,
        source: Address,
        mapping_slot: U256,
        target_kind: CommitmentKind,
    ) -> Self {
        Self {
            kind,
            home_chain_id,
            target_chain_id,
            version,
            source: source.0.into(),
            mapping_slot: mapping_slot.to_be_bytes::<32>(),
            target_kind,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).expect("failed borsh serialization")
    }
}
