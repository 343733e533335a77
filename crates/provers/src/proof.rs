//! Proof walking shared by the prover variants.

use alloy_consensus::Header;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::Decodable;
use alloy_sol_types::{SolType, SolValue};
use waypoint_mpt::{verify_account, verify_storage_value};
use waypoint_primitives::{abi::StorageSlotProof, prelude::*, slots::word_from_u256};

use crate::errors::{ProverError, ProverResult};

/// Strictly decodes an ABI encoded hop input.
pub fn decode_input<T: SolType>(input: &[u8]) -> ProverResult<T::RustType> {
    T::abi_decode(input, true).map_err(|_| ProverError::MalformedInput)
}

/// Decodes an `abi.encode(uint256)` input.
pub fn decode_uint_input(input: &[u8]) -> ProverResult<U256> {
    <U256 as SolValue>::abi_decode(input, true).map_err(|_| ProverError::MalformedInput)
}

/// Returns the state root of an RLP header after checking it hashes to
/// `block_hash`.  Fails with `mismatch` if it doesn't.
pub fn header_state_root(rlp: &[u8], block_hash: B256, mismatch: ProverError) -> ProverResult<B256> {
    if keccak256(rlp) != block_hash {
        return Err(mismatch);
    }

    let mut buf = rlp;
    let header = Header::decode(&mut buf)?;
    if !buf.is_empty() {
        return Err(ProverError::MalformedInput);
    }
    Ok(header.state_root)
}

/// State root behind a target commitment of the given kind.
pub fn target_state_root(
    kind: CommitmentKind,
    commitment: Commitment,
    rlp_header: &[u8],
) -> ProverResult<B256> {
    match kind {
        CommitmentKind::BlockHash => header_state_root(
            rlp_header,
            commitment,
            ProverError::InvalidTargetBlockHeader(commitment),
        ),
        CommitmentKind::StateRoot => {
            if !rlp_header.is_empty() {
                return Err(ProverError::UnexpectedBlockHeader);
            }
            Ok(commitment)
        }
    }
}

/// Proves `account`'s storage at `slot` under `state_root`.  A missing
/// account is an error, a missing slot reads as zero.
pub fn prove_slot(
    state_root: B256,
    account: Address,
    slot: B256,
    account_proof: &[Bytes],
    storage_proof: &[Bytes],
) -> ProverResult<B256> {
    let acct = verify_account(state_root, account, account_proof)?
        .ok_or(ProverError::AccountNotFound(account))?;
    let value = verify_storage_value(acct.storage_root, slot, storage_proof)?;
    Ok(word_from_u256(value))
}

/// `verify_storage_slot` for any prover whose target commitments are of the
/// given kind.
pub fn verify_slot_proof(
    kind: CommitmentKind,
    target_commitment: Commitment,
    input: &[u8],
) -> ProverResult<(Address, U256, B256)> {
    let proof = decode_input::<StorageSlotProof>(input)?;
    let state_root = target_state_root(kind, target_commitment, &proof.rlpBlockHeader)?;
    let value = prove_slot(
        state_root,
        proof.account,
        word_from_u256(proof.slot),
        &proof.accountProof,
        &proof.storageProof,
    )?;
    Ok((proof.account, proof.slot, value))
}
