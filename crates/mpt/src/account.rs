//! Account and storage proofs on top of [`verify_proof`].

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{Decodable, RlpDecodable, RlpEncodable};

use crate::{
    errors::{MptError, MptResult},
    proof::verify_proof,
};

/// Account leaf of the state trie, `rlp([nonce, balance, storage_root, code_hash])`.
#[derive(Clone, Debug, Default, Eq, PartialEq, RlpEncodable, RlpDecodable)]
pub struct TrieAccount {
    pub nonce: u64,
    pub balance: U256,
    pub storage_root: B256,
    pub code_hash: B256,
}

/// Proves `address` against `state_root`.  `Ok(None)` means the proof shows the
/// account does not exist.
pub fn verify_account(
    state_root: B256,
    address: Address,
    proof: &[Bytes],
) -> MptResult<Option<TrieAccount>> {
    let key = keccak256(address);
    let Some(raw) = verify_proof(state_root, key.as_slice(), proof)? else {
        return Ok(None);
    };

    let mut buf = raw.as_slice();
    let account = TrieAccount::decode(&mut buf)?;
    if !buf.is_empty() {
        return Err(MptError::TrailingBytes("account"));
    }
    Ok(Some(account))
}

/// Proves the value of `slot` against an account's `storage_root`.  Absent slots
/// read as zero, as they do in the EVM.
pub fn verify_storage_value(storage_root: B256, slot: B256, proof: &[Bytes]) -> MptResult<U256> {
    let key = keccak256(slot);
    let Some(raw) = verify_proof(storage_root, key.as_slice(), proof)? else {
        return Ok(U256::ZERO);
    };

    let mut buf = raw.as_slice();
    let value = U256::decode(&mut buf)?;
    if !buf.is_empty() {
        return Err(MptError::TrailingBytes("storage value"));
    }
    Ok(value)
}
