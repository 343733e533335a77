//! Chain identity and commitment types.

use std::fmt;

use alloy_primitives::B256;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// EIP-155 style chain identifier.
pub type ChainId = u64;

/// Opaque 32-byte value anchoring a chain's state at a point in time.  Depending
/// on the hop this is either a block hash or a state root, see
/// [`CommitmentKind`].
pub type Commitment = B256;

/// What a [`Commitment`] produced by a hop actually commits to.  Adjacent hops
/// in a route must agree on this, but nothing enforces it beyond proofs failing
/// to verify when they don't.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CommitmentKind {
    /// Hash of an RLP encoded block header.
    #[default]
    BlockHash,

    /// Root of the account state trie.
    StateRoot,
}

impl fmt::Display for CommitmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockHash => f.write_str("block-hash"),
            Self::StateRoot => f.write_str("state-root"),
        }
    }
}
