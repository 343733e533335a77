use alloy_primitives::B256;
use thiserror::Error;

pub type MptResult<T> = Result<T, MptError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MptError {
    #[error("proof is empty but root {0} is not the empty trie")]
    EmptyProof(B256),

    #[error("proof ended before reaching node {0}")]
    MissingNode(B256),

    #[error("proof node does not hash to expected {0}")]
    NodeHashMismatch(B256),

    #[error("proof has {0} unused trailing nodes")]
    UnusedProofNodes(usize),

    #[error("malformed trie node: {0}")]
    InvalidNode(&'static str),

    #[error("trailing bytes after encoded {0}")]
    TrailingBytes(&'static str),

    #[error("rlp: {0}")]
    Rlp(#[from] alloy_rlp::Error),
}
