pub use alloy_primitives::{Address, Bytes, B256, U256};

pub use crate::chain::{ChainId, Commitment, CommitmentKind};
