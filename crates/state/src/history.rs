use alloy_primitives::B256;

/// Access to the executing chain's recent block hashes, the way `blockhash`
/// or the EIP-2935 history contract expose them.
pub trait BlockHashHistory: Send + Sync {
    /// Returns the hash of block `number`, if it's still within the window
    /// the chain keeps.
    fn block_hash(&self, number: u64) -> Option<B256>;
}

/// History that never knows any block.
#[derive(Copy, Clone, Debug, Default)]
pub struct EmptyHistory;

impl BlockHashHistory for EmptyHistory {
    fn block_hash(&self, _number: u64) -> Option<B256> {
        None
    }
}
