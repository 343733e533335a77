//! Constants for magic numbers and storage locations shared across crates.

use std::sync::LazyLock;

use alloy_primitives::{b256, B256, U256};

use crate::slots::derived_slot;

/// Storage slot holding a pointer's implementation code hash.  Derived from a
/// domain separation string so it doesn't depend on field declaration order and
/// can be read through raw storage proofs on any chain.
pub static POINTER_CODE_HASH_SLOT: LazyLock<B256> =
    LazyLock::new(|| derived_slot("eip7888.pointer.slot"));

/// First storage slot of a ring buffer's `blockNumberBuffer` array.
pub static BUFFER_RING_BASE_SLOT: LazyLock<B256> =
    LazyLock::new(|| derived_slot("waypoint.buffer.ring"));

/// Mapping base slot of the ring buffer's `blockHashMapping`.
pub const BLOCK_HASH_MAPPING_SLOT: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Default mapping base slot for a finalized root store's `key => commitment`
/// mapping.
pub const ROOT_STORE_MAPPING_SLOT: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Default ring buffer capacity.
pub const DEFAULT_BUFFER_SIZE: u64 = 393_168;

/// Default maximum number of hashes in one pushed batch.  Matches the EIP-2935
/// history window, which is as far back as a pusher can read block hashes.
pub const DEFAULT_MAX_BATCH_SIZE: u64 = 8_191;

/// Offset applied to a parent chain contract address when its message crosses
/// into an Arbitrum style child chain.
pub const L1_TO_L2_ALIAS_OFFSET: U256 =
    U256::from_limbs([0x0000_0000_0000_1111, 0x0000_0000_0000_0000, 0x1111_0000, 0]);

/// Root of an empty Merkle-Patricia trie, `keccak256(rlp(""))`.
pub const EMPTY_ROOT_HASH: B256 =
    b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");
