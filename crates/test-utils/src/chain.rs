//! In-process dev chains.  Accounts are plain slot stores; sealing a block
//! commits every account into a real state trie so proofs can be taken
//! against any sealed block.

use std::{collections::BTreeMap, sync::Arc};

use alloy_consensus::Header;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use parking_lot::RwLock;
use waypoint_mpt::{TrieAccount, TrieBuilder};
use waypoint_primitives::{
    abi::{StorageSlotProof, StoredCommitmentProof},
    prelude::ChainId,
    slots::{u256_from_word, uint_mapping_slot},
};
use waypoint_state::prelude::*;

const GENESIS_TIMESTAMP: u64 = 1_700_000_000;
const BLOCK_TIME: u64 = 12;

fn timestamp_at(number: u64) -> u64 {
    GENESIS_TIMESTAMP + number * BLOCK_TIME
}

struct SealedBlock {
    header: Header,
    hash: B256,
    state: TrieBuilder,
    storage: BTreeMap<Address, TrieBuilder>,
}

/// Block hash history as seen by calls on a dev chain.
struct ChainHistory {
    hashes: Arc<RwLock<Vec<B256>>>,
}

impl BlockHashHistory for ChainHistory {
    fn block_hash(&self, number: u64) -> Option<B256> {
        self.hashes.read().get(number as usize).copied()
    }
}

pub struct DevChain {
    chain_id: ChainId,
    accounts: RwLock<BTreeMap<Address, Arc<MemSlotStore>>>,
    blocks: Vec<SealedBlock>,
    hashes: Arc<RwLock<Vec<B256>>>,
}

impl DevChain {
    /// Creates a chain with an empty genesis block.
    pub fn new(chain_id: ChainId) -> Self {
        let mut chain = Self {
            chain_id,
            accounts: RwLock::new(BTreeMap::new()),
            blocks: Vec::new(),
            hashes: Arc::new(RwLock::new(Vec::new())),
        };
        chain.seal();
        chain
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// Storage of `account`, created empty on first access.
    pub fn store(&self, account: Address) -> Arc<MemSlotStore> {
        self.accounts
            .write()
            .entry(account)
            .or_insert_with(|| Arc::new(MemSlotStore::new()))
            .clone()
    }

    /// Number of the latest sealed block.
    pub fn head(&self) -> u64 {
        self.blocks.len() as u64 - 1
    }

    /// Context for a call in the next, not yet sealed, block.
    pub fn pending_ctx(&self, caller: Address) -> ExecCtx {
        let number = self.head() + 1;
        let history = Arc::new(ChainHistory {
            hashes: self.hashes.clone(),
        });
        ExecCtx::new(self.chain_id, number, timestamp_at(number), history).with_caller(caller)
    }

    /// Commits the current state of every account into a new block and
    /// returns its number.
    pub fn seal(&mut self) -> u64 {
        let number = self.blocks.len() as u64;
        let parent_hash = self.blocks.last().map(|b| b.hash).unwrap_or_default();

        let mut state = TrieBuilder::new();
        let mut storage = BTreeMap::new();
        for (addr, store) in self.accounts.read().iter() {
            let mut trie = TrieBuilder::new();
            let slots = store.non_zero_slots().expect("mem store is infallible");
            for (slot, value) in slots {
                trie.insert(
                    keccak256(slot).as_slice(),
                    alloy_rlp::encode(u256_from_word(value)),
                );
            }

            let account = TrieAccount {
                nonce: 1,
                balance: U256::ZERO,
                storage_root: trie.root(),
                code_hash: keccak256(addr),
            };
            state.insert(keccak256(addr).as_slice(), alloy_rlp::encode(&account));
            storage.insert(*addr, trie);
        }

        let header = Header {
            parent_hash,
            number,
            timestamp: timestamp_at(number),
            state_root: state.root(),
            ..Default::default()
        };
        let hash = header.hash_slow();

        self.hashes.write().push(hash);
        self.blocks.push(SealedBlock {
            header,
            hash,
            state,
            storage,
        });
        number
    }

    fn block(&self, number: u64) -> &SealedBlock {
        self.blocks
            .get(number as usize)
            .unwrap_or_else(|| panic!("block {number} not sealed on chain {}", self.chain_id))
    }

    pub fn block_hash(&self, number: u64) -> Option<B256> {
        self.blocks.get(number as usize).map(|b| b.hash)
    }

    pub fn header(&self, number: u64) -> Option<Header> {
        self.blocks.get(number as usize).map(|b| b.header.clone())
    }

    pub fn state_root(&self, number: u64) -> Option<B256> {
        self.blocks.get(number as usize).map(|b| b.header.state_root)
    }

    pub fn timestamp(&self, number: u64) -> u64 {
        timestamp_at(number)
    }

    fn proofs(&self, number: u64, account: Address, slot: B256) -> (Vec<Bytes>, Vec<Bytes>) {
        let block = self.block(number);
        let account_proof = block.state.proof(keccak256(account).as_slice());
        let storage_proof = block
            .storage
            .get(&account)
            .map(|trie| trie.proof(keccak256(slot).as_slice()))
            .unwrap_or_default();
        (account_proof, storage_proof)
    }

    /// Proof of `account`'s `slot` at block `number`, starting from the block
    /// header.
    pub fn storage_proof(&self, number: u64, account: Address, slot: B256) -> StorageSlotProof {
        let (account_proof, storage_proof) = self.proofs(number, account, slot);
        StorageSlotProof {
            rlpBlockHeader: alloy_rlp::encode(&self.block(number).header).into(),
            account,
            slot: u256_from_word(slot),
            accountProof: account_proof,
            storageProof: storage_proof,
        }
    }

    /// Like [`Self::storage_proof`] but proving from the bare state root.
    pub fn state_root_storage_proof(
        &self,
        number: u64,
        account: Address,
        slot: B256,
    ) -> StorageSlotProof {
        StorageSlotProof {
            rlpBlockHeader: Bytes::new(),
            ..self.storage_proof(number, account, slot)
        }
    }

    /// Proof of `mapping[key]` (mapping at `base`) in `account` at block
    /// `number`.
    pub fn commitment_proof(
        &self,
        number: u64,
        account: Address,
        key: U256,
        base: U256,
    ) -> StoredCommitmentProof {
        let (account_proof, storage_proof) =
            self.proofs(number, account, uint_mapping_slot(key, base));
        StoredCommitmentProof {
            rlpBlockHeader: alloy_rlp::encode(&self.block(number).header).into(),
            key,
            accountProof: account_proof,
            storageProof: storage_proof,
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_rlp::Decodable;
    use waypoint_mpt::{verify_account, verify_storage_value};

    use super::*;

    #[test]
    fn test_sealed_blocks_link() {
        let mut chain = DevChain::new(5);
        let a = chain.seal();
        let b = chain.seal();
        assert_eq!((a, b), (1, 2));
        assert_eq!(
            chain.header(b).unwrap().parent_hash,
            chain.block_hash(a).unwrap()
        );

        let ctx = chain.pending_ctx(Address::ZERO);
        assert_eq!(ctx.block_number(), 3);
        assert_eq!(ctx.block_hash(2), chain.block_hash(2));
        assert_eq!(ctx.block_hash(3), None);
    }

    #[test]
    fn test_proofs_match_sealed_state() {
        let mut chain = DevChain::new(5);
        let account = Address::repeat_byte(0xaa);
        let slot = B256::with_last_byte(1);

        let mut batch = WriteBatch::new();
        batch.put_u256(slot, U256::from(99));
        chain.store(account).apply_batch(batch).unwrap();
        let first = chain.seal();

        let mut batch = WriteBatch::new();
        batch.put_u256(slot, U256::from(100));
        chain.store(account).apply_batch(batch).unwrap();
        chain.seal();

        // Proofs against the older block still see the older value.
        let proof = chain.storage_proof(first, account, slot);
        let mut buf = &proof.rlpBlockHeader[..];
        let header = Header::decode(&mut buf).unwrap();
        assert_eq!(keccak256(&proof.rlpBlockHeader), chain.block_hash(first).unwrap());

        let acct = verify_account(header.state_root, account, &proof.accountProof)
            .unwrap()
            .unwrap();
        let value = verify_storage_value(acct.storage_root, slot, &proof.storageProof).unwrap();
        assert_eq!(value, U256::from(99));
    }
}
