//! Walking a proof from a trusted root down to a key.

use alloy_primitives::{keccak256, Bytes, B256};
use waypoint_primitives::constants::EMPTY_ROOT_HASH;

use crate::{
    errors::{MptError, MptResult},
    nibbles::{decode_path, to_nibbles},
    node::{child_ref, list_items, string_payload, NodeRef},
};

/// Verifies `proof` against `root` for `key` (the raw, unhashed trie key).
///
/// Returns the value stored at the key, or `None` if the proof shows the key
/// is absent.  Every node reached by hash must be supplied in order, and every
/// supplied node must be used.
pub fn verify_proof(root: B256, key: &[u8], proof: &[Bytes]) -> MptResult<Option<Vec<u8>>> {
    if proof.is_empty() {
        return if root == EMPTY_ROOT_HASH {
            Ok(None)
        } else {
            Err(MptError::EmptyProof(root))
        };
    }

    let full_path = to_nibbles(key);
    let mut path = full_path.as_slice();
    let mut nodes = proof.iter();
    let mut next = NodeRef::Hash(root);

    let value = loop {
        let raw: &[u8] = match next {
            NodeRef::Hash(h) => {
                let node = nodes.next().ok_or(MptError::MissingNode(h))?;
                if keccak256(node) != h {
                    return Err(MptError::NodeHashMismatch(h));
                }
                node
            }
            NodeRef::Inline(raw) => raw,
        };

        let items = list_items(raw)?;
        match items.len() {
            17 => {
                let Some((&idx, rest)) = path.split_first() else {
                    let v = string_payload(items[16])?;
                    break (!v.is_empty()).then(|| v.to_vec());
                };
                match child_ref(items[idx as usize])? {
                    Some(child) => {
                        path = rest;
                        next = child;
                    }
                    None => break None,
                }
            }
            2 => {
                let (segment, is_leaf) = decode_path(string_payload(items[0])?)?;
                if is_leaf {
                    if segment.as_slice() == path {
                        break Some(string_payload(items[1])?.to_vec());
                    }
                    break None;
                }

                if !path.starts_with(&segment) {
                    break None;
                }
                path = &path[segment.len()..];
                next = child_ref(items[1])?
                    .ok_or(MptError::InvalidNode("extension without child"))?;
            }
            _ => return Err(MptError::InvalidNode("unexpected item count")),
        }
    };

    let unused = nodes.count();
    if unused > 0 {
        return Err(MptError::UnusedProofNodes(unused));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::keccak256;

    use super::*;
    use crate::builder::TrieBuilder;

    fn sample_trie() -> TrieBuilder {
        let mut trie = TrieBuilder::new();
        for i in 0u8..20 {
            trie.insert(keccak256([i]).as_slice(), vec![i + 1; 40]);
        }
        trie
    }

    #[test]
    fn test_inclusion_proofs_verify() {
        let trie = sample_trie();
        let root = trie.root();
        for i in 0u8..20 {
            let key = keccak256([i]);
            let proof = trie.proof(key.as_slice());
            let value = verify_proof(root, key.as_slice(), &proof).unwrap();
            assert_eq!(value, Some(vec![i + 1; 40]));
        }
    }

    #[test]
    fn test_exclusion_proof_returns_none() {
        let trie = sample_trie();
        let key = keccak256([200u8]);
        let proof = trie.proof(key.as_slice());
        assert_eq!(verify_proof(trie.root(), key.as_slice(), &proof).unwrap(), None);
    }

    #[test]
    fn test_single_leaf_trie() {
        let mut trie = TrieBuilder::new();
        let key = keccak256([7u8]);
        trie.insert(key.as_slice(), vec![0x2a]);
        let proof = trie.proof(key.as_slice());
        assert_eq!(proof.len(), 1);
        assert_eq!(
            verify_proof(trie.root(), key.as_slice(), &proof).unwrap(),
            Some(vec![0x2a])
        );
    }

    #[test]
    fn test_empty_trie() {
        let trie = TrieBuilder::new();
        assert_eq!(trie.root(), EMPTY_ROOT_HASH);
        assert_eq!(verify_proof(EMPTY_ROOT_HASH, &[1, 2, 3], &[]).unwrap(), None);
        assert_eq!(
            verify_proof(B256::repeat_byte(1), &[1, 2, 3], &[]),
            Err(MptError::EmptyProof(B256::repeat_byte(1)))
        );
    }

    #[test]
    fn test_tampered_node_rejected() {
        let trie = sample_trie();
        let key = keccak256([3u8]);
        let mut proof = trie.proof(key.as_slice());
        let last = proof.len() - 1;
        let mut node = proof[last].to_vec();
        let end = node.len() - 1;
        node[end] ^= 0x01;
        proof[last] = node.into();

        assert!(matches!(
            verify_proof(trie.root(), key.as_slice(), &proof),
            Err(MptError::NodeHashMismatch(_))
        ));
    }

    #[test]
    fn test_wrong_root_rejected() {
        let trie = sample_trie();
        let key = keccak256([3u8]);
        let proof = trie.proof(key.as_slice());
        assert!(matches!(
            verify_proof(B256::repeat_byte(9), key.as_slice(), &proof),
            Err(MptError::NodeHashMismatch(_))
        ));
    }

    #[test]
    fn test_extra_nodes_rejected() {
        let trie = sample_trie();
        let key = keccak256([3u8]);
        let mut proof = trie.proof(key.as_slice());
        proof.push(proof[0].clone());
        assert_eq!(
            verify_proof(trie.root(), key.as_slice(), &proof),
            Err(MptError::UnusedProofNodes(1))
        );
    }
}
