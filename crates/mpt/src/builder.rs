//! In-memory trie construction.  Used by dev chains to commit their state and
//! hand out proofs that [`verify_proof`](crate::verify_proof) accepts.

use std::collections::BTreeMap;

use alloy_primitives::{keccak256, Bytes, B256};
use alloy_rlp::{Encodable, Header, EMPTY_STRING_CODE};
use waypoint_primitives::constants::EMPTY_ROOT_HASH;

use crate::nibbles::{encode_path, to_nibbles};

#[derive(Clone, Debug)]
enum Node {
    Leaf {
        path: Vec<u8>,
        value: Vec<u8>,
    },
    Extension {
        path: Vec<u8>,
        child: Box<Node>,
    },
    Branch {
        children: [Option<Box<Node>>; 16],
        value: Option<Vec<u8>>,
    },
}

impl Node {
    fn encode(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        match self {
            Node::Leaf { path, value } => {
                encode_path(path, true).as_slice().encode(&mut payload);
                value.as_slice().encode(&mut payload);
            }
            Node::Extension { path, child } => {
                encode_path(path, false).as_slice().encode(&mut payload);
                payload.extend(child_reference(child));
            }
            Node::Branch { children, value } => {
                for child in children {
                    match child {
                        Some(c) => payload.extend(child_reference(c)),
                        None => payload.push(EMPTY_STRING_CODE),
                    }
                }
                match value {
                    Some(v) => v.as_slice().encode(&mut payload),
                    None => payload.push(EMPTY_STRING_CODE),
                }
            }
        }

        let mut out = Vec::with_capacity(payload.len() + 3);
        Header {
            list: true,
            payload_length: payload.len(),
        }
        .encode(&mut out);
        out.extend(payload);
        out
    }
}

/// Short encodings are embedded in the parent, anything else by hash.
fn child_reference(node: &Node) -> Vec<u8> {
    let enc = node.encode();
    if enc.len() < 32 {
        enc
    } else {
        alloy_rlp::encode(keccak256(&enc))
    }
}

/// Builds a node over `entries`, all of which share their first `depth`
/// nibbles.  Entries must be sorted and non-empty.
fn build(entries: &[(&Vec<u8>, &Vec<u8>)], depth: usize) -> Node {
    if let [(path, value)] = entries {
        return Node::Leaf {
            path: path[depth..].to_vec(),
            value: value.to_vec(),
        };
    }

    let first = &entries[0].0[depth..];
    let last = &entries[entries.len() - 1].0[depth..];
    let shared = first
        .iter()
        .zip(last.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if shared > 0 {
        return Node::Extension {
            path: first[..shared].to_vec(),
            child: Box::new(build(entries, depth + shared)),
        };
    }

    let mut children: [Option<Box<Node>>; 16] = std::array::from_fn(|_| None);
    let mut value = None;
    let mut rest = entries;

    if rest[0].0.len() == depth {
        value = Some(rest[0].1.to_vec());
        rest = &rest[1..];
    }

    while let Some((path, _)) = rest.first() {
        let nibble = path[depth];
        let end = rest
            .iter()
            .position(|(p, _)| p[depth] != nibble)
            .unwrap_or(rest.len());
        children[nibble as usize] = Some(Box::new(build(&rest[..end], depth + 1)));
        rest = &rest[end..];
    }

    Node::Branch { children, value }
}

/// Collects the nodes a verifier needs to walk `path` from `node`.
fn collect_proof(node: &Node, path: &[u8], is_root: bool, out: &mut Vec<Bytes>) {
    let enc = node.encode();
    if is_root || enc.len() >= 32 {
        out.push(enc.into());
    }

    match node {
        Node::Leaf { .. } => {}
        Node::Extension { path: seg, child } => {
            if path.starts_with(seg) {
                collect_proof(child, &path[seg.len()..], false, out);
            }
        }
        Node::Branch { children, .. } => {
            if let Some((&nibble, rest)) = path.split_first() {
                if let Some(child) = &children[nibble as usize] {
                    collect_proof(child, rest, false, out);
                }
            }
        }
    }
}

/// Accumulates key/value pairs and produces the root and proofs of the trie
/// holding them.  Values are stored as given; callers RLP encode them first.
#[derive(Clone, Debug, Default)]
pub struct TrieBuilder {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl TrieBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &[u8], value: Vec<u8>) {
        self.entries.insert(to_nibbles(key), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn root_node(&self) -> Option<Node> {
        if self.entries.is_empty() {
            return None;
        }
        let entries = self.entries.iter().collect::<Vec<_>>();
        Some(build(&entries, 0))
    }

    pub fn root(&self) -> B256 {
        match self.root_node() {
            Some(node) => keccak256(node.encode()),
            None => EMPTY_ROOT_HASH,
        }
    }

    /// Proof for `key`, an inclusion proof if present and an exclusion proof
    /// otherwise.
    pub fn proof(&self, key: &[u8]) -> Vec<Bytes> {
        let mut out = Vec::new();
        if let Some(node) = self.root_node() {
            collect_proof(&node, &to_nibbles(key), true, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{b256, U256};

    use super::*;
    use crate::proof::verify_proof;

    #[test]
    fn test_known_root() {
        // Test vector from the Ethereum wiki's Patricia tree page.
        let mut trie = TrieBuilder::new();
        trie.insert(b"do", b"verb".to_vec());
        trie.insert(b"dog", b"puppy".to_vec());
        trie.insert(b"doge", b"coin".to_vec());
        trie.insert(b"horse", b"stallion".to_vec());
        assert_eq!(
            trie.root(),
            b256!("5991bb8c6514148a29db676a14ac506cd2cd5775ace63c30a4fe457715e9ac84")
        );
    }

    #[test]
    fn test_value_at_branch() {
        let mut trie = TrieBuilder::new();
        trie.insert(b"do", b"verb".to_vec());
        trie.insert(b"dog", b"puppy".to_vec());
        trie.insert(b"doge", b"coin".to_vec());

        let cases: [(&[u8], &[u8]); 3] = [(b"do", b"verb"), (b"dog", b"puppy"), (b"doge", b"coin")];
        for (k, v) in cases {
            let proof = trie.proof(k);
            assert_eq!(verify_proof(trie.root(), k, &proof).unwrap(), Some(v.to_vec()));
        }

        let proof = trie.proof(b"dot");
        assert_eq!(verify_proof(trie.root(), b"dot", &proof).unwrap(), None);
    }

    #[test]
    fn test_root_changes_with_value() {
        let mut trie = TrieBuilder::new();
        let key = keccak256(B256::ZERO);
        trie.insert(key.as_slice(), alloy_rlp::encode(U256::from(1)));
        let before = trie.root();
        trie.insert(key.as_slice(), alloy_rlp::encode(U256::from(2)));
        assert_ne!(before, trie.root());
        assert_eq!(trie.len(), 1);
    }
}
