//! Merkle-Patricia trie support: walking account and storage proofs against a
//! state root, and building tries (with proofs) from a set of entries.

pub mod account;
pub mod builder;
pub mod errors;
pub mod nibbles;
mod node;
pub mod proof;

pub use account::{verify_account, verify_storage_value, TrieAccount};
pub use builder::TrieBuilder;
pub use errors::{MptError, MptResult};
pub use proof::verify_proof;
