//! Storage slot derivation, following Solidity's layout rules so that values
//! written by our components can be read back through ordinary storage proofs.

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;

/// Slot derived from a domain separation string, `keccak256(tag) - 1`.  The
/// subtraction removes the known preimage so the slot can't collide with a
/// mapping entry.
pub fn derived_slot(tag: &str) -> B256 {
    let h = U256::from_be_bytes(keccak256(tag.as_bytes()).0);
    word_from_u256(h.wrapping_sub(U256::from(1)))
}

/// Slot of `mapping[key]` for a mapping declared at `base`,
/// `keccak256(abi.encode(key, base))`.
pub fn mapping_slot(key: B256, base: U256) -> B256 {
    keccak256((key, base).abi_encode())
}

/// Slot of `mapping[key]` for a mapping keyed by `uint256`.
pub fn uint_mapping_slot(key: U256, base: U256) -> B256 {
    mapping_slot(word_from_u256(key), base)
}

/// Slot at `base + offset`, used for fixed size arrays.
pub fn offset_slot(base: B256, offset: u64) -> B256 {
    word_from_u256(U256::from_be_bytes(base.0).wrapping_add(U256::from(offset)))
}

/// Slot a broadcaster records `message` from `publisher` at,
/// `keccak256(abi.encode(message, publisher))`.
pub fn message_slot(message: B256, publisher: Address) -> B256 {
    keccak256((message, publisher).abi_encode())
}

/// Folds one more address into a route accumulator,
/// `keccak256(abi.encode(acc, addr))`.
pub fn accumulate_id(acc: B256, addr: Address) -> B256 {
    keccak256((acc, addr).abi_encode())
}

pub fn word_from_u256(v: U256) -> B256 {
    B256::from(v.to_be_bytes::<32>())
}

pub fn u256_from_word(w: B256) -> U256 {
    U256::from_be_bytes(w.0)
}

pub fn word_from_address(addr: Address) -> B256 {
    addr.into_word()
}

/// Interprets the low 20 bytes of a storage word as an address.
pub fn address_from_word(w: B256) -> Address {
    Address::from_word(w)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    #[test]
    fn test_mapping_slot_matches_manual_encoding() {
        let key = B256::repeat_byte(0x42);
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(key.as_slice());
        buf[63] = 1;
        assert_eq!(mapping_slot(key, U256::from(1)), keccak256(buf));
    }

    #[test]
    fn test_message_slot_pads_publisher() {
        let message = B256::repeat_byte(0xaa);
        let publisher = address!("00000000000000000000000000000000000000ff");
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(message.as_slice());
        buf[63] = 0xff;
        assert_eq!(message_slot(message, publisher), keccak256(buf));
    }

    #[test]
    fn test_derived_slot_is_hash_minus_one() {
        let tag = "eip7888.pointer.slot";
        let slot = u256_from_word(derived_slot(tag));
        let h = u256_from_word(keccak256(tag.as_bytes()));
        assert_eq!(slot + U256::from(1), h);
    }

    #[test]
    fn test_address_word_roundtrip() {
        let addr = address!("1111000000000000000000000000000000001111");
        assert_eq!(address_from_word(word_from_address(addr)), addr);
    }
}
