//! Sender address aliasing applied when a message crosses from a parent chain
//! into an Arbitrum style child chain.

use alloy_primitives::{Address, U256};

use crate::constants::L1_TO_L2_ALIAS_OFFSET;

fn address_mask() -> U256 {
    (U256::from(1) << 160) - U256::from(1)
}

/// Address a parent chain contract shows up as on the child chain.
pub fn apply_l1_to_l2_alias(addr: Address) -> Address {
    let aliased = U256::from_be_slice(addr.as_slice()).wrapping_add(L1_TO_L2_ALIAS_OFFSET);
    to_address(aliased & address_mask())
}

fn to_address(v: U256) -> Address {
    Address::from_slice(&v.to_be_bytes::<32>()[12..])
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    #[test]
    fn test_alias_adds_offset() {
        let addr = address!("0000000000000000000000000000000000000001");
        assert_eq!(
            apply_l1_to_l2_alias(addr),
            address!("1111000000000000000000000000000000001112")
        );
    }

    #[test]
    fn test_alias_wraps_around() {
        let addr = address!("ffffffffffffffffffffffffffffffffffffffff");
        assert_eq!(
            apply_l1_to_l2_alias(addr),
            address!("1111000000000000000000000000000000001110")
        );
    }
}
