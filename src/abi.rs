//! Ethereum ABI views of protocol values.
//!
//! Scalars travel as `bytes32`, points as `bytes32[2]` and point lists as
//! `bytes32[2][]`. Encoding itself is done by `alloy-sol-types`.

use crate::errors::ProofError;
use crate::group::GroupElement;
use crate::scalar::{decode_hex, Scalar};
use alloy_primitives::{B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 20-byte account address
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub fn from_hex(s: &str) -> Result<Self, ProofError> {
        let bytes = decode_hex(s).map_err(|_| ProofError::InvalidAddress(s.to_string()))?;
        let out: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ProofError::InvalidAddress(s.to_string()))?;
        Ok(Address(out))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Conversion into the Solidity value a contract sees
pub trait ToAbi {
    type Value: SolValue;

    fn to_abi(&self) -> Self::Value;
}

impl ToAbi for Scalar {
    type Value = B256;

    fn to_abi(&self) -> B256 {
        B256::new(self.to_bytes())
    }
}

impl ToAbi for GroupElement {
    type Value = [B256; 2];

    fn to_abi(&self) -> [B256; 2] {
        let bytes = self.to_bytes();
        [B256::from_slice(&bytes[..32]), B256::from_slice(&bytes[32..])]
    }
}

impl ToAbi for [GroupElement] {
    type Value = Vec<[B256; 2]>;

    fn to_abi(&self) -> Vec<[B256; 2]> {
        self.iter().map(|p| p.to_abi()).collect()
    }
}

impl ToAbi for Address {
    type Value = alloy_primitives::Address;

    fn to_abi(&self) -> alloy_primitives::Address {
        alloy_primitives::Address::new(self.0)
    }
}

/// `uint256` holding `value`
pub fn uint(value: u64) -> U256 {
    U256::from(value)
}

/// Point from the two words of a `bytes32[2]`
pub fn point_from_words(x: &B256, y: &B256) -> Result<GroupElement, ProofError> {
    let mut bytes = [0u8; 64];
    bytes[..32].copy_from_slice(x.as_slice());
    bytes[32..].copy_from_slice(y.as_slice());
    GroupElement::from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_layout() {
        let addr = Address::from_hex("0xE4920905e06c6B6070477c40B85756ffDa3cD3E6").unwrap();
        let encoded = (uint(16), addr.to_abi()).abi_encode_params();
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 16);
        assert!(encoded[32..44].iter().all(|b| *b == 0));
        assert_eq!(&encoded[44..], &addr.0);
    }

    #[test]
    fn test_point_is_inline() {
        let g = GroupElement::base();
        let encoded = (g.to_abi(), uint(1)).abi_encode_params();
        assert_eq!(encoded.len(), 96);
        assert_eq!(&encoded[..64], &g.to_bytes()[..]);
    }

    #[test]
    fn test_point_lists_are_dynamic() {
        let g = GroupElement::base();
        let encoded = ([g, g].to_abi(), g.to_abi(), [g].to_abi()).abi_encode_params();
        // head: offset, point, offset
        assert_eq!(encoded[31], 128);
        assert_eq!(&encoded[32..96], &g.to_bytes()[..]);
        assert_eq!(U256::from_be_slice(&encoded[96..128]), uint(128 + 32 + 128));
        assert_eq!(encoded[159], 2);
        assert_eq!(encoded[319], 1);
        assert_eq!(encoded.len(), 128 + 32 + 128 + 32 + 64);
    }

    #[test]
    fn test_point_words_roundtrip() {
        let p = GroupElement::base() * Scalar::from_u64(77);
        let [x, y] = p.to_abi();
        assert_eq!(point_from_words(&x, &y).unwrap(), p);
        assert_eq!(
            point_from_words(&B256::ZERO, &B256::ZERO).unwrap(),
            GroupElement::identity()
        );
    }

    #[test]
    fn test_bad_address() {
        assert!(Address::from_hex("0x1234").is_err());
        assert!(Address::from_hex("0xnothex").is_err());
    }
}
