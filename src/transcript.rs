//! Fiat-Shamir challenges.
//!
//! Every challenge is `keccak256(abi.encode(...))` read as a big-endian
//! integer mod the group order, so an on-chain verifier recomputes the
//! exact same values. Challenges chain: each new tuple starts with the
//! previous challenge as a `bytes32`.

use crate::abi::ToAbi;
use crate::scalar::Scalar;
use alloy_sol_types::{abi::TokenSeq, SolType, SolValue};
use sha3::{Digest, Keccak256};

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash bytes into the scalar field
pub fn hash_to_scalar(data: &[u8]) -> Scalar {
    Scalar::from_bytes_mod_order(&keccak256(data))
}

/// Challenge over a tuple of ABI values, encoded as call parameters
pub fn challenge<T>(values: &T) -> Scalar
where
    T: SolValue,
    for<'a> <T::SolType as SolType>::Token<'a>: TokenSeq<'a>,
{
    hash_to_scalar(&values.abi_encode_params())
}

/// Challenge that depends on the previous one alone
pub fn rehash(previous: &Scalar) -> Scalar {
    hash_to_scalar(&previous.to_abi().abi_encode())
}
