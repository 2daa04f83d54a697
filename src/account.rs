//! Accounts, epoch nonces, balance decryption and registration signatures

use crate::abi::{uint, Address, ToAbi};
use crate::group::GroupElement;
use crate::random::ScalarSource;
use crate::scalar::Scalar;
use crate::transcript::{challenge, keccak256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

/// Largest balance `read_balance` searches for
pub const B_MAX: u64 = 4_294_967_295;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub x: Scalar,
    #[serde(rename = "y")]
    pub Y: GroupElement,
}

impl Account {
    /// Fresh key pair
    pub fn generate<S: ScalarSource>(source: &mut S) -> Self {
        Account::with_secret(source.random_scalar(b"account"))
    }

    pub fn with_secret(x: Scalar) -> Self {
        Account {
            x,
            Y: GroupElement::base() * x,
        }
    }
}

/// Per-epoch nonce base: `map_into(keccak256("Zether" || uint256(epoch)))`
pub fn g_epoch(epoch: u64) -> GroupElement {
    let mut seed = b"Zether".to_vec();
    seed.extend_from_slice(&uint(epoch).abi_encode());
    GroupElement::map_into(&keccak256(&seed))
}

/// Epoch nonce `GEpoch(epoch) * x`
pub fn u(epoch: u64, x: &Scalar) -> GroupElement {
    g_epoch(epoch) * *x
}

/// Recover a balance from `(CL, CR)` by walking `g, 2g, ...` up to
/// [`B_MAX`]. `None` when the search bound is exhausted.
pub fn read_balance(CL: &GroupElement, CR: &GroupElement, x: &Scalar) -> Option<u64> {
    read_balance_bounded(CL, CR, x, B_MAX)
}

pub fn read_balance_bounded(
    CL: &GroupElement,
    CR: &GroupElement,
    x: &Scalar,
    bound: u64,
) -> Option<u64> {
    let g = GroupElement::base();
    let gB = *CL - *CR * *x;
    let mut accumulator = GroupElement::identity();
    for balance in 0..bound {
        if accumulator == gB {
            return Some(balance);
        }
        accumulator += g;
    }
    tracing::warn!(bound, "balance not found within search bound");
    None
}

/// Schnorr signature `(c, s)` over the contract address and public key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub c: Scalar,
    pub s: Scalar,
}

/// Sign with a fresh nonce
pub fn sign<S: ScalarSource>(address: &Address, account: &Account, source: &mut S) -> Signature {
    sign_with_nonce(address, account, &source.random_scalar(b"k"))
}

/// `K = g * k`, `c = H(address, Y, K)`, `s = c * x + k`
pub fn sign_with_nonce(address: &Address, account: &Account, k: &Scalar) -> Signature {
    let K = GroupElement::base() * *k;
    let c = challenge(&(address.to_abi(), account.Y.to_abi(), K.to_abi()));
    Signature {
        c,
        s: c * account.x + *k,
    }
}

/// Check `c == H(address, Y, g * s - Y * c)`
pub fn verify_signature(address: &Address, Y: &GroupElement, signature: &Signature) -> bool {
    let K = GroupElement::base() * signature.s - *Y * signature.c;
    let c = challenge(&(address.to_abi(), Y.to_abi(), K.to_abi()));
    c == signature.c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RandomTape;

    fn point(x: &str, y: &str) -> GroupElement {
        GroupElement::from_hex_coordinates(x, y).unwrap()
    }

    fn scalar(s: &str) -> Scalar {
        Scalar::from_hex(s).unwrap()
    }

    #[test]
    fn test_g_epoch() {
        let expected = point(
            "0x24efbd461de73b406c9843a99d04f8212b24a7a9a0c1bb669bf1099e23327501",
            "0x02d2f06f08772767856f3307fe2f19d0a43f370b346f0f08908fa96984584805",
        );
        assert_eq!(g_epoch(16), expected);
    }

    #[test]
    fn test_u() {
        let x = scalar("23537dd8704f6cfdfdb0256c3d1c4a6012fb6ae05102762d8d257d5e1ef4fc16");
        let expected = point(
            "0x171ea019e27e1c83e5faa817d93324aeabb3c33beda426d34430684da598526b",
            "0x125a81290d856b8be5c85903e09b22652b3c289e667e81c70f60a31801c6b6f1",
        );
        assert_eq!(u(16, &x), expected);
    }

    #[test]
    fn test_account_with_secret() {
        let x = scalar("23537dd8704f6cfdfdb0256c3d1c4a6012fb6ae05102762d8d257d5e1ef4fc16");
        let account = Account::with_secret(x);
        assert_eq!(
            account.Y,
            point(
                "0x012984cced2b6375c23249ea95e451080219a4215b7bfcc20531673d005c8ff0",
                "0x0fb0f2a0c61aca0f0c20f4ac53f55a1f2a8a18b7bc9b3527a4b15173201df29c",
            )
        );
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(
            json["x"],
            "0x23537dd8704f6cfdfdb0256c3d1c4a6012fb6ae05102762d8d257d5e1ef4fc16"
        );
        assert_eq!(
            json["y"]["gx"],
            "0x012984cced2b6375c23249ea95e451080219a4215b7bfcc20531673d005c8ff0"
        );
    }

    #[test]
    fn test_generated_account_is_consistent() {
        let account = Account::generate(&mut RandomTape::new(b"account"));
        assert_eq!(account.Y, GroupElement::base() * account.x);
    }

    #[test]
    fn test_read_balance_vector() {
        let CL = point(
            "0x1b5d4b9abe488e61bbb92edff41682560a9d6e02335e2bca9b50881c9540e393",
            "0x15dc61a9eff5d5a4e70ed97cbce60f7afc69c9925a409ddba365897f1384ca58",
        );
        let CR = point(
            "0x0456301d6013d1cc52455a37c8762f2463b1c7e148d55e1c7d9980d8ed8d54b8",
            "0x27e78199776a73737fa833429fd64e00fa592ca21dda2e92d3489c96148308cb",
        );
        let x = scalar("20a89bb465e9e2262e25901525509686f6a26b2fba976f1d9ff00a0cdbb362b0");
        assert_eq!(read_balance(&CL, &CR, &x), Some(2));
    }

    #[test]
    fn test_read_balance_exhaustion() {
        let account = Account::with_secret(Scalar::from_u64(77));
        let r = Scalar::from_u64(5);
        let CL = GroupElement::base() * Scalar::from_u64(50) + account.Y * r;
        let CR = GroupElement::base() * r;
        assert_eq!(read_balance_bounded(&CL, &CR, &account.x, 10), None);
        assert_eq!(read_balance_bounded(&CL, &CR, &account.x, 100), Some(50));
    }

    #[test]
    fn test_sign_vector() {
        let address = Address::from_hex("E4920905e06c6B6070477c40B85756ffDa3cD3E6").unwrap();
        let account = Account::with_secret(scalar(
            "299569ae0ae1d40140fd8d9afc54d2f581a292fd13fe88c7033d488119bb95b7",
        ));
        let k = scalar("2493a56987e869bbb150c14aff5b2e897d9fe78d6dad8b12c92432473f7e9abd");
        let signature = sign_with_nonce(&address, &account, &k);
        assert_eq!(
            signature.c,
            scalar("206db78bfe338ecffd5b2f0606789ff1045bfbf1e46c897f8fa2e2115e19ed74")
        );
        assert_eq!(
            signature.s,
            scalar("003fe7000561eeebccd4bff3160cd7f8fd50db62904d8fa217692a1f6ca8e7ed")
        );
        assert!(verify_signature(&address, &account.Y, &signature));
    }

    #[test]
    fn test_random_signature_verifies() {
        let address = Address([7u8; 20]);
        let account = Account::with_secret(Scalar::from_u64(1234));
        let signature = sign(&address, &account, &mut RandomTape::new(b"sign"));
        assert!(verify_signature(&address, &account.Y, &signature));
        assert!(!verify_signature(&address, &(account.Y + GroupElement::base()), &signature));
    }
}
