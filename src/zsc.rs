//! Calldata for the Zether smart contract (ZSC) and decoding of its
//! `simulateAccounts` result.

use crate::abi::{point_from_words, uint, ToAbi};
use crate::account::Signature;
use crate::client::Ciphertext;
use crate::errors::ProofError;
use crate::group::GroupElement;
use alloy_primitives::{Bytes, U256};
use alloy_sol_types::{sol, SolCall, SolValue};

sol! {
    #[sol(all_derives)]
    interface IZSC {
        struct G1Point {
            bytes32 x;
            bytes32 y;
        }

        function register(G1Point y, uint256 c, uint256 s) external;
        function fund(G1Point y, uint256 bTransfer) external;
        function burn(G1Point y, uint256 bTransfer, G1Point u, bytes proof) external;
        function transfer(G1Point[] C, G1Point D, G1Point[] y, G1Point u, bytes proof) external;
        function simulateAccounts(G1Point[] y, uint256 epoch) external view returns (G1Point[2][] accounts);
        function epochLength() external view returns (uint256);
    }
}

pub use IZSC::G1Point;

impl From<&GroupElement> for G1Point {
    fn from(point: &GroupElement) -> Self {
        let [x, y] = point.to_abi();
        G1Point { x, y }
    }
}

impl TryFrom<&G1Point> for GroupElement {
    type Error = ProofError;

    fn try_from(point: &G1Point) -> Result<Self, ProofError> {
        point_from_words(&point.x, &point.y)
    }
}

fn points(ps: &[GroupElement]) -> Vec<G1Point> {
    ps.iter().map(G1Point::from).collect()
}

pub fn register(Y: &GroupElement, signature: &Signature) -> Vec<u8> {
    IZSC::registerCall {
        y: Y.into(),
        c: U256::from_be_bytes(signature.c.to_bytes()),
        s: U256::from_be_bytes(signature.s.to_bytes()),
    }
    .abi_encode()
}

pub fn fund(Y: &GroupElement, amount: u64) -> Vec<u8> {
    IZSC::fundCall {
        y: Y.into(),
        bTransfer: uint(amount),
    }
    .abi_encode()
}

pub fn burn(Y: &GroupElement, amount: u64, u: &GroupElement, proof: &[u8]) -> Vec<u8> {
    IZSC::burnCall {
        y: Y.into(),
        bTransfer: uint(amount),
        u: u.into(),
        proof: Bytes::copy_from_slice(proof),
    }
    .abi_encode()
}

pub fn transfer(
    C: &[GroupElement],
    D: &GroupElement,
    Y: &[GroupElement],
    u: &GroupElement,
    proof: &[u8],
) -> Vec<u8> {
    IZSC::transferCall {
        C: points(C),
        D: D.into(),
        y: points(Y),
        u: u.into(),
        proof: Bytes::copy_from_slice(proof),
    }
    .abi_encode()
}

pub fn simulate_accounts(Y: &[GroupElement], epoch: u64) -> Vec<u8> {
    IZSC::simulateAccountsCall {
        y: points(Y),
        epoch: uint(epoch),
    }
    .abi_encode()
}

pub fn epoch_length() -> Vec<u8> {
    IZSC::epochLengthCall {}.abi_encode()
}

/// Decode the `(CL, CR)` pairs returned by `simulateAccounts`, a single
/// `G1Point[2][]`
pub fn parse_simulate_accounts(data: &[u8]) -> Result<Vec<Ciphertext>, ProofError> {
    let decoded = Vec::<[G1Point; 2]>::abi_decode(data)
        .map_err(|e| ProofError::MalformedCalldata(e.to_string()))?;
    let accounts = decoded
        .iter()
        .map(|[CL, CR]| Ok([CL.try_into()?, CR.try_into()?]))
        .collect::<Result<Vec<Ciphertext>, ProofError>>()?;
    tracing::trace!(accounts = accounts.len(), "decoded simulated accounts");
    Ok(accounts)
}
