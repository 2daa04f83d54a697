//! Zether confidential-transfer proofs over BN254
//!
//! Burn and anonymous-transfer provers and verifiers, with challenges
//! derived from Ethereum ABI encodings hashed with Keccak-256 so that an
//! on-chain verifier recomputes the same transcript.
//!
//! # Proofs
//! Build a [`BurnStatement`]/[`BurnWitness`] or
//! [`TransferStatement`]/[`TransferWitness`] and call `prove` with a
//! [`ScalarSource`]. `serialize` gives the `0x` hex the contract expects.
//!
//! # Wallet helpers
//! [`client`] prepares statements from simulated balances, [`zsc`] encodes
//! contract calls and [`api`] wraps the common flows over hex inputs.

#![allow(non_snake_case)]

pub mod abi;
pub mod account;
pub mod api;
pub mod client;
pub mod commitments;
pub mod convolution;
pub mod errors;
pub mod group;
pub mod math;
pub mod nizk;
pub mod polynomial;
pub mod random;
pub mod scalar;
pub mod timer;
pub mod transcript;
pub mod vectors;
pub mod zsc;

// Re-exports
pub use abi::Address;
pub use account::{Account, Signature};
pub use commitments::{GeneratorParams, PedersenCommitment, PolyCommitment};
pub use convolution::Convolver;
pub use errors::{ProofError, ProofVerifyError};
pub use group::GroupElement;
pub use nizk::{
    BurnProof, BurnStatement, BurnWitness, InnerProductProof, TransferStatement, TransferWitness,
    ZetherProof,
};
pub use random::{FixedScalarSource, RandomTape, ScalarSource};
pub use scalar::Scalar;
pub use vectors::{FieldVector, GeneratorVector};

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_scalar_modulus() {
        // q - 1 encodes as the modulus minus one
        assert_eq!(
            (-Scalar::one()).to_hex(),
            "0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000000"
        );
    }

    #[test]
    fn test_register_fund_transfer_flow() {
        let mut tape = RandomTape::new(b"flow");
        let alice = Account::generate(&mut tape);
        let bob = Account::generate(&mut tape);
        let contract = Address([0x42; 20]);
        let g = GroupElement::base();

        let signature = account::sign(&contract, &alice, &mut tape);
        assert!(account::verify_signature(&contract, &alice.Y, &signature));

        // alice holds 10 after funding, bob holds nothing yet
        let balances = vec![
            [g * Scalar::from_u64(10), GroupElement::identity()],
            [GroupElement::identity(), GroupElement::identity()],
        ];
        let request = client::TransferRequest {
            epoch: 3,
            value: 4,
            diff: 6,
            sk: alice.x,
            Y: vec![alice.Y, bob.Y],
            index: [0, 1],
            accounts: balances,
        };
        let prepared = request.prepare(&mut tape).unwrap();
        let proof =
            ZetherProof::prove(&prepared.statement, &prepared.witness, &mut tape).unwrap();
        assert!(proof.verify(&prepared.statement, &prepared.u).is_ok());

        let st = &prepared.statement;
        assert_eq!(account::read_balance_bounded(&st.CLn[1], &st.CRn[1], &bob.x, 100), Some(4));
        assert_eq!(account::read_balance_bounded(&st.CLn[0], &st.CRn[0], &alice.x, 100), Some(6));

        let calldata = zsc::transfer(&st.C, &st.D, &st.Y, &prepared.u, &proof.to_bytes());
        let call = zsc::IZSC::transferCall::abi_decode(&calldata).unwrap();
        assert_eq!(call.proof.to_vec(), proof.to_bytes());
        assert_eq!(call.y.len(), 2);
    }
}
