//! Burn proof: the owner of `Y` knows `sk` and the balance left after
//! withdrawing from `(CLn, CRn)` is a 32-bit non-negative value. The epoch
//! nonce `u = GEpoch(epoch) * sk` binds the proof to one epoch.

use super::{
    delta, reduce_range_statement, to_prefixed_hex, two_times_zs, BitCommitments, ByteReader,
    InnerProductProof, SEGMENT_BITS,
};
use crate::abi::{uint, Address, ToAbi};
use crate::account::g_epoch;
use crate::commitments::{GeneratorParams, PolyCommitment};
use crate::errors::{ProofError, ProofVerifyError};
use crate::group::GroupElement;
use crate::random::ScalarSource;
use crate::scalar::{decode_hex, Scalar};
use crate::timer::Timer;
use crate::transcript::{challenge, rehash};
use crate::vectors::FieldVector;
use serde::{Deserialize, Serialize};

const BITS: usize = SEGMENT_BITS;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnStatement {
    pub CLn: GroupElement,
    pub CRn: GroupElement,
    pub Y: GroupElement,
    pub epoch: u64,
    pub sender: Address,
}

impl BurnStatement {
    /// `H(abi.encode(CLn, CRn, Y, epoch, sender))`
    pub fn hash(&self) -> Scalar {
        challenge(&(
            self.CLn.to_abi(),
            self.CRn.to_abi(),
            self.Y.to_abi(),
            uint(self.epoch),
            self.sender.to_abi(),
        ))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnWitness {
    pub sk: Scalar,
    pub b_diff: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurnProof {
    BA: GroupElement,
    BS: GroupElement,
    tCommits: [GroupElement; 2],
    tHat: Scalar,
    mu: Scalar,
    c: Scalar,
    s_sk: Scalar,
    s_b: Scalar,
    s_tau: Scalar,
    ip_proof: InnerProductProof,
}

/// Serialized size of a burn proof
pub const BURN_PROOF_LEN: usize = 4 * 64 + 6 * 32 + 5 * 128 + 64;

impl BurnProof {
    pub fn prove<S: ScalarSource>(
        statement: &BurnStatement,
        witness: &BurnWitness,
        source: &mut S,
    ) -> BurnProof {
        let timer = Timer::new("burn_prove");
        tracing::debug!(epoch = statement.epoch, sender = %statement.sender, "proving burn");
        let params = GeneratorParams::range32();

        let statement_hash = statement.hash();
        let bits = BitCommitments::new(params, witness.b_diff as u64, BITS, source);

        let y = challenge(&(statement_hash.to_abi(), bits.BA.to_abi(), bits.BS.to_abi()));
        let z = rehash(&y);
        let zs = z.square();

        let ys = FieldVector::powers(&y, BITS);
        let tz = two_times_zs(&z, BITS);
        let (l_poly, r_poly) = bits.polynomials(&ys, &z, &tz);
        let t_poly = l_poly.inner_product(&r_poly);

        let poly_commitment = PolyCommitment::new(params, t_poly.coefficients(), source);
        let commitments = poly_commitment.commitments();
        let tCommits = [commitments[0], commitments[1]];

        let x = challenge(&(z.to_abi(), tCommits[0].to_abi(), tCommits[1].to_abi()));
        let evaluation = poly_commitment.evaluate(&x);
        let tHat = evaluation.x;
        let tau_x = evaluation.r;
        let mu = bits.alpha + bits.rho * x;

        let k_sk = source.random_scalar(b"k_sk");
        let k_b = source.random_scalar(b"k_b");
        let k_tau = source.random_scalar(b"k_tau");

        let A_y = params.g * k_sk;
        let A_b = params.g * k_b + statement.CRn * (zs * k_sk);
        let A_t = -(params.g * k_b) + params.h * k_tau;
        let A_u = g_epoch(statement.epoch) * k_sk;

        let c = challenge(&(x.to_abi(), A_y.to_abi(), A_b.to_abi(), A_t.to_abi(), A_u.to_abi()));

        let s_sk = k_sk + c * witness.sk;
        let s_b = k_b + c * Scalar::from_u64(witness.b_diff as u64) * zs;
        let s_tau = k_tau + c * tau_x;

        let reduction =
            reduce_range_statement(params, &bits.BA, &bits.BS, &ys, &z, &x, &tz, &mu, &tHat, &c);
        let ip_proof = InnerProductProof::prove(
            &reduction.base,
            &reduction.P,
            &l_poly.evaluate(&x),
            &r_poly.evaluate(&x),
            &reduction.salt,
        );
        timer.stop();

        BurnProof {
            BA: bits.BA,
            BS: bits.BS,
            tCommits,
            tHat,
            mu,
            c,
            s_sk,
            s_b,
            s_tau,
            ip_proof,
        }
    }

    /// Check the proof against the statement and the epoch nonce `u`
    pub fn verify(&self, statement: &BurnStatement, u: &GroupElement) -> Result<(), ProofVerifyError> {
        let timer = Timer::new("burn_verify");
        let params = GeneratorParams::range32();

        let statement_hash = statement.hash();
        let y = challenge(&(statement_hash.to_abi(), self.BA.to_abi(), self.BS.to_abi()));
        let z = rehash(&y);
        let zs = z.square();
        let x = challenge(&(
            z.to_abi(),
            self.tCommits[0].to_abi(),
            self.tCommits[1].to_abi(),
        ));

        let c = self.c;
        let g = params.g;
        let A_y = g * self.s_sk - statement.Y * c;
        let A_b = g * self.s_b + statement.CRn * (zs * self.s_sk) - statement.CLn * (zs * c);
        let P_t = g * (delta(&y, &z, BITS) - self.tHat)
            + self.tCommits[0] * x
            + self.tCommits[1] * x.square();
        let A_t = -(g * self.s_b) + params.h * self.s_tau - P_t * c;
        let A_u = g_epoch(statement.epoch) * self.s_sk - *u * c;

        let recomputed =
            challenge(&(x.to_abi(), A_y.to_abi(), A_b.to_abi(), A_t.to_abi(), A_u.to_abi()));
        if recomputed != c {
            tracing::debug!("burn sigma challenge mismatch");
            return Err(ProofVerifyError::ChallengeMismatch);
        }

        let ys = FieldVector::powers(&y, BITS);
        let tz = two_times_zs(&z, BITS);
        let reduction = reduce_range_statement(
            params, &self.BA, &self.BS, &ys, &z, &x, &tz, &self.mu, &self.tHat, &c,
        );
        let result = self
            .ip_proof
            .verify(&reduction.base, &reduction.P, &reduction.salt);
        timer.stop();
        result
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BURN_PROOF_LEN);
        for p in [&self.BA, &self.BS, &self.tCommits[0], &self.tCommits[1]] {
            out.extend_from_slice(&p.to_bytes());
        }
        for s in [&self.tHat, &self.mu, &self.c, &self.s_sk, &self.s_b, &self.s_tau] {
            out.extend_from_slice(&s.to_bytes());
        }
        out.extend_from_slice(&self.ip_proof.to_bytes());
        out
    }

    /// `0x`-prefixed hex of [`BurnProof::to_bytes`]
    pub fn serialize(&self) -> String {
        to_prefixed_hex(&self.to_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        if bytes.len() != BURN_PROOF_LEN {
            return Err(ProofError::MalformedProof(format!(
                "burn proof is {} bytes, expected {}",
                bytes.len(),
                BURN_PROOF_LEN
            )));
        }
        let mut reader = ByteReader::new(bytes);
        let BA = reader.point()?;
        let BS = reader.point()?;
        let tCommits = [reader.point()?, reader.point()?];
        let tHat = reader.scalar()?;
        let mu = reader.scalar()?;
        let c = reader.scalar()?;
        let s_sk = reader.scalar()?;
        let s_b = reader.scalar()?;
        let s_tau = reader.scalar()?;
        let ip_proof = InnerProductProof::read(&mut reader, 5)?;
        reader.finish()?;
        Ok(BurnProof {
            BA,
            BS,
            tCommits,
            tHat,
            mu,
            c,
            s_sk,
            s_b,
            s_tau,
            ip_proof,
        })
    }

    pub fn from_hex(s: &str) -> Result<Self, ProofError> {
        BurnProof::from_bytes(&decode_hex(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{u, Account};
    use crate::random::{FixedScalarSource, RandomTape};

    fn burn_setup(balance: u64, value: u64) -> (BurnStatement, BurnWitness, GroupElement) {
        let account = Account::with_secret(Scalar::from_u64(0xdead_beef));
        let g = GroupElement::base();
        let r = Scalar::from_u64(99);
        let CL = g * Scalar::from_u64(balance) + account.Y * r;
        let CR = g * r;
        let statement = BurnStatement {
            CLn: CL - g * Scalar::from_u64(value),
            CRn: CR,
            Y: account.Y,
            epoch: 16,
            sender: Address::from_hex("0xE4920905e06c6B6070477c40B85756ffDa3cD3E6").unwrap(),
        };
        let witness = BurnWitness {
            sk: account.x,
            b_diff: (balance - value) as u32,
        };
        (statement, witness, u(16, &account.x))
    }

    #[test]
    fn test_burn_proof() {
        let (statement, witness, nonce) = burn_setup(10, 4);
        let mut tape = RandomTape::new(b"burn");
        let proof = BurnProof::prove(&statement, &witness, &mut tape);
        assert!(proof.verify(&statement, &nonce).is_ok());
    }

    #[test]
    fn test_tampered_responses_fail() {
        let (statement, witness, nonce) = burn_setup(10, 10);
        let mut tape = RandomTape::new(b"burn");
        let proof = BurnProof::prove(&statement, &witness, &mut tape);

        let mut bad = proof.clone();
        bad.s_sk += Scalar::one();
        assert_eq!(bad.verify(&statement, &nonce), Err(ProofVerifyError::ChallengeMismatch));

        let mut bad = proof.clone();
        bad.mu += Scalar::one();
        assert_eq!(bad.verify(&statement, &nonce), Err(ProofVerifyError::InnerProductError));

        let mut bad = proof.clone();
        bad.tHat += Scalar::one();
        assert!(bad.verify(&statement, &nonce).is_err());
    }

    #[test]
    fn test_every_proof_field_is_bound() {
        let (statement, witness, nonce) = burn_setup(10, 3);
        let proof = BurnProof::prove(&statement, &witness, &mut RandomTape::new(b"burn"));
        let cases: &[(&str, fn(&mut BurnProof))] = &[
            ("BA", |p| p.BA += GroupElement::base()),
            ("BS", |p| p.BS += GroupElement::base()),
            ("tCommits[0]", |p| p.tCommits[0] += GroupElement::base()),
            ("tCommits[1]", |p| p.tCommits[1] += GroupElement::base()),
            ("tHat", |p| p.tHat += Scalar::one()),
            ("mu", |p| p.mu += Scalar::one()),
            ("c", |p| p.c += Scalar::one()),
            ("s_sk", |p| p.s_sk += Scalar::one()),
            ("s_b", |p| p.s_b += Scalar::one()),
            ("s_tau", |p| p.s_tau += Scalar::one()),
        ];
        for (field, tamper) in cases {
            let mut bad = proof.clone();
            tamper(&mut bad);
            let reparsed = BurnProof::from_bytes(&bad.to_bytes()).unwrap();
            assert_eq!(reparsed, bad);
            assert!(
                reparsed.verify(&statement, &nonce).is_err(),
                "tampered {} still verifies",
                field
            );
        }
    }

    #[test]
    fn test_wrong_statement_fails() {
        let (statement, witness, nonce) = burn_setup(10, 4);
        let mut tape = RandomTape::new(b"burn");
        let proof = BurnProof::prove(&statement, &witness, &mut tape);

        let mut other_epoch = statement.clone();
        other_epoch.epoch = 17;
        assert!(proof.verify(&other_epoch, &nonce).is_err());
        assert!(proof.verify(&statement, &(nonce + GroupElement::base())).is_err());
    }

    #[test]
    fn test_overdrawn_balance_fails() {
        // claims 6 left when only 2 remain
        let (statement, mut witness, nonce) = burn_setup(10, 8);
        witness.b_diff = 6;
        let mut tape = RandomTape::new(b"burn");
        let proof = BurnProof::prove(&statement, &witness, &mut tape);
        assert!(proof.verify(&statement, &nonce).is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let (statement, witness, nonce) = burn_setup(3, 1);
        let mut source = FixedScalarSource::new((1..=7u64).map(Scalar::from_u64).collect());
        let proof = BurnProof::prove(&statement, &witness, &mut source);
        let hex = proof.serialize();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 2 + 2 * BURN_PROOF_LEN);

        let parsed = BurnProof::from_hex(&hex).unwrap();
        assert_eq!(parsed, proof);
        assert!(parsed.verify(&statement, &nonce).is_ok());
        assert!(BurnProof::from_bytes(&proof.to_bytes()[1..]).is_err());
    }

    #[test]
    fn test_fixed_source_is_deterministic() {
        let (statement, witness, _) = burn_setup(5, 2);
        let values: Vec<Scalar> = (11..=19u64).map(Scalar::from_u64).collect();
        let first = BurnProof::prove(&statement, &witness, &mut FixedScalarSource::new(values.clone()));
        let second = BurnProof::prove(&statement, &witness, &mut FixedScalarSource::new(values));
        assert_eq!(first.serialize(), second.serialize());
    }
}
