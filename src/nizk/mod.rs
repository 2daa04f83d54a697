//! Zero-knowledge proofs for burns and anonymous transfers.
//!
//! Both proofs share a Bulletproofs-style range proof: bit commitments
//! `BA`/`BS`, a committed quadratic `t(X)`, and a final inner-product
//! argument over a reduced statement. This module holds those shared steps.

#![allow(clippy::too_many_arguments)]

use crate::commitments::GeneratorParams;
use crate::errors::ProofError;
use crate::group::GroupElement;
use crate::math::to_bits_le;
use crate::polynomial::FieldVectorPolynomial;
use crate::random::ScalarSource;
use crate::scalar::Scalar;
use crate::transcript::hash_to_scalar;
use crate::vectors::FieldVector;

mod bullet;
mod burn;
mod zether;

pub use bullet::{InnerProductBase, InnerProductProof};
pub use burn::{BurnProof, BurnStatement, BurnWitness};
pub use zether::{TransferStatement, TransferWitness, ZetherProof};

/// Bits in each range-proven segment
pub(crate) const SEGMENT_BITS: usize = 32;

/// Committed bit decomposition `aL` of a value, `aR = aL - 1`, and the
/// blinding vectors `sL`, `sR`.
pub(crate) struct BitCommitments {
    pub BA: GroupElement,
    pub BS: GroupElement,
    aL: FieldVector,
    aR: FieldVector,
    sL: FieldVector,
    sR: FieldVector,
    pub alpha: Scalar,
    pub rho: Scalar,
}

impl BitCommitments {
    pub fn new<S: ScalarSource>(
        params: &GeneratorParams,
        value: u64,
        bits: usize,
        source: &mut S,
    ) -> Self {
        let aL = FieldVector::new(
            to_bits_le(value, bits)
                .into_iter()
                .map(|bit| Scalar::from_u64(bit as u64))
                .collect(),
        );
        let aR = aL.plus(&-Scalar::one());
        let alpha = source.random_scalar(b"alpha");
        let BA = params.commit(&alpha, &aL, Some(&aR));

        let sL = FieldVector::new(source.random_vector(b"sL", bits));
        let sR = FieldVector::new(source.random_vector(b"sR", bits));
        let rho = source.random_scalar(b"rho");
        let BS = params.commit(&rho, &sL, Some(&sR));

        BitCommitments {
            BA,
            BS,
            aL,
            aR,
            sL,
            sR,
            alpha,
            rho,
        }
    }

    /// `l(X) = (aL - z) + sL X` and
    /// `r(X) = ys o (aR + z) + twoTimesZs + (sR o ys) X`
    pub fn polynomials(
        &self,
        ys: &FieldVector,
        z: &Scalar,
        two_times_zs: &FieldVector,
    ) -> (FieldVectorPolynomial, FieldVectorPolynomial) {
        let l = FieldVectorPolynomial::new(vec![self.aL.plus(&-*z), self.sL.clone()]);
        let r = FieldVectorPolynomial::new(vec![
            ys.hadamard(&self.aR.plus(z)).add(two_times_zs),
            self.sR.hadamard(ys),
        ]);
        (l, r)
    }
}

/// `z^(2+j) * 2^i` for bit `i` of segment `j`
pub(crate) fn two_times_zs(z: &Scalar, bits: usize) -> FieldVector {
    let twos = Scalar::from_u64(2).powers(SEGMENT_BITS);
    let mut out = Vec::with_capacity(bits);
    let mut z_power = z.square();
    for _ in 0..bits / SEGMENT_BITS {
        out.extend(twos.iter().map(|t| *t * z_power));
        z_power *= *z;
    }
    FieldVector::new(out)
}

/// Public part of `t(X)`'s constant term:
/// `(z - z^2) <1, y^n> - sum_j z^(3+j) <1, 2^32>`
pub(crate) fn delta(y: &Scalar, z: &Scalar, bits: usize) -> Scalar {
    let ys_sum = FieldVector::powers(y, bits).sum();
    let segment_sum = Scalar::from_u64((1u64 << SEGMENT_BITS) - 1);
    let mut z_power = z.square() * *z;
    let mut z_terms = Scalar::zero();
    for _ in 0..bits / SEGMENT_BITS {
        z_terms += z_power;
        z_power *= *z;
    }
    (*z - z.square()) * ys_sum - z_terms * segment_sum
}

/// Range-proof statement reduced to an inner-product instance
pub(crate) struct RangeReduction {
    pub base: InnerProductBase,
    pub P: GroupElement,
    pub salt: Scalar,
}

/// Fold `BA + BS x` and the public `z` terms into `P`, swap `hs` for
/// `hs o y^-n`, and bind `t_hat` through `u = g * H(c)`.
pub(crate) fn reduce_range_statement(
    params: &GeneratorParams,
    BA: &GroupElement,
    BS: &GroupElement,
    ys: &FieldVector,
    z: &Scalar,
    x: &Scalar,
    two_times_zs: &FieldVector,
    mu: &Scalar,
    t_hat: &Scalar,
    c: &Scalar,
) -> RangeReduction {
    let n = ys.len();
    let gs = params.gs.slice(0, n);
    let h_primes = params.hs.slice(0, n).hadamard(&ys.invert());
    let h_exp = ys.times(z).add(two_times_zs);

    let salt = hash_to_scalar(&c.to_bytes());
    let u = params.g * salt;
    let P = *BA + *BS * *x + gs.sum() * (-*z) + h_primes.commit(&h_exp) - params.h * *mu
        + u * *t_hat;

    RangeReduction {
        base: InnerProductBase {
            gs,
            hs: h_primes,
            u,
        },
        P,
        salt,
    }
}

/// Cursor over serialized proof bytes
pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        ByteReader { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ProofError> {
        if self.bytes.len() - self.pos < n {
            return Err(ProofError::MalformedProof(format!(
                "truncated at byte {} (need {} more)",
                self.pos, n
            )));
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn point(&mut self) -> Result<GroupElement, ProofError> {
        let mut word = [0u8; 64];
        word.copy_from_slice(self.take(64)?);
        GroupElement::from_bytes(&word)
    }

    pub fn points(&mut self, n: usize) -> Result<Vec<GroupElement>, ProofError> {
        (0..n).map(|_| self.point()).collect()
    }

    pub fn scalar(&mut self) -> Result<Scalar, ProofError> {
        let mut word = [0u8; 32];
        word.copy_from_slice(self.take(32)?);
        Scalar::from_bytes(&word).ok_or(ProofError::InvalidScalar)
    }

    pub fn scalars(&mut self, n: usize) -> Result<Vec<Scalar>, ProofError> {
        (0..n).map(|_| self.scalar()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pos == self.bytes.len()
    }

    pub fn finish(self) -> Result<(), ProofError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ProofError::MalformedProof(format!(
                "{} trailing bytes",
                self.bytes.len() - self.pos
            )))
        }
    }
}

/// `0x` followed by lowercase hex
pub(crate) fn to_prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
