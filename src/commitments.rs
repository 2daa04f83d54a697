//! Pedersen commitments on BN254 G1.
//!
//! The generators are public and recomputable: `g` is the protocol base,
//! `h = map_into(keccak256("H"))`, and `gs[i]`, `hs[i]` hash `"G"`/`"H"`
//! followed by `i` as a 32-byte word.

use crate::abi::uint;
use crate::group::GroupElement;
use crate::random::ScalarSource;
use crate::scalar::Scalar;
use crate::vectors::{FieldVector, GeneratorVector};
use alloy_sol_types::SolValue;
use std::sync::OnceLock;

/// Generators for vector commitments
#[derive(Debug, Clone)]
pub struct GeneratorParams {
    pub g: GroupElement,
    pub h: GroupElement,
    pub gs: GeneratorVector,
    pub hs: GeneratorVector,
}

static RANGE_32: OnceLock<GeneratorParams> = OnceLock::new();
static RANGE_64: OnceLock<GeneratorParams> = OnceLock::new();

impl GeneratorParams {
    pub fn new(n: usize) -> Self {
        let indexed = |prefix: &[u8], i: usize| {
            let mut seed = prefix.to_vec();
            seed.extend_from_slice(&uint(i as u64).abi_encode());
            GroupElement::hash_to_curve(&seed)
        };
        tracing::debug!(n, "deriving generator params");
        GeneratorParams {
            g: GroupElement::base(),
            h: GroupElement::hash_to_curve(b"H"),
            gs: GeneratorVector::new((0..n).map(|i| indexed(b"G", i)).collect()),
            hs: GeneratorVector::new((0..n).map(|i| indexed(b"H", i)).collect()),
        }
    }

    /// Shared parameters for 32-bit range proofs (burn)
    pub fn range32() -> &'static GeneratorParams {
        RANGE_32.get_or_init(|| GeneratorParams::new(32))
    }

    /// Shared parameters for 64-bit range proofs (transfer)
    pub fn range64() -> &'static GeneratorParams {
        RANGE_64.get_or_init(|| GeneratorParams::new(64))
    }

    pub fn size(&self) -> usize {
        self.gs.len()
    }

    /// `h * blinding + sum gs[i] * g_exp[i] + sum hs[i] * h_exp[i]`.
    /// A shorter exponent vector uses a prefix of the generators.
    pub fn commit(
        &self,
        blinding: &Scalar,
        g_exp: &FieldVector,
        h_exp: Option<&FieldVector>,
    ) -> GroupElement {
        let mut result = self.h * *blinding + self.gs.slice(0, g_exp.len()).commit(g_exp);
        if let Some(h_exp) = h_exp {
            result += self.hs.slice(0, h_exp.len()).commit(h_exp);
        }
        result
    }
}

/// Trait for Pedersen commitments under `(g, h)`
pub trait Commitments {
    fn commit(&self, blind: &Scalar, params: &GeneratorParams) -> GroupElement;
}

impl Commitments for Scalar {
    fn commit(&self, blind: &Scalar, params: &GeneratorParams) -> GroupElement {
        GroupElement::vartime_multiscalar_mul(&[*self, *blind], &[params.g, params.h])
    }
}

/// An opened commitment `g * x + h * r`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PedersenCommitment {
    pub x: Scalar,
    pub r: Scalar,
    pub point: GroupElement,
}

impl PedersenCommitment {
    pub fn new(params: &GeneratorParams, x: Scalar, r: Scalar) -> Self {
        PedersenCommitment {
            x,
            r,
            point: x.commit(&r, params),
        }
    }

    /// Scale both openings and the point
    pub fn times(&self, s: &Scalar) -> PedersenCommitment {
        PedersenCommitment {
            x: self.x * *s,
            r: self.r * *s,
            point: self.point * *s,
        }
    }

    pub fn add(&self, other: &PedersenCommitment) -> PedersenCommitment {
        PedersenCommitment {
            x: self.x + other.x,
            r: self.r + other.r,
            point: self.point + other.point,
        }
    }
}

/// Commitments to the coefficients of `t(X)`.
/// The constant term is committed with zero blinding and never published.
#[derive(Clone, Debug)]
pub struct PolyCommitment {
    coefficient_commitments: Vec<PedersenCommitment>,
}

impl PolyCommitment {
    pub fn new<S: ScalarSource>(
        params: &GeneratorParams,
        coefficients: &[Scalar],
        source: &mut S,
    ) -> Self {
        let coefficient_commitments = coefficients
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let blinding = if i == 0 {
                    Scalar::zero()
                } else {
                    source.random_scalar(b"tau")
                };
                PedersenCommitment::new(params, *c, blinding)
            })
            .collect();
        PolyCommitment {
            coefficient_commitments,
        }
    }

    /// `T_1, T_2, ...`
    pub fn commitments(&self) -> Vec<GroupElement> {
        self.coefficient_commitments
            .iter()
            .skip(1)
            .map(|c| c.point)
            .collect()
    }

    /// Opening of `t(x)`: `x` is `t_hat`, `r` is `tau_x`
    pub fn evaluate(&self, x: &Scalar) -> PedersenCommitment {
        let mut iter = self.coefficient_commitments.iter().rev();
        let first = match iter.next() {
            Some(top) => *top,
            None => {
                return PedersenCommitment {
                    x: Scalar::zero(),
                    r: Scalar::zero(),
                    point: GroupElement::identity(),
                }
            }
        };
        iter.fold(first, |acc, c| acc.times(x).add(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedScalarSource;

    #[test]
    fn test_generator_derivation() {
        let params = GeneratorParams::new(4);
        assert_eq!(params.size(), 4);
        let mut seed = b"G".to_vec();
        seed.extend_from_slice(&uint(2).abi_encode());
        assert_eq!(params.gs[2], GroupElement::hash_to_curve(&seed));
        assert_ne!(params.gs[0], params.hs[0]);
        // shared params agree with a fresh derivation
        assert_eq!(GeneratorParams::range32().gs[3], params.gs[3]);
        assert_eq!(GeneratorParams::range64().hs.slice(0, 4), params.hs);
    }

    #[test]
    fn test_vector_commit() {
        let params = GeneratorParams::new(3);
        let a = FieldVector::new(vec![Scalar::from_u64(1), Scalar::from_u64(2), Scalar::from_u64(3)]);
        let blind = Scalar::from_u64(456);
        let expected = params.h * blind + params.gs.commit(&a) + params.hs.commit(&a);
        assert_eq!(params.commit(&blind, &a, Some(&a)), expected);
        assert_eq!(params.commit(&blind, &a, None), params.h * blind + params.gs.commit(&a));
    }

    #[test]
    fn test_poly_commitment_evaluates_homomorphically() {
        let params = GeneratorParams::new(1);
        let t = [Scalar::from_u64(3), Scalar::from_u64(5), Scalar::from_u64(7)];
        let mut source = FixedScalarSource::new(vec![Scalar::from_u64(11), Scalar::from_u64(13)]);
        let poly = PolyCommitment::new(&params, &t, &mut source);
        let commitments = poly.commitments();
        assert_eq!(commitments.len(), 2);

        let x = Scalar::from_u64(2);
        let opened = poly.evaluate(&x);
        assert_eq!(opened.x, Scalar::from_u64(3 + 10 + 28));
        assert_eq!(opened.r, Scalar::from_u64(22 + 52));
        let recombined = params.g * t[0] + commitments[0] * x + commitments[1] * x.square();
        assert_eq!(opened.point, recombined);
    }
}
