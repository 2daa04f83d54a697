//! Inner-product argument for logarithmic-size range proofs.
//! Proves knowledge of `a, b` with `P = <a, gs> + <b, hs> + u * <a, b>`.

use crate::errors::{ProofError, ProofVerifyError};
use crate::group::GroupElement;
use crate::math::Math;
use crate::scalar::Scalar;
use crate::abi::ToAbi;
use crate::transcript::challenge;
use crate::vectors::{FieldVector, GeneratorVector};

use super::ByteReader;

/// Bases the argument runs over
#[derive(Clone, Debug)]
pub struct InnerProductBase {
    pub gs: GeneratorVector,
    pub hs: GeneratorVector,
    pub u: GroupElement,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InnerProductProof {
    L_vec: Vec<GroupElement>,
    R_vec: Vec<GroupElement>,
    a: Scalar,
    b: Scalar,
}

/// Round challenge over the previous challenge and the round's `L`, `R`
fn round_challenge(previous: &Scalar, L: &GroupElement, R: &GroupElement) -> Scalar {
    challenge(&(previous.to_abi(), L.to_abi(), R.to_abi()))
}

impl InnerProductProof {
    /// Fold `a`, `b` down to single scalars. Round challenges chain from
    /// `salt`: `x_i = H(x_{i-1}, L_i, R_i)`.
    pub fn prove(
        base: &InnerProductBase,
        P: &GroupElement,
        a_vec: &FieldVector,
        b_vec: &FieldVector,
        salt: &Scalar,
    ) -> InnerProductProof {
        let mut n = base.gs.len();
        assert_eq!(a_vec.len(), n);
        assert_eq!(b_vec.len(), n);
        assert_eq!(base.hs.len(), n);
        assert!(n.is_power_of_two());

        let lg_n = n.log_2();
        let mut G = base.gs.clone();
        let mut H = base.hs.clone();
        let mut a = a_vec.clone();
        let mut b = b_vec.clone();
        let mut P = *P;
        let mut previous = *salt;

        let mut L_vec = Vec::with_capacity(lg_n);
        let mut R_vec = Vec::with_capacity(lg_n);

        while n > 1 {
            n /= 2;
            let (a_L, a_R) = (a.slice(0, n), a.slice(n, 2 * n));
            let (b_L, b_R) = (b.slice(0, n), b.slice(n, 2 * n));
            let (G_L, G_R) = (G.slice(0, n), G.slice(n, 2 * n));
            let (H_L, H_R) = (H.slice(0, n), H.slice(n, 2 * n));

            let c_L = a_L.inner_product(&b_R);
            let c_R = a_R.inner_product(&b_L);

            let L = G_R.commit(&a_L) + H_L.commit(&b_R) + base.u * c_L;
            let R = G_L.commit(&a_R) + H_R.commit(&b_L) + base.u * c_R;

            let x = round_challenge(&previous, &L, &R);
            // zero only with probability 2^-254, and `verify` rejects it
            let x_inv = x.invert().unwrap_or_default();

            G = G_L.times(&x_inv).add(&G_R.times(&x));
            H = H_L.times(&x).add(&H_R.times(&x_inv));
            a = a_L.times(&x).add(&a_R.times(&x_inv));
            b = b_L.times(&x_inv).add(&b_R.times(&x));
            P = L * x.square() + R * x_inv.square() + P;

            L_vec.push(L);
            R_vec.push(R);
            previous = x;
        }

        debug_assert_eq!(P, G[0] * a[0] + H[0] * b[0] + base.u * (a[0] * b[0]));

        InnerProductProof {
            L_vec,
            R_vec,
            a: a[0],
            b: b[0],
        }
    }

    pub fn verify(
        &self,
        base: &InnerProductBase,
        P: &GroupElement,
        salt: &Scalar,
    ) -> Result<(), ProofVerifyError> {
        let n = base.gs.len();
        if !n.is_power_of_two() || base.hs.len() != n {
            return Err(ProofVerifyError::InvalidProof);
        }
        let lg_n = n.log_2();
        if self.L_vec.len() != lg_n || self.R_vec.len() != lg_n {
            return Err(ProofVerifyError::InvalidProof);
        }

        let mut challenges = Vec::with_capacity(lg_n);
        let mut previous = *salt;
        for (L, R) in self.L_vec.iter().zip(self.R_vec.iter()) {
            let x = round_challenge(&previous, L, R);
            if x.is_zero() {
                return Err(ProofVerifyError::InvalidProof);
            }
            challenges.push(x);
            previous = x;
        }
        let challenges_inv = FieldVector::new(challenges.clone()).invert();

        let P_hat = {
            let x_sq: Vec<Scalar> = challenges.iter().map(|x| x.square()).collect();
            let x_inv_sq: Vec<Scalar> = challenges_inv.iter().map(|x| x.square()).collect();
            GroupElement::vartime_multiscalar_mul(&x_sq, &self.L_vec)
                + GroupElement::vartime_multiscalar_mul(&x_inv_sq, &self.R_vec)
                + *P
        };

        let s = compute_s(&challenges, challenges_inv.as_slice());
        // complementing every bit of the index inverts s
        let s_inv: Vec<Scalar> = s.iter().rev().copied().collect();

        let g_exp = FieldVector::new(s).times(&self.a);
        let h_exp = FieldVector::new(s_inv).times(&self.b);
        let expected = base.gs.commit(&g_exp) + base.hs.commit(&h_exp) + base.u * (self.a * self.b);

        if expected == P_hat {
            Ok(())
        } else {
            Err(ProofVerifyError::InnerProductError)
        }
    }

    /// Number of folding rounds carried by the proof
    pub fn rounds(&self) -> usize {
        self.L_vec.len()
    }

    /// `L_1..L_k || R_1..R_k || a || b`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.L_vec.len() * 128 + 64);
        for L in &self.L_vec {
            out.extend_from_slice(&L.to_bytes());
        }
        for R in &self.R_vec {
            out.extend_from_slice(&R.to_bytes());
        }
        out.extend_from_slice(&self.a.to_bytes());
        out.extend_from_slice(&self.b.to_bytes());
        out
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>, rounds: usize) -> Result<Self, ProofError> {
        let L_vec = reader.points(rounds)?;
        let R_vec = reader.points(rounds)?;
        let a = reader.scalar()?;
        let b = reader.scalar()?;
        Ok(InnerProductProof { L_vec, R_vec, a, b })
    }

    /// Serialized size for vectors of length `n`
    pub fn encoded_len(n: usize) -> usize {
        n.log_2() * 128 + 64
    }
}

/// `s_i = prod_j (bit j of i, most significant first, ? x_j : x_j^-1)`
fn compute_s(u_vec: &[Scalar], u_inv: &[Scalar]) -> Vec<Scalar> {
    let lg_n = u_vec.len();
    let n = 1 << lg_n;

    let mut s: Vec<Scalar> = vec![Scalar::one(); n];
    for (i, s_i) in s.iter_mut().enumerate() {
        for j in 0..lg_n {
            if i >> j & 1 == 1 {
                *s_i *= u_vec[lg_n - 1 - j];
            } else {
                *s_i *= u_inv[lg_n - 1 - j];
            }
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitments::GeneratorParams;
    use rand::rngs::OsRng;

    fn setup(n: usize) -> (InnerProductBase, FieldVector, FieldVector, GroupElement) {
        let params = GeneratorParams::new(n);
        let base = InnerProductBase {
            gs: params.gs.clone(),
            hs: params.hs.clone(),
            u: params.g * Scalar::random(&mut OsRng),
        };
        let a = FieldVector::new((0..n).map(|_| Scalar::random(&mut OsRng)).collect());
        let b = FieldVector::new((0..n).map(|_| Scalar::random(&mut OsRng)).collect());
        let P = base.gs.commit(&a) + base.hs.commit(&b) + base.u * a.inner_product(&b);
        (base, a, b, P)
    }

    #[test]
    fn test_inner_product_proof() {
        for n in [1usize, 2, 8, 32] {
            let (base, a, b, P) = setup(n);
            let salt = Scalar::from_u64(42);
            let proof = InnerProductProof::prove(&base, &P, &a, &b, &salt);
            assert_eq!(proof.rounds(), n.log_2());
            assert!(proof.verify(&base, &P, &salt).is_ok());
        }
    }

    #[test]
    fn test_wrong_statement_rejected() {
        let (base, a, b, P) = setup(8);
        let salt = Scalar::from_u64(1);
        let proof = InnerProductProof::prove(&base, &P, &a, &b, &salt);
        let wrong = P + base.u;
        assert_eq!(proof.verify(&base, &wrong, &salt), Err(ProofVerifyError::InnerProductError));
        assert!(proof.verify(&base, &P, &Scalar::from_u64(2)).is_err());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let (base, a, b, P) = setup(4);
        let salt = Scalar::from_u64(9);
        let proof = InnerProductProof::prove(&base, &P, &a, &b, &salt);
        let bytes = proof.to_bytes();
        assert_eq!(bytes.len(), InnerProductProof::encoded_len(4));
        let mut reader = ByteReader::new(&bytes);
        let parsed = InnerProductProof::read(&mut reader, 2).unwrap();
        assert!(reader.is_empty());
        assert_eq!(parsed, proof);
    }

    #[test]
    fn test_compute_s_bit_order() {
        let x = [Scalar::from_u64(2), Scalar::from_u64(3)];
        let x_inv: Vec<Scalar> = x.iter().map(|v| v.invert().unwrap()).collect();
        let s = compute_s(&x, &x_inv);
        // index 1 = 0b01: first round inverted, second round direct
        assert_eq!(s[1], x_inv[0] * x[1]);
        assert_eq!(s[2], x[0] * x_inv[1]);
        assert_eq!(s[3] * s[0], Scalar::one());
    }

    #[test]
    fn test_round_challenge_layout() {
        let g = GroupElement::base();
        let (L, R) = (g * Scalar::from_u64(3), g * Scalar::from_u64(5));
        let previous = Scalar::from_u64(11);
        let mut encoded = previous.to_bytes().to_vec();
        encoded.extend_from_slice(&L.to_bytes());
        encoded.extend_from_slice(&R.to_bytes());
        let x = round_challenge(&previous, &L, &R);
        assert_eq!(x, crate::transcript::hash_to_scalar(&encoded));
        assert!(!x.is_zero());
    }
}
