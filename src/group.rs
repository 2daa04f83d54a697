//! Group operations for BN254 G1
//! Points travel as 64-byte big-endian (x, y) words; the identity is all zeros.

use crate::errors::ProofError;
use crate::scalar::{decode_hex, Scalar};
use crate::transcript::keccak256;
use ark_bn254::{Fq, Fr, G1Affine, G1Projective};
use ark_ec::{CurveGroup, VariableBaseMSM};
use ark_ff::{BigInt, BigInteger, Field, MontFp, PrimeField, Zero};
use core::borrow::Borrow;
use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};
use std::fmt;

/// x coordinate of the base generator, `map_into(keccak256("G"))`
const BASE_X: Fq =
    MontFp!("3388216464548280147592959668976866603264284679474019247268538060944586934228");
const BASE_Y: Fq =
    MontFp!("580181356818483336893508026607093856567194375618640891498561592487153498229");

/// Group element (BN254 G1 projective point)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupElement(pub G1Projective);

impl GroupElement {
    /// Identity element
    pub fn identity() -> Self {
        GroupElement(G1Projective::zero())
    }

    /// The protocol base point `g`. Public keys are `g * x`.
    pub fn base() -> Self {
        GroupElement(G1Affine::new_unchecked(BASE_X, BASE_Y).into())
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_zero()
    }

    /// Deterministic hash-to-curve. The seed is read as an integer mod p and
    /// incremented until `x^3 + 3` has a square root; the root taken is
    /// `(x^3 + 3)^((p + 1) / 4)`, matching on-chain verifiers.
    pub fn map_into(seed: &[u8; 32]) -> Self {
        let mut sqrt_exp = Fq::MODULUS;
        sqrt_exp.add_with_carry(&BigInt::from(1u64));
        sqrt_exp.div2();
        sqrt_exp.div2();

        let three = Fq::from(3u64);
        let mut x = Fq::from_be_bytes_mod_order(seed);
        loop {
            let y_squared = x.square() * x + three;
            let y = y_squared.pow(sqrt_exp);
            if y.square() == y_squared {
                return GroupElement(G1Affine::new_unchecked(x, y).into());
            }
            x += Fq::from(1u64);
        }
    }

    /// `map_into(keccak256(label))`
    pub fn hash_to_curve(label: &[u8]) -> Self {
        GroupElement::map_into(&keccak256(label))
    }

    /// 64-byte big-endian (x, y) encoding
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        let affine = self.0.into_affine();
        if affine.infinity {
            return out;
        }
        out[..32].copy_from_slice(&affine.x.into_bigint().to_bytes_be());
        out[32..].copy_from_slice(&affine.y.into_bigint().to_bytes_be());
        out
    }

    /// Decode 64 bytes. All zeros decodes to the identity; anything else must
    /// be a canonical point on the curve.
    pub fn from_bytes(bytes: &[u8; 64]) -> Result<Self, ProofError> {
        if bytes.iter().all(|b| *b == 0) {
            return Ok(GroupElement::identity());
        }
        let x = fq_from_bytes(&bytes[..32]).ok_or(ProofError::InvalidPoint)?;
        let y = fq_from_bytes(&bytes[32..]).ok_or(ProofError::InvalidPoint)?;
        let affine = G1Affine::new_unchecked(x, y);
        if !affine.is_on_curve() {
            return Err(ProofError::InvalidPoint);
        }
        Ok(GroupElement(affine.into()))
    }

    /// Build from a pair of hex coordinates
    pub fn from_hex_coordinates(x: &str, y: &str) -> Result<Self, ProofError> {
        let mut bytes = [0u8; 64];
        for (slot, coordinate) in [x, y].iter().enumerate() {
            let raw = decode_hex(coordinate)?;
            if raw.len() > 32 {
                return Err(ProofError::InvalidPoint);
            }
            let start = slot * 32 + (32 - raw.len());
            bytes[start..start + raw.len()].copy_from_slice(&raw);
        }
        GroupElement::from_bytes(&bytes)
    }

    /// `0x`-prefixed hex of each coordinate
    pub fn to_hex_coordinates(&self) -> (String, String) {
        let bytes = self.to_bytes();
        (
            format!("0x{}", hex::encode(&bytes[..32])),
            format!("0x{}", hex::encode(&bytes[32..])),
        )
    }

    /// Variable-time multi-scalar multiplication
    pub fn vartime_multiscalar_mul<I, J>(scalars: I, points: J) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<Scalar>,
        J: IntoIterator,
        J::Item: Borrow<Self>,
    {
        let scalars_vec: Vec<Fr> = scalars.into_iter().map(|s| s.borrow().0).collect();
        let projective: Vec<G1Projective> = points.into_iter().map(|p| p.borrow().0).collect();
        let points_vec = G1Projective::normalize_batch(&projective);

        let result = G1Projective::msm(&points_vec, &scalars_vec).unwrap_or_default();
        GroupElement(result)
    }
}

fn fq_from_bytes(bytes: &[u8]) -> Option<Fq> {
    let mut limbs = [0u64; 4];
    for (i, chunk) in bytes.chunks_exact(8).rev().enumerate() {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        limbs[i] = u64::from_be_bytes(word);
    }
    Fq::from_bigint(BigInt(limbs))
}

impl Default for GroupElement {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for GroupElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = self.to_hex_coordinates();
        write!(f, "({}, {})", x, y)
    }
}

impl Add for GroupElement {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        GroupElement(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a GroupElement> for GroupElement {
    type Output = Self;
    fn add(self, rhs: &'a GroupElement) -> Self {
        GroupElement(self.0 + rhs.0)
    }
}

impl Sub for GroupElement {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        GroupElement(self.0 - rhs.0)
    }
}

impl Neg for GroupElement {
    type Output = Self;
    fn neg(self) -> Self {
        GroupElement(-self.0)
    }
}

impl AddAssign for GroupElement {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for GroupElement {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul<Scalar> for GroupElement {
    type Output = Self;
    fn mul(self, rhs: Scalar) -> Self {
        GroupElement(self.0 * rhs.0)
    }
}

impl<'a> Mul<&'a Scalar> for GroupElement {
    type Output = Self;
    fn mul(self, rhs: &'a Scalar) -> Self {
        GroupElement(self.0 * rhs.0)
    }
}

impl<'a> Mul<&'a Scalar> for &'a GroupElement {
    type Output = GroupElement;
    fn mul(self, rhs: &'a Scalar) -> GroupElement {
        GroupElement(self.0 * rhs.0)
    }
}

impl Mul<GroupElement> for Scalar {
    type Output = GroupElement;
    fn mul(self, rhs: GroupElement) -> GroupElement {
        GroupElement(rhs.0 * self.0)
    }
}

impl<'a> Mul<&'a GroupElement> for Scalar {
    type Output = GroupElement;
    fn mul(self, rhs: &'a GroupElement) -> GroupElement {
        GroupElement(rhs.0 * self.0)
    }
}

impl std::iter::Sum for GroupElement {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(GroupElement::identity(), |acc, p| acc + p)
    }
}

// Serde support: `{"gx": "0x..", "gy": "0x.."}`
#[derive(Serialize, Deserialize)]
struct HexPoint {
    gx: String,
    gy: String,
}

impl Serialize for GroupElement {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (gx, gy) = self.to_hex_coordinates();
        HexPoint { gx, gy }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GroupElement {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let point = HexPoint::deserialize(deserializer)?;
        GroupElement::from_hex_coordinates(&point.gx, &point.gy).map_err(serde::de::Error::custom)
    }
}
