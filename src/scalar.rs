//! BN254 scalar field wrapper
//! All proof arithmetic happens modulo the G1 group order.

use crate::errors::ProofError;
use ark_bn254::Fr;
use ark_ff::{BigInt, BigInteger, Field, One, PrimeField, UniformRand, Zero};
use ark_std::rand::RngCore;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Element of the BN254 scalar field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
pub struct Scalar(pub Fr);

impl Scalar {
    /// The zero scalar
    pub fn zero() -> Self {
        Scalar(Fr::zero())
    }

    /// The one scalar
    pub fn one() -> Self {
        Scalar(Fr::one())
    }

    /// Generate a random scalar
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        Scalar(Fr::rand(rng))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Compute the multiplicative inverse
    pub fn invert(&self) -> Option<Self> {
        self.0.inverse().map(Scalar)
    }

    /// Canonical 32-byte big-endian encoding
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&self.0.into_bigint().to_bytes_be());
        bytes
    }

    /// Parse a canonical 32-byte big-endian word. Values at or above the
    /// group order are rejected.
    pub fn from_bytes(bytes: &[u8; 32]) -> Option<Self> {
        let mut limbs = [0u64; 4];
        for (i, chunk) in bytes.chunks_exact(8).rev().enumerate() {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            limbs[i] = u64::from_be_bytes(word);
        }
        Fr::from_bigint(BigInt(limbs)).map(Scalar)
    }

    /// Interpret arbitrary big-endian bytes as an integer and reduce it
    pub fn from_bytes_mod_order(bytes: &[u8]) -> Self {
        Scalar(Fr::from_be_bytes_mod_order(bytes))
    }

    /// Parse a hex string, with or without `0x`, reducing into the field
    pub fn from_hex(s: &str) -> Result<Self, ProofError> {
        let bytes = decode_hex(s)?;
        if bytes.len() > 32 {
            return Err(ProofError::InvalidScalar);
        }
        Ok(Scalar::from_bytes_mod_order(&bytes))
    }

    /// `0x`-prefixed 64-digit hex
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Create from u64
    pub fn from_u64(val: u64) -> Self {
        Scalar(Fr::from(val))
    }

    pub fn from_i64(val: i64) -> Self {
        if val < 0 {
            -Scalar::from_u64(val.unsigned_abs())
        } else {
            Scalar::from_u64(val as u64)
        }
    }

    /// Square the scalar
    pub fn square(&self) -> Self {
        Scalar(self.0.square())
    }

    /// Raise to an integer power. The exponent is not reduced.
    pub fn pow(&self, exp: u64) -> Self {
        Scalar(self.0.pow([exp]))
    }

    /// Successive powers `1, self, self^2, ..., self^(n-1)`
    pub fn powers(&self, n: usize) -> Vec<Scalar> {
        let mut out = Vec::with_capacity(n);
        let mut acc = Scalar::one();
        for _ in 0..n {
            out.push(acc);
            acc *= *self;
        }
        out
    }
}

/// Decode a hex string, accepting an optional `0x` prefix and odd length
pub fn decode_hex(s: &str) -> Result<Vec<u8>, ProofError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let padded = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    hex::decode(&padded).map_err(|e| ProofError::InvalidHex(format!("{}: {}", s, e)))
}

impl From<u64> for Scalar {
    fn from(val: u64) -> Self {
        Scalar::from_u64(val)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Arithmetic operations
impl Add for Scalar {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Scalar(self.0 + rhs.0)
    }
}

impl Sub for Scalar {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Scalar(self.0 - rhs.0)
    }
}

impl Mul for Scalar {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Scalar(self.0 * rhs.0)
    }
}

impl<'a> Mul<&'a Scalar> for Scalar {
    type Output = Self;
    fn mul(self, rhs: &'a Scalar) -> Self {
        Scalar(self.0 * rhs.0)
    }
}

impl Neg for Scalar {
    type Output = Self;
    fn neg(self) -> Self {
        Scalar(-self.0)
    }
}

impl AddAssign for Scalar {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Scalar {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl MulAssign for Scalar {
    fn mul_assign(&mut self, rhs: Self) {
        self.0 *= rhs.0;
    }
}

impl std::iter::Sum for Scalar {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Scalar::zero(), |acc, x| acc + x)
    }
}

impl<'a> std::iter::Sum<&'a Scalar> for Scalar {
    fn sum<I: Iterator<Item = &'a Scalar>>(iter: I) -> Self {
        iter.fold(Scalar::zero(), |acc, x| acc + *x)
    }
}

impl std::iter::Product for Scalar {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Scalar::one(), |acc, x| acc * x)
    }
}

// Serde support: hex strings, as exchanged with wallets
impl serde::Serialize for Scalar {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Scalar {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = serde::Deserialize::deserialize(deserializer)?;
        Scalar::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_arithmetic() {
        let a = Scalar::from_u64(5);
        let b = Scalar::from_u64(7);

        assert_eq!(a + b, Scalar::from_u64(12));
        assert_eq!(b - a, Scalar::from_u64(2));
        assert_eq!(a * b, Scalar::from_u64(35));
        assert_eq!(a - b, Scalar::from_i64(-2));
        assert_eq!(a.pow(3), Scalar::from_u64(125));
    }

    #[test]
    fn test_scalar_bytes_roundtrip() {
        let mut rng = ark_std::test_rng();
        for _ in 0..100 {
            let s = Scalar::random(&mut rng);
            let bytes = s.to_bytes();
            let recovered = Scalar::from_bytes(&bytes).unwrap();
            assert_eq!(s, recovered);
        }
    }

    #[test]
    fn test_big_endian_layout() {
        let bytes = Scalar::from_u64(0x0102).to_bytes();
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
        assert!(bytes[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_modulus_is_rejected() {
        let modulus = decode_hex(
            "30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001",
        )
        .unwrap();
        let mut word = [0u8; 32];
        word.copy_from_slice(&modulus);
        assert!(Scalar::from_bytes(&word).is_none());
        assert_eq!(Scalar::from_bytes_mod_order(&word), Scalar::zero());
        assert_eq!(-Scalar::one(), Scalar::from_hex(
            "0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000000"
        ).unwrap());
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Scalar::from_hex("0x10").unwrap(), Scalar::from_u64(16));
        assert_eq!(Scalar::from_hex("abc").unwrap(), Scalar::from_u64(0xabc));
        assert!(matches!(Scalar::from_hex("0xzz"), Err(ProofError::InvalidHex(_))));
        let s = Scalar::from_u64(42);
        assert_eq!(Scalar::from_hex(&s.to_hex()).unwrap(), s);
    }

    #[test]
    fn test_scalar_invert() {
        let a = Scalar::from_u64(7);
        let a_inv = a.invert().unwrap();
        assert_eq!(a * a_inv, Scalar::one());
        assert!(Scalar::zero().invert().is_none());
    }

    #[test]
    fn test_powers() {
        let p = Scalar::from_u64(2).powers(4);
        assert_eq!(p, vec![1u64, 2, 4, 8].into_iter().map(Scalar::from).collect::<Vec<_>>());
    }
}
