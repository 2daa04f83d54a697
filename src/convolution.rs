//! Radix-2 FFT over the scalar field, applied to scalars and to points.
//!
//! Used to evaluate every selector polynomial against the whole anonymity
//! set at once instead of forming all `N * m` products.

use crate::group::GroupElement;
use crate::scalar::Scalar;
use crate::vectors::{FieldVector, GeneratorVector};
use std::ops::{Add, Mul, Sub};

/// Primitive `2^28`-th root of unity in the BN254 scalar field
const UNITY_HEX: &str = "0x14a3074b02521e3b1ed9852e5028452693e87be4e910500c7ba9bbddb2f46edd";
const TWO_ADICITY: u32 = 28;

/// Anything the transform can run over: scalars, or points scaled by scalars
pub trait FftElement:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<Scalar, Output = Self>
{
}

impl FftElement for Scalar {}
impl FftElement for GroupElement {}

/// Vectors the transform splits into even and odd halves
pub trait FftVector: Sized {
    type Item: FftElement;

    fn extract(&self, parity: usize) -> Self;
    fn items(&self) -> &[Self::Item];
    fn from_items(items: Vec<Self::Item>) -> Self;
}

impl FftVector for FieldVector {
    type Item = Scalar;

    fn extract(&self, parity: usize) -> Self {
        FieldVector::extract(self, parity)
    }

    fn items(&self) -> &[Scalar] {
        self.as_slice()
    }

    fn from_items(items: Vec<Scalar>) -> Self {
        FieldVector::new(items)
    }
}

impl FftVector for GeneratorVector {
    type Item = GroupElement;

    fn extract(&self, parity: usize) -> Self {
        GeneratorVector::extract(self, parity)
    }

    fn items(&self) -> &[GroupElement] {
        self.as_slice()
    }

    fn from_items(items: Vec<GroupElement>) -> Self {
        GeneratorVector::new(items)
    }
}

#[derive(Clone, Debug)]
pub struct Convolver {
    unity: Scalar,
    two_inv: Scalar,
}

impl Default for Convolver {
    fn default() -> Self {
        Convolver::new()
    }
}

impl Convolver {
    pub fn new() -> Self {
        Convolver {
            unity: Scalar::from_hex(UNITY_HEX).unwrap_or_default(),
            two_inv: Scalar::from_u64(2).invert().unwrap_or_default(),
        }
    }

    /// Forward (or inverse) transform. Panics unless the length is a power
    /// of two no larger than `2^28`.
    pub fn fft<V: FftVector>(&self, input: &V, inverse: bool) -> V {
        let n = input.items().len();
        assert!(n.is_power_of_two(), "fft length {} is not a power of two", n);
        assert!(n.trailing_zeros() <= TWO_ADICITY);
        let mut omega = self.unity.pow(1u64 << (TWO_ADICITY - n.trailing_zeros()));
        if inverse {
            omega = omega.invert().unwrap_or_default();
        }
        V::from_items(self.fft_rec(input, &omega, inverse))
    }

    fn fft_rec<V: FftVector>(&self, input: &V, omega: &Scalar, inverse: bool) -> Vec<V::Item> {
        let n = input.items().len();
        if n == 1 {
            return input.items().to_vec();
        }
        let omega_sq = omega.square();
        let even = self.fft_rec(&input.extract(0), &omega_sq, inverse);
        let odd = self.fft_rec(&input.extract(1), &omega_sq, inverse);

        let half = n / 2;
        let mut result = Vec::with_capacity(n);
        let mut twiddled = Vec::with_capacity(half);
        let mut power = Scalar::one();
        for i in 0..half {
            twiddled.push(odd[i] * power);
            power *= *omega;
        }
        for i in 0..half {
            result.push(even[i] + twiddled[i]);
        }
        for i in 0..half {
            result.push(even[i] - twiddled[i]);
        }
        if inverse {
            result.iter_mut().for_each(|r| *r = *r * self.two_inv);
        }
        result
    }

    /// `out[j] = sum_i base[i] * exponent[(i - 2j) mod n]` for `j < n / 2`
    fn convolution<V: FftVector>(&self, exponent: &FieldVector, base: &V) -> V {
        let size = base.items().len();
        assert_eq!(exponent.len(), size);
        let base_hat = self.fft(base, false);
        let exponent_hat = self.fft(&exponent.flip(), false);
        let product: Vec<V::Item> = base_hat
            .items()
            .iter()
            .zip(exponent_hat.iter())
            .map(|(b, e)| *b * *e)
            .collect();
        let half = size / 2;
        let folded = V::from_items(
            (0..half)
                .map(|i| (product[i] + product[i + half]) * self.two_inv)
                .collect(),
        );
        if half == 0 {
            return folded;
        }
        self.fft(&folded, true)
    }

    pub fn convolution_scalar(&self, exponent: &FieldVector, base: &FieldVector) -> FieldVector {
        self.convolution(exponent, base)
    }

    pub fn convolution_point(&self, exponent: &FieldVector, base: &GeneratorVector) -> GeneratorVector {
        self.convolution(exponent, base)
    }
}
