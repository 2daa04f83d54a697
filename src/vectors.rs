//! Scalar vectors and generator (point) vectors.
//!
//! Length mismatches are caller bugs and panic.

use crate::group::GroupElement;
use crate::scalar::Scalar;
use std::ops::Index;

/// Ordered vector of field elements
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FieldVector(Vec<Scalar>);

impl FieldVector {
    pub fn new(elements: Vec<Scalar>) -> Self {
        FieldVector(elements)
    }

    /// `n` copies of `value`
    pub fn filled(value: Scalar, n: usize) -> Self {
        FieldVector(vec![value; n])
    }

    /// `1, base, base^2, ..., base^(n-1)`
    pub fn powers(base: &Scalar, n: usize) -> Self {
        FieldVector(base.powers(n))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Scalar] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Scalar> {
        self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Scalar> {
        self.0.iter()
    }

    pub fn set(&mut self, i: usize, value: Scalar) {
        self.0[i] = value;
    }

    pub fn sum(&self) -> Scalar {
        self.0.iter().sum()
    }

    pub fn add(&self, other: &FieldVector) -> FieldVector {
        assert_eq!(self.len(), other.len());
        FieldVector(self.0.iter().zip(other.0.iter()).map(|(a, b)| *a + *b).collect())
    }

    /// Add `s` to every element
    pub fn plus(&self, s: &Scalar) -> FieldVector {
        FieldVector(self.0.iter().map(|a| *a + *s).collect())
    }

    pub fn hadamard(&self, other: &FieldVector) -> FieldVector {
        assert_eq!(self.len(), other.len());
        FieldVector(self.0.iter().zip(other.0.iter()).map(|(a, b)| *a * *b).collect())
    }

    pub fn inner_product(&self, other: &FieldVector) -> Scalar {
        assert_eq!(self.len(), other.len());
        self.0.iter().zip(other.0.iter()).map(|(a, b)| *a * *b).sum()
    }

    pub fn times(&self, s: &Scalar) -> FieldVector {
        FieldVector(self.0.iter().map(|a| *a * *s).collect())
    }

    pub fn negate(&self) -> FieldVector {
        FieldVector(self.0.iter().map(|a| -*a).collect())
    }

    /// Element-wise inverse; zero entries stay zero
    pub fn invert(&self) -> FieldVector {
        let mut raw: Vec<_> = self.0.iter().map(|a| a.0).collect();
        ark_ff::batch_inversion(&mut raw);
        FieldVector(raw.into_iter().map(Scalar).collect())
    }

    pub fn slice(&self, begin: usize, end: usize) -> FieldVector {
        FieldVector(self.0[begin..end].to_vec())
    }

    /// `flip[i] = self[(n - i) % n]`
    pub fn flip(&self) -> FieldVector {
        let n = self.len();
        FieldVector((0..n).map(|i| self.0[(n - i) % n]).collect())
    }

    /// Entries at even (`parity == 0`) or odd (`parity == 1`) positions
    pub fn extract(&self, parity: usize) -> FieldVector {
        FieldVector(self.0.iter().skip(parity).step_by(2).copied().collect())
    }

    pub fn concat(&self, other: &FieldVector) -> FieldVector {
        let mut out = self.0.clone();
        out.extend_from_slice(&other.0);
        FieldVector(out)
    }
}

impl Index<usize> for FieldVector {
    type Output = Scalar;
    fn index(&self, i: usize) -> &Scalar {
        &self.0[i]
    }
}

impl From<Vec<Scalar>> for FieldVector {
    fn from(v: Vec<Scalar>) -> Self {
        FieldVector(v)
    }
}

/// Ordered vector of curve points
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GeneratorVector(Vec<GroupElement>);

impl GeneratorVector {
    pub fn new(points: Vec<GroupElement>) -> Self {
        GeneratorVector(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[GroupElement] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<GroupElement> {
        self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GroupElement> {
        self.0.iter()
    }

    /// `sum_i self[i] * exponents[i]`
    pub fn commit(&self, exponents: &FieldVector) -> GroupElement {
        assert_eq!(self.len(), exponents.len());
        GroupElement::vartime_multiscalar_mul(exponents.as_slice(), self.as_slice())
    }

    pub fn sum(&self) -> GroupElement {
        self.0.iter().copied().sum()
    }

    pub fn add(&self, other: &GeneratorVector) -> GeneratorVector {
        assert_eq!(self.len(), other.len());
        GeneratorVector(self.0.iter().zip(other.0.iter()).map(|(a, b)| *a + *b).collect())
    }

    /// `self[i] * exponents[i]`
    pub fn hadamard(&self, exponents: &FieldVector) -> GeneratorVector {
        assert_eq!(self.len(), exponents.len());
        GeneratorVector(
            self.0
                .iter()
                .zip(exponents.iter())
                .map(|(p, e)| *p * *e)
                .collect(),
        )
    }

    pub fn times(&self, s: &Scalar) -> GeneratorVector {
        GeneratorVector(self.0.iter().map(|p| *p * *s).collect())
    }

    pub fn negate(&self) -> GeneratorVector {
        GeneratorVector(self.0.iter().map(|p| -*p).collect())
    }

    pub fn slice(&self, begin: usize, end: usize) -> GeneratorVector {
        GeneratorVector(self.0[begin..end].to_vec())
    }

    pub fn flip(&self) -> GeneratorVector {
        let n = self.len();
        GeneratorVector((0..n).map(|i| self.0[(n - i) % n]).collect())
    }

    pub fn extract(&self, parity: usize) -> GeneratorVector {
        GeneratorVector(self.0.iter().skip(parity).step_by(2).copied().collect())
    }

    pub fn concat(&self, other: &GeneratorVector) -> GeneratorVector {
        let mut out = self.0.clone();
        out.extend_from_slice(&other.0);
        GeneratorVector(out)
    }
}

impl Index<usize> for GeneratorVector {
    type Output = GroupElement;
    fn index(&self, i: usize) -> &GroupElement {
        &self.0[i]
    }
}

impl From<Vec<GroupElement>> for GeneratorVector {
    fn from(v: Vec<GroupElement>) -> Self {
        GeneratorVector(v)
    }
}
