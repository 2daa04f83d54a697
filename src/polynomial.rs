//! Scalar polynomials, polynomials with vector coefficients, and the
//! one-hot selector polynomials used by the anonymity-set argument.

use crate::scalar::Scalar;
use crate::vectors::FieldVector;

/// Polynomial with scalar coefficients, lowest degree first
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial {
    coefficients: Vec<Scalar>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<Scalar>) -> Self {
        Polynomial { coefficients }
    }

    pub fn coefficients(&self) -> &[Scalar] {
        &self.coefficients
    }

    /// Horner evaluation
    pub fn evaluate(&self, x: &Scalar) -> Scalar {
        self.coefficients
            .iter()
            .rev()
            .fold(Scalar::zero(), |acc, c| acc * *x + *c)
    }

    /// Multiply by the linear factor `c0 + c1 X`
    pub fn mul_linear(&self, c0: &Scalar, c1: &Scalar) -> Polynomial {
        let mut out = vec![Scalar::zero(); self.coefficients.len() + 1];
        for (i, c) in self.coefficients.iter().enumerate() {
            out[i] += *c * *c0;
            out[i + 1] += *c * *c1;
        }
        Polynomial::new(out)
    }
}

/// Polynomial whose coefficients are equal-length field vectors
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldVectorPolynomial {
    coefficients: Vec<FieldVector>,
}

impl FieldVectorPolynomial {
    pub fn new(coefficients: Vec<FieldVector>) -> Self {
        FieldVectorPolynomial { coefficients }
    }

    pub fn coefficients(&self) -> &[FieldVector] {
        &self.coefficients
    }

    pub fn evaluate(&self, x: &Scalar) -> FieldVector {
        let mut iter = self.coefficients.iter().rev();
        let first = match iter.next() {
            Some(top) => top.clone(),
            None => return FieldVector::default(),
        };
        iter.fold(first, |acc, c| acc.times(x).add(c))
    }

    /// Scalar coefficients of `<self(X), other(X)>`
    pub fn inner_product(&self, other: &FieldVectorPolynomial) -> Polynomial {
        if self.coefficients.is_empty() || other.coefficients.is_empty() {
            return Polynomial::new(Vec::new());
        }
        let mut out = vec![Scalar::zero(); self.coefficients.len() + other.coefficients.len() - 1];
        for (i, a) in self.coefficients.iter().enumerate() {
            for (j, b) in other.coefficients.iter().enumerate() {
                out[i + j] += a.inner_product(b);
            }
        }
        Polynomial::new(out)
    }
}

/// Expand the selector polynomials for one index.
///
/// `a` and `b` hold `m` entries; `b` is the bit decomposition (least
/// significant first) of a secret index. Returns `2^m` polynomials in index
/// order; polynomial `i` is
/// `prod_k (bit_k(i) ? a_k + b_k X : -a_k + (1 - b_k) X)`,
/// so its leading coefficient is 1 exactly at the secret index.
pub fn recursive_polynomials(a: &[Scalar], b: &[Scalar]) -> Vec<Polynomial> {
    assert_eq!(a.len(), b.len());
    let mut level = vec![Polynomial::new(vec![Scalar::one()])];
    // the most significant bit splits first, so leaves land in index order
    for k in (0..a.len()).rev() {
        let left = (-a[k], Scalar::one() - b[k]);
        let right = (a[k], b[k]);
        level = level
            .iter()
            .flat_map(|p| [p.mul_linear(&left.0, &left.1), p.mul_linear(&right.0, &right.1)])
            .collect();
    }
    level
}

/// Transpose selector polynomials into per-degree rows:
/// `rows[k][i]` is coefficient `k` of polynomial `i`, for `k < m`.
pub fn coefficient_rows(polys: &[Polynomial], m: usize) -> Vec<FieldVector> {
    (0..m)
        .map(|k| FieldVector::new(polys.iter().map(|p| p.coefficients()[k]).collect()))
        .collect()
}
