//! Prover randomness.
//!
//! Provers draw every blinding and nonce through [`ScalarSource`], so tests
//! can replay a fixed sequence and production uses [`RandomTape`].

use crate::scalar::Scalar;
use ark_bn254::Fr;
use ark_ff::PrimeField;
use merlin::Transcript;
use rand::rngs::OsRng;

/// Source of prover scalars
pub trait ScalarSource {
    fn random_scalar(&mut self, label: &'static [u8]) -> Scalar;

    fn random_vector(&mut self, label: &'static [u8], len: usize) -> Vec<Scalar> {
        (0..len).map(|_| self.random_scalar(label)).collect()
    }
}

/// Random tape seeded from the OS, expanded with a Merlin transcript
pub struct RandomTape {
    tape: Transcript,
}

impl RandomTape {
    pub fn new(name: &'static [u8]) -> Self {
        let tape = {
            let mut rng = OsRng;
            let mut tape = Transcript::new(name);
            tape.append_message(b"init_randomness", &Scalar::random(&mut rng).to_bytes());
            tape
        };
        Self { tape }
    }
}

impl ScalarSource for RandomTape {
    fn random_scalar(&mut self, label: &'static [u8]) -> Scalar {
        let mut buf = [0u8; 64];
        self.tape.challenge_bytes(label, &mut buf);
        Scalar(Fr::from_le_bytes_mod_order(&buf))
    }
}

/// Replays a fixed list of scalars, cycling when exhausted
#[derive(Clone, Debug)]
pub struct FixedScalarSource {
    values: Vec<Scalar>,
    next: usize,
}

impl FixedScalarSource {
    pub fn new(values: Vec<Scalar>) -> Self {
        FixedScalarSource { values, next: 0 }
    }

    /// A source that always yields `value`
    pub fn constant(value: Scalar) -> Self {
        FixedScalarSource::new(vec![value])
    }
}

impl ScalarSource for FixedScalarSource {
    fn random_scalar(&mut self, _label: &'static [u8]) -> Scalar {
        if self.values.is_empty() {
            return Scalar::one();
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}
