//! Error types for proof construction and verification

use thiserror::Error;

/// Rejected inputs. Raised before any commitment is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),
    #[error("Invalid scalar encoding")]
    InvalidScalar,
    #[error("Point is not on the curve")]
    InvalidPoint,
    #[error("Anonymity set size {0} is not a power of two greater than one")]
    InvalidAnonymitySetSize(usize),
    #[error("Statement vectors have mismatched lengths")]
    LengthMismatch,
    #[error("Index {0} is out of range for an anonymity set of size {1}")]
    InvalidIndex(usize, usize),
    #[error("Sender and recipient indices must differ in parity")]
    InvalidIndexParity,
    #[error("{0} parties in the anonymity set are unregistered")]
    UnregisteredAccounts(usize),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Malformed proof bytes: {0}")]
    MalformedProof(String),
    #[error("Malformed calldata: {0}")]
    MalformedCalldata(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofVerifyError {
    #[error("Proof verification failed: {0}")]
    VerificationFailed(String),
    #[error("Invalid proof format")]
    InvalidProof,
    #[error("Commitment verification failed")]
    CommitmentError,
    #[error("Inner product check failed")]
    InnerProductError,
    #[error("Sigma challenge mismatch")]
    ChallengeMismatch,
}
