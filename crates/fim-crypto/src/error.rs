//! # Cryptographic Error Types
//!
//! Structured errors for hashing, Merkle proofs and key handling in
//! `fim-crypto`. Uses `thiserror` for ergonomic error definitions with
//! diagnostic context.
//!
//! A cryptographically invalid signature is never an error: verification
//! resolves to `false`. Errors are reserved for misuse (wrong arity, out of
//! range index, malformed key material).

use fim_core::CoreError;
use thiserror::Error;

/// Errors from cryptographic operations in the flexibility wallet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Poseidon block size outside `1..=16`.
    #[error("invalid Poseidon block size {0}: must be between 1 and 16")]
    InvalidBlockSize(usize),

    /// A fixed-arity hash was given the wrong number of inputs.
    #[error("expected {expected} hash inputs, got {actual}")]
    InputArity {
        /// Inputs the hasher accepts.
        expected: usize,
        /// Inputs supplied.
        actual: usize,
    },

    /// An operation that needs at least one element received none.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// A Merkle proof was requested for a leaf past the padded leaf count.
    #[error("leaf index {index} out of bounds for tree with {leaf_count} leaves")]
    IndexOutOfBounds {
        /// Requested leaf index.
        index: usize,
        /// Padded leaf count of the tree.
        leaf_count: usize,
    },

    /// Key bytes or coordinates do not describe a usable key.
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// A field conversion failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_block_size_display() {
        let msg = format!("{}", CryptoError::InvalidBlockSize(17));
        assert!(msg.contains("17"));
        assert!(msg.contains("between 1 and 16"));
    }

    #[test]
    fn input_arity_display() {
        let err = CryptoError::InputArity {
            expected: 2,
            actual: 3,
        };
        assert_eq!(format!("{err}"), "expected 2 hash inputs, got 3");
    }

    #[test]
    fn index_out_of_bounds_display() {
        let err = CryptoError::IndexOutOfBounds {
            index: 8,
            leaf_count: 8,
        };
        let msg = format!("{err}");
        assert!(msg.contains("index 8"));
        assert!(msg.contains("8 leaves"));
    }

    #[test]
    fn core_error_is_transparent() {
        let err: CryptoError = CoreError::UnknownConversion("x".into()).into();
        assert_eq!(format!("{err}"), "unknown conversion: x");
    }
}
