//! # Proof Layer Error Types
//!
//! A proof that fails verification is not an error; `verify` returns
//! `Ok(false)` for it.

use thiserror::Error;

use fim_core::{CoreError, FieldElement, MissingCreationExtra};
use fim_crypto::CryptoError;
use fim_vc::VcError;

/// Errors from circuit input construction, proving and presentations.
#[derive(Error, Debug)]
pub enum ZkpError {
    /// No circuit is registered under the name.
    #[error("no circuit named {0:?} is registered")]
    NoSuchCircuit(String),

    /// Lookup of a presentation that must exist found nothing.
    #[error("no presentation with id hash {0} was found")]
    NoSuchPresentation(FieldElement),

    /// A required presentation creation extra was absent.
    #[error(transparent)]
    MissingCreationExtra(#[from] MissingCreationExtra),

    /// Inputs to a presentation or circuit are inconsistent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A proof object does not have the expected shape.
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    /// Public signals do not match the presentation's layout.
    #[error("malformed public signals: {0}")]
    MalformedSignals(String),

    /// The witness violates a circuit constraint.
    #[error("circuit {circuit} is unsatisfied: {reason}")]
    Unsatisfied {
        /// Circuit name.
        circuit: String,
        /// The violated constraint.
        reason: String,
    },

    /// The presentation encoding could not be produced or parsed.
    #[error("presentation encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Credential layer failure.
    #[error(transparent)]
    Credential(#[from] VcError),

    /// Hashing or curve failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Field conversion failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}
