//! # Credential Error Types
//!
//! Errors raised while building, encoding, signing or looking up
//! credentials. A signature that fails to verify is not an error; the
//! verification service returns `false` for it.

use thiserror::Error;
use uuid::Uuid;

use fim_core::{CoreError, MissingCreationExtra};
use fim_crypto::CryptoError;

use crate::field::ValueType;

/// Errors from the credential layer.
#[derive(Error, Debug)]
pub enum VcError {
    /// A declared property was absent from the creation extras.
    #[error(transparent)]
    MissingCreationExtra(#[from] MissingCreationExtra),

    /// A value of the wrong type was supplied for a declared property.
    #[error("creation extra {field} expects a {expected} value, got {actual}")]
    ExtraTypeMismatch {
        /// The property name.
        field: String,
        /// The declared type.
        expected: ValueType,
        /// The supplied type.
        actual: ValueType,
    },

    /// A credential invariant does not hold.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A credential of one kind was handed to a store or factory for another.
    #[error("expected a {expected} credential, got {actual}")]
    KindMismatch {
        /// The accepted credential type name.
        expected: &'static str,
        /// The supplied credential type name.
        actual: &'static str,
    },

    /// Lookup of a credential that must exist found nothing.
    #[error("no credential with id {0} was found")]
    NoSuchCredential(Uuid),

    /// The canonical JSON encoding could not be produced or parsed.
    #[error("credential encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Field conversion failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Hashing, Merkle or signing failure.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_extra_is_transparent() {
        let err: VcError = MissingCreationExtra::new("deviceID").into();
        assert_eq!(format!("{err}"), "missing creation extra: deviceID");
    }

    #[test]
    fn type_mismatch_display() {
        let err = VcError::ExtraTypeMismatch {
            field: "tStart".into(),
            expected: ValueType::Timestamp,
            actual: ValueType::Text,
        };
        assert_eq!(
            format!("{err}"),
            "creation extra tStart expects a timestamp value, got text"
        );
    }

    #[test]
    fn no_such_credential_display() {
        let id = Uuid::nil();
        let msg = format!("{}", VcError::NoSuchCredential(id));
        assert!(msg.contains("00000000-0000-0000-0000-000000000000"));
    }
}
