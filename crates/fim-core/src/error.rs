//! # Error Types
//!
//! Foundational errors shared by every crate in the workspace. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Higher layers wrap these with `#[from]` so a conversion failure deep in
//! the credential encoding surfaces with its original context intact.

use thiserror::Error;

/// Top-level error type for the foundational layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A value has no defined mapping into the prime field.
    #[error("unknown conversion: {0}")]
    UnknownConversion(String),

    /// An integer was supplied at or above the field modulus where a
    /// canonical field element is required.
    #[error("value is not a canonical field element: {0}")]
    NonCanonicalField(String),

    /// A timestamp operation would leave the non-negative millisecond range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A required creation extra was absent.
    #[error(transparent)]
    MissingCreationExtra(#[from] MissingCreationExtra),
}

/// A declared property was not present in a creation-extras container.
///
/// Raised by required lookups during credential and presentation
/// materialization. The field name is the stable identifier of the key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("missing creation extra: {field}")]
pub struct MissingCreationExtra {
    /// Stable identifier of the missing field.
    pub field: String,
}

impl MissingCreationExtra {
    /// Create the error for the named field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}
