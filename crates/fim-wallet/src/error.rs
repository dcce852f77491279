//! # Wallet Error Types
//!
//! The wallet wraps the errors of the layers it drives. Each variant
//! converts from its layer's error with `?`.

use thiserror::Error;

use fim_crypto::CryptoError;
use fim_vc::VcError;
use fim_zkp::ZkpError;

use crate::config::ConfigError;

/// Errors from wallet operations.
#[derive(Error, Debug)]
pub enum WalletError {
    /// Credential issuance, encoding or storage failed.
    #[error(transparent)]
    Credential(#[from] VcError),

    /// Presentation proving, decoding or storage failed.
    #[error(transparent)]
    Presentation(#[from] ZkpError),

    /// Key generation failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The wallet configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
