//! # Signature Provider Abstraction
//!
//! Issuance and verification services never touch curve arithmetic
//! directly; they go through [`SignatureProvider`], which can be backed by
//! local keys, a hardware wallet or a remote signer. Signing may suspend, so
//! the trait is async.
//!
//! - [`EddsaSignatureProvider`]: in-process EdDSA-Poseidon with keys drawn
//!   from the OS CSPRNG.
//!
//! ## Security Invariants
//!
//! - `SignatureProvider` is `Send + Sync` for use across async tasks.
//! - `verify` reports invalid signatures as `false`, never as an error.

use async_trait::async_trait;
use rand_core::OsRng;

use fim_core::FieldElement;

use crate::eddsa::{PrivateKey, PublicKey, Signature};
use crate::error::CryptoError;

/// Port for key generation, signing and verification.
#[async_trait]
pub trait SignatureProvider: Send + Sync {
    /// Generate a fresh key pair.
    async fn key_pair(&self) -> Result<(PrivateKey, PublicKey), CryptoError>;

    /// Derive the public key for `private_key`.
    async fn public_key(&self, private_key: &PrivateKey) -> Result<PublicKey, CryptoError>;

    /// Sign a field element.
    async fn sign(
        &self,
        message: &FieldElement,
        private_key: &PrivateKey,
    ) -> Result<Signature, CryptoError>;

    /// Check `signature` over `message` against `public_key`.
    async fn verify(
        &self,
        message: &FieldElement,
        signature: &Signature,
        public_key: &PublicKey,
    ) -> bool;

    /// Human-readable name for this provider (for diagnostics/logging).
    fn provider_name(&self) -> &str;
}

// ─── EddsaSignatureProvider ──────────────────────────────────────────────

/// In-process EdDSA-Poseidon over BabyJubJub.
#[derive(Debug, Default, Clone, Copy)]
pub struct EddsaSignatureProvider;

impl EddsaSignatureProvider {
    /// Create the provider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SignatureProvider for EddsaSignatureProvider {
    async fn key_pair(&self) -> Result<(PrivateKey, PublicKey), CryptoError> {
        let private_key = PrivateKey::generate(&mut OsRng);
        let public_key = private_key.public_key();
        tracing::debug!(public_key = %public_key, "generated EdDSA key pair");
        Ok((private_key, public_key))
    }

    async fn public_key(&self, private_key: &PrivateKey) -> Result<PublicKey, CryptoError> {
        Ok(private_key.public_key())
    }

    async fn sign(
        &self,
        message: &FieldElement,
        private_key: &PrivateKey,
    ) -> Result<Signature, CryptoError> {
        Ok(private_key.sign(message))
    }

    async fn verify(
        &self,
        message: &FieldElement,
        signature: &Signature,
        public_key: &PublicKey,
    ) -> bool {
        let valid = public_key.verify(message, signature);
        if !valid {
            tracing::debug!(public_key = %public_key, "signature rejected");
        }
        valid
    }

    fn provider_name(&self) -> &str {
        "eddsa-poseidon"
    }
}
