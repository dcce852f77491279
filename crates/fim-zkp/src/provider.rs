//! # Proving Backend Port
//!
//! Presentation services reach the proving backend only through
//! [`ZkpProvider`]. Circuits are addressed by name; the backend owns the
//! compiled circuits and keys.
//!
//! ## Security Invariant
//!
//! `verify` reports a cryptographically invalid proof as `Ok(false)`.
//! Errors are reserved for an unknown circuit or a backend failure.

use async_trait::async_trait;

use fim_core::FieldElement;

use crate::error::ZkpError;
use crate::inputs::CircuitInputs;
use crate::proof::{CircomResult, Proof};

/// Port for witness generation, proving and verification.
#[async_trait]
pub trait ZkpProvider: Send + Sync {
    /// Compute the witness for `inputs` and prove it.
    ///
    /// Fails with [`ZkpError::NoSuchCircuit`] for an unknown circuit.
    async fn full_prove(
        &self,
        circuit: &str,
        inputs: &CircuitInputs,
    ) -> Result<CircomResult, ZkpError>;

    /// Check `proof` against `public_signals`.
    ///
    /// Fails with [`ZkpError::NoSuchCircuit`] for an unknown circuit.
    async fn verify(
        &self,
        circuit: &str,
        public_signals: &[FieldElement],
        proof: &Proof,
    ) -> Result<bool, ZkpError>;

    /// Human-readable name for this provider (for diagnostics/logging).
    fn provider_name(&self) -> &str;
}
