//! # Mock Proving Backend
//!
//! A deterministic, transparent stand-in for snarkjs. Circuits are
//! registered by name together with a native evaluator that computes the
//! witness's public signals (and enforces the circuit's constraints by
//! returning an error). The "proof" is a SHA-256 binding of the circuit
//! name and public signals, expanded into Groth16-shaped field elements.
//!
//! ## Security Notice
//!
//! This backend provides NO zero-knowledge and NO soundness against a
//! party that can run it: anyone can mint a verifying proof for any
//! signals. It is for tests, demos and deployments where the prover is
//! trusted.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use fim_core::FieldElement;

use crate::circuit::{self, AGGREGATED_FLEXIBILITY_CIRCUIT};
use crate::error::ZkpError;
use crate::inputs::CircuitInputs;
use crate::proof::{CircomResult, Proof};
use crate::provider::ZkpProvider;

/// Native circuit evaluator returning `(public_inputs, outputs)`.
pub type Evaluator = Arc<
    dyn Fn(&CircuitInputs) -> Result<(Vec<FieldElement>, Vec<FieldElement>), ZkpError>
        + Send
        + Sync,
>;

/// Deterministic mock of a Groth16 proving backend.
#[derive(Clone, Default)]
pub struct MockZkpProvider {
    circuits: HashMap<String, Evaluator>,
}

impl fmt::Debug for MockZkpProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.circuits.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("MockZkpProvider")
            .field("circuits", &names)
            .finish()
    }
}

impl MockZkpProvider {
    /// A provider with no circuits registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider with the aggregated flexibility circuit registered under
    /// its default name.
    pub fn with_aggregated_flexibility(max_agents: usize) -> Self {
        Self::new().register_aggregated_flexibility(AGGREGATED_FLEXIBILITY_CIRCUIT, max_agents)
    }

    /// Register the aggregated flexibility circuit under `name`.
    pub fn register_aggregated_flexibility(self, name: impl Into<String>, max_agents: usize) -> Self {
        self.register(name, move |inputs: &CircuitInputs| {
            circuit::aggregated_flexibility(inputs, max_agents)
        })
    }

    /// Register an evaluator under `name`, replacing any previous one.
    pub fn register<F>(mut self, name: impl Into<String>, evaluator: F) -> Self
    where
        F: Fn(&CircuitInputs) -> Result<(Vec<FieldElement>, Vec<FieldElement>), ZkpError>
            + Send
            + Sync
            + 'static,
    {
        self.circuits.insert(name.into(), Arc::new(evaluator));
        self
    }

    /// Whether a circuit is registered under `name`.
    pub fn has_circuit(&self, name: &str) -> bool {
        self.circuits.contains_key(name)
    }

    fn evaluator(&self, name: &str) -> Result<&Evaluator, ZkpError> {
        self.circuits
            .get(name)
            .ok_or_else(|| ZkpError::NoSuchCircuit(name.to_string()))
    }
}

/// Expand SHA-256(circuit ‖ 0x00 ‖ signals) into a Groth16-shaped proof.
fn binding_proof(circuit: &str, public_signals: &[FieldElement]) -> Result<Proof, ZkpError> {
    let mut hasher = Sha256::new();
    hasher.update(circuit.as_bytes());
    hasher.update([0u8]);
    for signal in public_signals {
        hasher.update(signal.to_bytes_be());
    }
    let seed = hasher.finalize();

    let element = |label: u8| {
        let bytes = Sha256::new().chain_update(seed).chain_update([label]).finalize();
        FieldElement::from_bytes_be_reduced(&bytes)
    };
    Proof::new(
        vec![element(0), element(1), FieldElement::one()],
        vec![
            vec![element(2), element(3)],
            vec![element(4), element(5)],
            vec![FieldElement::one(), FieldElement::zero()],
        ],
        vec![element(6), element(7), FieldElement::one()],
        "groth16",
        "bn128",
    )
}

#[async_trait]
impl ZkpProvider for MockZkpProvider {
    async fn full_prove(
        &self,
        circuit: &str,
        inputs: &CircuitInputs,
    ) -> Result<CircomResult, ZkpError> {
        let evaluator = self.evaluator(circuit)?;
        let (public_inputs, outputs) = (evaluator.as_ref())(inputs)?;
        let signals: Vec<FieldElement> = outputs.iter().chain(&public_inputs).cloned().collect();
        let proof = binding_proof(circuit, &signals)?;
        tracing::debug!(
            circuit,
            inputs = inputs.number_of_inputs(),
            signals = signals.len(),
            "mock proof generated"
        );
        Ok(CircomResult {
            public_inputs,
            outputs,
            proof,
        })
    }

    async fn verify(
        &self,
        circuit: &str,
        public_signals: &[FieldElement],
        proof: &Proof,
    ) -> Result<bool, ZkpError> {
        self.evaluator(circuit)?;
        Ok(binding_proof(circuit, public_signals)? == *proof)
    }

    fn provider_name(&self) -> &str {
        "mock-groth16"
    }
}
