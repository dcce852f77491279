//! # Groth16 Proof Objects
//!
//! [`Proof`] mirrors the snarkjs proof JSON (`pi_a`, `pi_b`, `pi_c`,
//! `protocol`, `curve`). Arities are checked on construction and on
//! deserialization, so a `Proof` value always has the Groth16 shape.

use serde::{Deserialize, Serialize};

use fim_core::FieldElement;

use crate::error::ZkpError;

/// A Groth16 proof in projective coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProofRepr")]
pub struct Proof {
    pi_a: Vec<FieldElement>,
    pi_b: Vec<Vec<FieldElement>>,
    pi_c: Vec<FieldElement>,
    protocol: String,
    curve: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProofRepr {
    pi_a: Vec<FieldElement>,
    pi_b: Vec<Vec<FieldElement>>,
    pi_c: Vec<FieldElement>,
    protocol: String,
    curve: String,
}

impl TryFrom<ProofRepr> for Proof {
    type Error = ZkpError;

    fn try_from(repr: ProofRepr) -> Result<Self, Self::Error> {
        Proof::new(repr.pi_a, repr.pi_b, repr.pi_c, repr.protocol, repr.curve)
    }
}

impl Proof {
    /// Create a proof, checking `pi_a` has 3 elements, `pi_b` is 3×2 and
    /// `pi_c` has 3 elements.
    pub fn new(
        pi_a: Vec<FieldElement>,
        pi_b: Vec<Vec<FieldElement>>,
        pi_c: Vec<FieldElement>,
        protocol: impl Into<String>,
        curve: impl Into<String>,
    ) -> Result<Self, ZkpError> {
        if pi_a.len() != 3 {
            return Err(ZkpError::InvalidProof(format!(
                "pi_a must have 3 elements, got {}",
                pi_a.len()
            )));
        }
        if pi_b.len() != 3 || pi_b.iter().any(|row| row.len() != 2) {
            return Err(ZkpError::InvalidProof(
                "pi_b must be a 3x2 array".to_string(),
            ));
        }
        if pi_c.len() != 3 {
            return Err(ZkpError::InvalidProof(format!(
                "pi_c must have 3 elements, got {}",
                pi_c.len()
            )));
        }
        Ok(Self {
            pi_a,
            pi_b,
            pi_c,
            protocol: protocol.into(),
            curve: curve.into(),
        })
    }

    /// First G1 element.
    pub fn pi_a(&self) -> &[FieldElement] {
        &self.pi_a
    }

    /// G2 element.
    pub fn pi_b(&self) -> &[Vec<FieldElement>] {
        &self.pi_b
    }

    /// Second G1 element.
    pub fn pi_c(&self) -> &[FieldElement] {
        &self.pi_c
    }

    /// Proof system name, e.g. `groth16`.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Curve name, e.g. `bn128`.
    pub fn curve(&self) -> &str {
        &self.curve
    }

    /// snarkjs-compatible JSON.
    pub fn to_json(&self) -> Result<serde_json::Value, ZkpError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parse snarkjs proof JSON.
    pub fn from_json_str(text: &str) -> Result<Self, ZkpError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// The result of a full prove: public inputs, circuit outputs and proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircomResult {
    /// Public inputs of the witness.
    pub public_inputs: Vec<FieldElement>,
    /// Circuit outputs.
    pub outputs: Vec<FieldElement>,
    /// The proof.
    pub proof: Proof,
}

impl CircomResult {
    /// Outputs followed by public inputs, the order snarkjs reports
    /// public signals in.
    pub fn public_signals(&self) -> Vec<FieldElement> {
        self.outputs
            .iter()
            .chain(&self.public_inputs)
            .cloned()
            .collect()
    }
}
