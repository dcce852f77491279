//! # Verifiable Presentations
//!
//! A presentation bundles a zero-knowledge proof with its public signals.
//! [`VerifiablePresentation`] is the sum over presentation kinds; each kind
//! knows its circuit, how to flatten credentials into circuit inputs and
//! how to decode the circuit's public signals.
//!
//! Presentations are stored under the Poseidon hash of their id
//! ([`VerifiablePresentation::id_hash`]), not the id itself.

mod aggregator;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fim_core::{CreationExtras, FieldElement, Timestamp};
use fim_crypto::PoseidonHashable;
use fim_vc::Credential;

use crate::circuit::AGGREGATED_FLEXIBILITY_CIRCUIT;
use crate::error::ZkpError;
use crate::inputs::CircuitInputs;
use crate::proof::Proof;

pub use aggregator::AggregatorPresentation;

/// Creation extras a presentation may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PresentationField {
    /// Start of the presented timeframe.
    TStart,
    /// End of the presented timeframe.
    TEnd,
}

impl fmt::Display for PresentationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PresentationField::TStart => "tStart",
            PresentationField::TEnd => "tEnd",
        })
    }
}

/// Creation extras for presentations.
pub type PresentationExtras = CreationExtras<PresentationField, Timestamp>;

/// Presentation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresentationKind {
    /// Aggregated flexibility of a device pool.
    #[serde(rename = "AggregatorPresentation")]
    Aggregator,
}

impl PresentationKind {
    /// The `type` discriminant of the JSON encoding.
    pub const fn type_name(self) -> &'static str {
        match self {
            PresentationKind::Aggregator => "AggregatorPresentation",
        }
    }

    /// Name of the circuit that proves presentations of this kind.
    pub const fn circuit_name(self) -> &'static str {
        match self {
            PresentationKind::Aggregator => AGGREGATED_FLEXIBILITY_CIRCUIT,
        }
    }

    /// Flatten `credentials` and `extras` into this kind's circuit inputs.
    pub fn circuit_inputs(
        self,
        credentials: &[Credential],
        extras: &PresentationExtras,
    ) -> Result<CircuitInputs, ZkpError> {
        match self {
            PresentationKind::Aggregator => AggregatorPresentation::circuit_inputs(credentials, extras),
        }
    }
}

impl fmt::Display for PresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A presentation of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VerifiablePresentation {
    /// Aggregated flexibility.
    #[serde(rename = "AggregatorPresentation")]
    Aggregator(AggregatorPresentation),
}

/// Materialize a presentation of `kind` from a prover's public signals,
/// assigning a fresh id.
pub fn create(
    kind: PresentationKind,
    public_signals: Vec<FieldElement>,
    proof: Proof,
) -> Result<VerifiablePresentation, ZkpError> {
    match kind {
        PresentationKind::Aggregator => Ok(VerifiablePresentation::Aggregator(
            AggregatorPresentation::decode(public_signals, proof, Uuid::new_v4())?,
        )),
    }
}

impl VerifiablePresentation {
    /// The presentation kind.
    pub fn kind(&self) -> PresentationKind {
        match self {
            VerifiablePresentation::Aggregator(_) => PresentationKind::Aggregator,
        }
    }

    /// Presentation id.
    pub fn id(&self) -> Uuid {
        match self {
            VerifiablePresentation::Aggregator(p) => p.id(),
        }
    }

    /// Poseidon hash of the id; the storage key.
    pub fn id_hash(&self) -> FieldElement {
        self.id().poseidon_hash()
    }

    /// Public signals of the proof.
    pub fn public_signals(&self) -> &[FieldElement] {
        match self {
            VerifiablePresentation::Aggregator(p) => p.public_signals(),
        }
    }

    /// The proof.
    pub fn proof(&self) -> &Proof {
        match self {
            VerifiablePresentation::Aggregator(p) => p.proof(),
        }
    }

    /// The aggregator view, if this is one.
    pub fn as_aggregator(&self) -> Option<&AggregatorPresentation> {
        match self {
            VerifiablePresentation::Aggregator(p) => Some(p),
        }
    }

    /// Canonical JSON encoding.
    pub fn to_json(&self) -> Result<serde_json::Value, ZkpError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parse the canonical JSON encoding.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ZkpError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Parse the canonical JSON encoding from text.
    pub fn from_json_str(text: &str) -> Result<Self, ZkpError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proof() -> Proof {
        let z = FieldElement::zero;
        Proof::new(
            vec![z(), z(), z()],
            vec![vec![z(), z()], vec![z(), z()], vec![z(), z()]],
            vec![z(), z(), z()],
            "groth16",
            "bn128",
        )
        .unwrap()
    }

    #[test]
    fn create_assigns_fresh_ids() {
        let signals = vec![FieldElement::zero(); 4];
        let a = create(PresentationKind::Aggregator, signals.clone(), proof()).unwrap();
        let b = create(PresentationKind::Aggregator, signals, proof()).unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.id_hash(), b.id_hash());
        assert_eq!(a.id_hash(), a.id().poseidon_hash());
    }

    #[test]
    fn json_carries_type_tag() {
        let p = create(PresentationKind::Aggregator, vec![FieldElement::one(); 4], proof()).unwrap();
        let json = p.to_json().unwrap();
        assert_eq!(json["type"], "AggregatorPresentation");
        assert_eq!(VerifiablePresentation::from_json(json).unwrap(), p);
    }

    #[test]
    fn missing_timeframe_is_reported() {
        let extras = PresentationExtras::new().with(PresentationField::TStart, Timestamp::from_millis(1));
        let err = PresentationKind::Aggregator
            .circuit_inputs(&[], &extras)
            .unwrap_err();
        assert!(matches!(err, ZkpError::MissingCreationExtra(ref e) if e.field == "tEnd"));
    }

    #[test]
    fn circuit_names() {
        assert_eq!(
            PresentationKind::Aggregator.circuit_name(),
            "aggregatedFlexibilityPresentation"
        );
        assert_eq!(PresentationKind::Aggregator.to_string(), "AggregatorPresentation");
    }
}
