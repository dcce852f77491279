//! The aggregator's presentation to the transmission system operator: the
//! summed flexibility of a pool of devices over a timeframe, with the
//! issuers that vouched for each device.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use fim_core::FieldElement;
use fim_crypto::PublicKey;
use fim_vc::{Credential, CredentialKind};

use super::{PresentationExtras, PresentationField};
use crate::circuit::{
    CONSENT_CREDENTIALS, DEVICE_SPECIFICATION_CREDENTIALS, PREQUALIFICATION_CREDENTIALS, TIMEFRAME,
};
use crate::error::ZkpError;
use crate::inputs::CircuitInputs;
use crate::proof::Proof;

/// Public signals before the issuer keys: two sums and the timeframe.
const HEADER: usize = 4;

/// Aggregated flexibility presentation.
///
/// Every field besides `public_signals`, `proof` and `id` is decoded from
/// the public signals. Deserialization re-decodes and rejects an object
/// whose decoded fields disagree with its signals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AggregatorPresentationRepr")]
pub struct AggregatorPresentation {
    public_signals: Vec<FieldElement>,
    proof: Proof,
    id: Uuid,
    device_specification_issuer: Vec<PublicKey>,
    prequalification_issuer: Vec<PublicKey>,
    flexibility_give_sum: FieldElement,
    flexibility_receive_sum: FieldElement,
    t_start: FieldElement,
    t_end: FieldElement,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct AggregatorPresentationRepr {
    public_signals: Vec<FieldElement>,
    proof: Proof,
    id: Uuid,
    device_specification_issuer: Vec<PublicKey>,
    prequalification_issuer: Vec<PublicKey>,
    flexibility_give_sum: FieldElement,
    flexibility_receive_sum: FieldElement,
    t_start: FieldElement,
    t_end: FieldElement,
}

impl TryFrom<AggregatorPresentationRepr> for AggregatorPresentation {
    type Error = ZkpError;

    fn try_from(repr: AggregatorPresentationRepr) -> Result<Self, Self::Error> {
        let decoded = AggregatorPresentation::decode(repr.public_signals, repr.proof, repr.id)?;
        let consistent = decoded.device_specification_issuer == repr.device_specification_issuer
            && decoded.prequalification_issuer == repr.prequalification_issuer
            && decoded.flexibility_give_sum == repr.flexibility_give_sum
            && decoded.flexibility_receive_sum == repr.flexibility_receive_sum
            && decoded.t_start == repr.t_start
            && decoded.t_end == repr.t_end;
        if !consistent {
            return Err(ZkpError::Validation(
                "presentation fields disagree with its public signals".to_string(),
            ));
        }
        Ok(decoded)
    }
}

fn keys(pairs: &[FieldElement]) -> Result<Vec<PublicKey>, ZkpError> {
    pairs
        .chunks_exact(2)
        .map(|xy| {
            PublicKey::new(xy[0].clone(), xy[1].clone()).map_err(|_| {
                ZkpError::MalformedSignals(format!("issuer key ({}, {}) is not on the curve", xy[0], xy[1]))
            })
        })
        .collect()
}

impl AggregatorPresentation {
    /// Decode public signals positionally.
    ///
    /// With `a = (len - 4) / 4` agents the layout is
    /// `[give_sum, receive_sum, t_start, t_end]`, then `a` device
    /// specification issuer keys as `(x, y)` pairs, then `a`
    /// prequalification issuer keys.
    pub fn decode(
        public_signals: Vec<FieldElement>,
        proof: Proof,
        id: Uuid,
    ) -> Result<Self, ZkpError> {
        let len = public_signals.len();
        if len < HEADER || (len - HEADER) % 4 != 0 {
            return Err(ZkpError::MalformedSignals(format!(
                "expected 4 + 4a public signals, got {len}"
            )));
        }
        let agents = (len - HEADER) / 4;
        let device_specification_issuer =
            keys(&public_signals[HEADER..HEADER + 2 * agents])?;
        let prequalification_issuer = keys(&public_signals[HEADER + 2 * agents..])?;
        Ok(Self {
            flexibility_give_sum: public_signals[0].clone(),
            flexibility_receive_sum: public_signals[1].clone(),
            t_start: public_signals[2].clone(),
            t_end: public_signals[3].clone(),
            device_specification_issuer,
            prequalification_issuer,
            public_signals,
            proof,
            id,
        })
    }

    /// Flatten credential triples into the circuit's inputs.
    ///
    /// `credentials` holds one device-specifications, one prequalification
    /// and one consent credential per agent; the i-th credential of each
    /// kind belongs to agent i. `extras` must carry `tStart` and `tEnd`.
    pub fn circuit_inputs(
        credentials: &[Credential],
        extras: &PresentationExtras,
    ) -> Result<CircuitInputs, ZkpError> {
        if credentials.len() % 3 != 0 {
            return Err(ZkpError::Validation(format!(
                "the presentation requires three credentials per agent, but {} were provided",
                credentials.len()
            )));
        }
        let agents = credentials.len() / 3;

        let flatten = |kind: CredentialKind| -> Result<Vec<FieldElement>, ZkpError> {
            let of_kind: Vec<&Credential> =
                credentials.iter().filter(|c| c.kind() == kind).collect();
            if of_kind.len() != agents {
                return Err(ZkpError::Validation(format!(
                    "the presentation requires {agents} {kind}s, but {} were provided",
                    of_kind.len()
                )));
            }
            Ok(of_kind
                .into_iter()
                .flat_map(Credential::to_extended_field_list)
                .collect())
        };
        let device_specifications = flatten(CredentialKind::DeviceSpecifications)?;
        let prequalifications = flatten(CredentialKind::Prequalification)?;
        let consents = flatten(CredentialKind::Consent)?;

        let t_start = extras.get(PresentationField::TStart)?.to_field();
        let t_end = extras.get(PresentationField::TEnd)?.to_field();

        CircuitInputs::new(
            Some(Vec::new()),
            Some(vec![
                (DEVICE_SPECIFICATION_CREDENTIALS.to_string(), device_specifications),
                (PREQUALIFICATION_CREDENTIALS.to_string(), prequalifications),
                (CONSENT_CREDENTIALS.to_string(), consents),
                (TIMEFRAME.to_string(), vec![t_start, t_end]),
            ]),
        )
    }

    /// Public signals as reported by the prover.
    pub fn public_signals(&self) -> &[FieldElement] {
        &self.public_signals
    }

    /// The proof over the public signals.
    pub fn proof(&self) -> &Proof {
        &self.proof
    }

    /// Presentation id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Issuers of the device-specifications credentials, one per agent.
    pub fn device_specification_issuer(&self) -> &[PublicKey] {
        &self.device_specification_issuer
    }

    /// Issuers of the prequalification credentials, one per agent.
    pub fn prequalification_issuer(&self) -> &[PublicKey] {
        &self.prequalification_issuer
    }

    /// Total power the pool can feed into the grid.
    pub fn flexibility_give_sum(&self) -> &FieldElement {
        &self.flexibility_give_sum
    }

    /// Total power the pool can draw from the grid.
    pub fn flexibility_receive_sum(&self) -> &FieldElement {
        &self.flexibility_receive_sum
    }

    /// Start of the presented timeframe.
    pub fn t_start(&self) -> &FieldElement {
        &self.t_start
    }

    /// End of the presented timeframe.
    pub fn t_end(&self) -> &FieldElement {
        &self.t_end
    }

    /// Number of agents in the pool.
    pub fn agent_count(&self) -> usize {
        self.device_specification_issuer.len()
    }
}
