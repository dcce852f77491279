//! # Aggregated Flexibility Circuit
//!
//! Native evaluation of the `aggregatedFlexibilityPresentation` circuit.
//! The circuit receives, per participating agent, the extended scalar lists
//! of a device-specifications, a prequalification and a consent credential,
//! plus a public timeframe. For every agent it constrains:
//!
//! - each credential's root to be the Merkle root over its metadata and
//!   body hashes, and the issuer signature to verify over that root;
//! - the consent credential's HEM signature to verify over the preliminary
//!   root (the tree without `hemSignature`);
//! - the three credentials to name the same device;
//! - the prequalification to be `FLEX`;
//! - the consent window to cover the requested timeframe.
//!
//! ## Outputs
//!
//! ```text
//! [giveSum, receiveSum, tStart, tEnd,
//!  dsIssuer[0].x, dsIssuer[0].y, ..., pqIssuer[0].x, pqIssuer[0].y, ...]
//! ```
//!
//! The circuit has no public inputs besides those outputs.

use fim_core::FieldElement;
use fim_crypto::{BinaryMerkleTree, PoseidonHashable, PublicKey, Signature};
use fim_vc::{ConsentField, CredentialField, CredentialKind, PrequalificationType};

use crate::error::ZkpError;
use crate::inputs::CircuitInputs;

/// Circuit name of the aggregated flexibility presentation.
pub const AGGREGATED_FLEXIBILITY_CIRCUIT: &str = "aggregatedFlexibilityPresentation";

/// Array input holding every device-specifications extended list.
pub const DEVICE_SPECIFICATION_CREDENTIALS: &str = "deviceSpecificationCredentials";
/// Array input holding every prequalification extended list.
pub const PREQUALIFICATION_CREDENTIALS: &str = "prequalificationCredentials";
/// Array input holding every consent extended list.
pub const CONSENT_CREDENTIALS: &str = "consentCredentials";
/// Array input `[tStart, tEnd]`.
pub const TIMEFRAME: &str = "timeframe";

// Offsets into the metadata preimage block that follows the compact list.
const ISSUER_X: usize = 1;
const ISSUER_Y: usize = 2;
const SIGNATURE: usize = 5;
// The extended body starts after the nine metadata preimages.
const BODY: usize = 9;
// Consent extended body: deviceID, hemIssuer (2), hemSignature (3),
// flexibilityGive, flexibilityReceive, tStart, tEnd.
const HEM_ISSUER: usize = 1;
const HEM_SIGNATURE: usize = 3;
const FLEXIBILITY_GIVE: usize = 6;
const T_START: usize = 8;

fn unsatisfied(reason: impl Into<String>) -> ZkpError {
    ZkpError::Unsatisfied {
        circuit: AGGREGATED_FLEXIBILITY_CIRCUIT.to_string(),
        reason: reason.into(),
    }
}

/// One credential's extended scalar list, read at the circuit's offsets.
struct ExtendedCredential<'a> {
    kind: CredentialKind,
    scalars: &'a [FieldElement],
}

impl<'a> ExtendedCredential<'a> {
    fn compact(&self) -> &'a [FieldElement] {
        &self.scalars[..self.kind.compact_len()]
    }

    fn preimage(&self, offset: usize) -> &'a FieldElement {
        &self.scalars[self.kind.compact_len() + offset]
    }

    fn body(&self, offset: usize) -> &'a FieldElement {
        self.preimage(BODY + offset)
    }

    fn key_at(&self, x: &FieldElement, y: &FieldElement) -> Result<PublicKey, ZkpError> {
        PublicKey::new(x.clone(), y.clone())
            .map_err(|_| unsatisfied(format!("{} key is not on the curve", self.kind)))
    }

    fn issuer(&self) -> Result<PublicKey, ZkpError> {
        self.key_at(self.preimage(ISSUER_X), self.preimage(ISSUER_Y))
    }

    fn signature_at(&self, offset: usize) -> Signature {
        Signature::new(
            self.preimage(offset).clone(),
            self.preimage(offset + 1).clone(),
            self.preimage(offset + 2).clone(),
        )
    }

    fn device_id(&self) -> &'a FieldElement {
        self.body(0)
    }

    /// Signing-tree leaves from the compact list, optionally leaving out
    /// one body field.
    fn leaves(&self, without: Option<CredentialField>) -> Vec<FieldElement> {
        let compact = self.compact();
        let mut leaves = vec![
            compact[0].clone(),
            compact[1].clone(),
            compact[2].clone(),
            compact[4].clone(),
        ];
        leaves.extend(
            self.kind
                .fields()
                .iter()
                .zip(&compact[6..])
                .filter(|(field, _)| Some(**field) != without)
                .map(|(_, hash)| hash.clone()),
        );
        leaves
    }

    fn check_signed_root(&self) -> Result<(), ZkpError> {
        let tree = BinaryMerkleTree::from_leaf_hashes(self.leaves(None))?;
        let root = &self.compact()[5];
        if tree.root() != root {
            return Err(unsatisfied(format!("{} root mismatch", self.kind)));
        }
        if !self.issuer()?.verify(root, &self.signature_at(SIGNATURE)) {
            return Err(unsatisfied(format!("{} issuer signature invalid", self.kind)));
        }
        Ok(())
    }
}

fn split<'a>(
    inputs: &'a CircuitInputs,
    name: &str,
    kind: CredentialKind,
) -> Result<Vec<ExtendedCredential<'a>>, ZkpError> {
    let scalars = inputs
        .array(name)
        .ok_or_else(|| ZkpError::Validation(format!("missing array input {name}")))?;
    let stride = kind.extended_len();
    if scalars.len() % stride != 0 {
        return Err(ZkpError::Validation(format!(
            "{name} has {} scalars, not a multiple of {stride}",
            scalars.len()
        )));
    }
    Ok(scalars
        .chunks(stride)
        .map(|scalars| ExtendedCredential { kind, scalars })
        .collect())
}

/// Evaluate the circuit, returning `(public_inputs, outputs)`.
pub fn aggregated_flexibility(
    inputs: &CircuitInputs,
    max_agents: usize,
) -> Result<(Vec<FieldElement>, Vec<FieldElement>), ZkpError> {
    let devices = split(inputs, DEVICE_SPECIFICATION_CREDENTIALS, CredentialKind::DeviceSpecifications)?;
    let prequalifications = split(inputs, PREQUALIFICATION_CREDENTIALS, CredentialKind::Prequalification)?;
    let consents = split(inputs, CONSENT_CREDENTIALS, CredentialKind::Consent)?;

    let agents = devices.len();
    if prequalifications.len() != agents || consents.len() != agents {
        return Err(ZkpError::Validation(format!(
            "unequal credential counts: {} device specifications, {} prequalifications, {} consents",
            agents,
            prequalifications.len(),
            consents.len()
        )));
    }
    if agents == 0 || agents > max_agents {
        return Err(ZkpError::Validation(format!(
            "circuit accepts 1 to {max_agents} agents, got {agents}"
        )));
    }

    let (t_start, t_end) = match inputs.array(TIMEFRAME) {
        Some([start, end]) => (start, end),
        _ => {
            return Err(ZkpError::Validation(
                "timeframe must be a two-element array".to_string(),
            ))
        }
    };
    if t_start > t_end {
        return Err(unsatisfied("timeframe starts after it ends"));
    }

    let flex = PrequalificationType::Flex.poseidon_hash();

    let mut give_sum = FieldElement::zero();
    let mut receive_sum = FieldElement::zero();
    let mut device_issuers = Vec::with_capacity(2 * agents);
    let mut prequalification_issuers = Vec::with_capacity(2 * agents);

    for (agent, ((device, prequalification), consent)) in devices
        .iter()
        .zip(&prequalifications)
        .zip(&consents)
        .enumerate()
    {
        device.check_signed_root()?;
        prequalification.check_signed_root()?;
        consent.check_signed_root()?;

        if device.device_id() != prequalification.device_id()
            || device.device_id() != consent.device_id()
        {
            return Err(unsatisfied(format!("agent {agent}: credentials name different devices")));
        }

        // compact[6 + 1] is the prequalificationType hash.
        if prequalification.compact()[7] != flex {
            return Err(unsatisfied(format!("agent {agent}: device is not prequalified for FLEX")));
        }

        let hem = consent.key_at(consent.body(HEM_ISSUER), consent.body(HEM_ISSUER + 1))?;
        let preliminary = BinaryMerkleTree::from_leaf_hashes(
            consent.leaves(Some(CredentialField::Consent(ConsentField::HemSignature))),
        )?;
        if !hem.verify(preliminary.root(), &consent.signature_at(BODY + HEM_SIGNATURE)) {
            return Err(unsatisfied(format!("agent {agent}: HEM signature invalid")));
        }

        let (consent_start, consent_end) = (consent.body(T_START), consent.body(T_START + 1));
        if consent_start > t_start || t_end > consent_end {
            return Err(unsatisfied(format!(
                "agent {agent}: consent window does not cover the timeframe"
            )));
        }

        give_sum = give_sum + consent.body(FLEXIBILITY_GIVE);
        receive_sum = receive_sum + consent.body(FLEXIBILITY_GIVE + 1);
        device_issuers.push(device.preimage(ISSUER_X).clone());
        device_issuers.push(device.preimage(ISSUER_Y).clone());
        prequalification_issuers.push(prequalification.preimage(ISSUER_X).clone());
        prequalification_issuers.push(prequalification.preimage(ISSUER_Y).clone());
    }

    let mut outputs = vec![give_sum, receive_sum, t_start.clone(), t_end.clone()];
    outputs.extend(device_issuers);
    outputs.extend(prequalification_issuers);
    Ok((Vec::new(), outputs))
}
