//! Consent credential: the owner's permission to use a device's flexibility
//! within a time window, countersigned by the home energy manager (HEM).

use serde::{Deserialize, Serialize};

use fim_core::{FieldElement, Timestamp};
use fim_crypto::{PublicKey, Signature};

use super::CredentialMetadata;
use crate::error::VcError;
use crate::field::{ConsentField as F, CredentialField};
use crate::value::{HashableCreationExtras, HashableValue, PrequalificationType};

/// Consent to use up to `flexibility_give` / `flexibility_receive` of a
/// device between `t_start` and `t_end`.
///
/// Invariant: `t_start <= t_end`. Both construction paths (factory and
/// JSON) enforce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ConsentCredentialRepr")]
pub struct ConsentCredential {
    #[serde(flatten)]
    pub(crate) metadata: CredentialMetadata,
    #[serde(rename = "deviceID")]
    device_id: FieldElement,
    #[serde(rename = "hemIssuer")]
    hem_issuer: PublicKey,
    #[serde(rename = "hemSignature")]
    hem_signature: Signature,
    #[serde(rename = "flexibilityGive")]
    flexibility_give: FieldElement,
    #[serde(rename = "flexibilityReceive")]
    flexibility_receive: FieldElement,
    #[serde(rename = "consentForUsage")]
    consent_for_usage: PrequalificationType,
    #[serde(rename = "tStart")]
    t_start: Timestamp,
    #[serde(rename = "tEnd")]
    t_end: Timestamp,
}

#[derive(Deserialize)]
struct ConsentCredentialRepr {
    #[serde(flatten)]
    metadata: CredentialMetadata,
    #[serde(rename = "deviceID")]
    device_id: FieldElement,
    #[serde(rename = "hemIssuer")]
    hem_issuer: PublicKey,
    #[serde(rename = "hemSignature")]
    hem_signature: Signature,
    #[serde(rename = "flexibilityGive")]
    flexibility_give: FieldElement,
    #[serde(rename = "flexibilityReceive")]
    flexibility_receive: FieldElement,
    #[serde(rename = "consentForUsage")]
    consent_for_usage: PrequalificationType,
    #[serde(rename = "tStart")]
    t_start: Timestamp,
    #[serde(rename = "tEnd")]
    t_end: Timestamp,
}

impl TryFrom<ConsentCredentialRepr> for ConsentCredential {
    type Error = VcError;

    fn try_from(repr: ConsentCredentialRepr) -> Result<Self, Self::Error> {
        Self {
            metadata: repr.metadata,
            device_id: repr.device_id,
            hem_issuer: repr.hem_issuer,
            hem_signature: repr.hem_signature,
            flexibility_give: repr.flexibility_give,
            flexibility_receive: repr.flexibility_receive,
            consent_for_usage: repr.consent_for_usage,
            t_start: repr.t_start,
            t_end: repr.t_end,
        }
        .validated()
    }
}

impl ConsentCredential {
    pub(crate) fn from_extras(
        metadata: CredentialMetadata,
        extras: &HashableCreationExtras,
    ) -> Result<Self, VcError> {
        Self {
            metadata,
            device_id: extras.integer(F::DeviceId)?.clone(),
            hem_issuer: extras.public_key(F::HemIssuer)?.clone(),
            hem_signature: extras.signature(F::HemSignature)?.clone(),
            flexibility_give: extras.integer(F::FlexibilityGive)?.clone(),
            flexibility_receive: extras.integer(F::FlexibilityReceive)?.clone(),
            consent_for_usage: *extras.prequalification_type(F::ConsentForUsage)?,
            t_start: *extras.timestamp(F::TStart)?,
            t_end: *extras.timestamp(F::TEnd)?,
        }
        .validated()
    }

    fn validated(self) -> Result<Self, VcError> {
        if self.t_start > self.t_end {
            return Err(VcError::Validation(format!(
                "tStart ({}) must be less than or equal to tEnd ({})",
                self.t_start, self.t_end
            )));
        }
        Ok(self)
    }

    pub(crate) fn body(&self) -> HashableCreationExtras {
        HashableCreationExtras::from_declared([
            (
                CredentialField::from(F::DeviceId),
                HashableValue::Integer(self.device_id.clone()),
            ),
            (F::HemIssuer.into(), HashableValue::PublicKey(self.hem_issuer.clone())),
            (
                F::HemSignature.into(),
                HashableValue::Signature(self.hem_signature.clone()),
            ),
            (
                F::FlexibilityGive.into(),
                HashableValue::Integer(self.flexibility_give.clone()),
            ),
            (
                F::FlexibilityReceive.into(),
                HashableValue::Integer(self.flexibility_receive.clone()),
            ),
            (
                F::ConsentForUsage.into(),
                HashableValue::PrequalificationType(self.consent_for_usage),
            ),
            (F::TStart.into(), HashableValue::Timestamp(self.t_start)),
            (F::TEnd.into(), HashableValue::Timestamp(self.t_end)),
        ])
    }

    /// `deviceID, hemIssuer.x, hemIssuer.y, hemSignature (3), give, receive,
    /// tStart, tEnd`.
    pub(crate) fn extended_body(&self) -> Vec<FieldElement> {
        let mut out = Vec::with_capacity(10);
        out.push(self.device_id.clone());
        out.push(self.hem_issuer.x().clone());
        out.push(self.hem_issuer.y().clone());
        out.extend(self.hem_signature.scalars().into_iter().cloned());
        out.push(self.flexibility_give.clone());
        out.push(self.flexibility_receive.clone());
        out.push(self.t_start.to_field());
        out.push(self.t_end.to_field());
        out
    }

    /// Identifier of the device.
    pub fn device_id(&self) -> &FieldElement {
        &self.device_id
    }

    /// Public key of the home energy manager.
    pub fn hem_issuer(&self) -> &PublicKey {
        &self.hem_issuer
    }

    /// HEM signature over the preliminary signing root.
    pub fn hem_signature(&self) -> &Signature {
        &self.hem_signature
    }

    /// Power the device may feed into the grid.
    pub fn flexibility_give(&self) -> &FieldElement {
        &self.flexibility_give
    }

    /// Power the device may draw from the grid.
    pub fn flexibility_receive(&self) -> &FieldElement {
        &self.flexibility_receive
    }

    /// The usage consented to.
    pub fn consent_for_usage(&self) -> PrequalificationType {
        self.consent_for_usage
    }

    /// Start of the consented window.
    pub fn t_start(&self) -> Timestamp {
        self.t_start
    }

    /// End of the consented window.
    pub fn t_end(&self) -> Timestamp {
        self.t_end
    }
}
