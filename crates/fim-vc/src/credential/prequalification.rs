//! Prequalification credential: the grid operator's clearance for a device.

use serde::{Deserialize, Serialize};

use fim_core::FieldElement;

use super::CredentialMetadata;
use crate::error::VcError;
use crate::field::{CredentialField, PrequalificationField as F};
use crate::value::{HashableCreationExtras, HashableValue, PrequalificationType};

/// States which kind of grid usage a device is prequalified for and where
/// it is connected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrequalificationCredential {
    #[serde(flatten)]
    pub(crate) metadata: CredentialMetadata,
    #[serde(rename = "deviceID")]
    device_id: FieldElement,
    #[serde(rename = "prequalificationType")]
    prequalification_type: PrequalificationType,
    #[serde(rename = "gridConnectionArea")]
    grid_connection_area: String,
}

impl PrequalificationCredential {
    pub(crate) fn from_extras(
        metadata: CredentialMetadata,
        extras: &HashableCreationExtras,
    ) -> Result<Self, VcError> {
        Ok(Self {
            metadata,
            device_id: extras.integer(F::DeviceId)?.clone(),
            prequalification_type: *extras.prequalification_type(F::PrequalificationType)?,
            grid_connection_area: extras.text(F::GridConnectionArea)?.clone(),
        })
    }

    pub(crate) fn body(&self) -> HashableCreationExtras {
        HashableCreationExtras::from_declared([
            (
                CredentialField::from(F::DeviceId),
                HashableValue::Integer(self.device_id.clone()),
            ),
            (
                F::PrequalificationType.into(),
                HashableValue::PrequalificationType(self.prequalification_type),
            ),
            (
                F::GridConnectionArea.into(),
                HashableValue::Text(self.grid_connection_area.clone()),
            ),
        ])
    }

    pub(crate) fn extended_body(&self) -> Vec<FieldElement> {
        vec![self.device_id.clone()]
    }

    /// Identifier of the device.
    pub fn device_id(&self) -> &FieldElement {
        &self.device_id
    }

    /// The granted prequalification.
    pub fn prequalification_type(&self) -> PrequalificationType {
        self.prequalification_type
    }

    /// The grid area the device is connected to.
    pub fn grid_connection_area(&self) -> &str {
        &self.grid_connection_area
    }
}
