//! Device-specifications credential: static facts about a flexible device.

use serde::{Deserialize, Serialize};

use fim_core::FieldElement;

use super::CredentialMetadata;
use crate::error::VcError;
use crate::field::{CredentialField, DeviceSpecificationsField as F};
use crate::value::{HashableCreationExtras, HashableValue};

/// Describes a device: identifier, name, manufacturer and electrical
/// characteristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSpecificationsCredential {
    #[serde(flatten)]
    pub(crate) metadata: CredentialMetadata,
    #[serde(rename = "deviceID")]
    device_id: FieldElement,
    #[serde(rename = "deviceName")]
    device_name: String,
    #[serde(rename = "deviceOEM")]
    device_oem: String,
    #[serde(rename = "electronicDescription")]
    electronic_description: String,
}

impl DeviceSpecificationsCredential {
    pub(crate) fn from_extras(
        metadata: CredentialMetadata,
        extras: &HashableCreationExtras,
    ) -> Result<Self, VcError> {
        Ok(Self {
            metadata,
            device_id: extras.integer(F::DeviceId)?.clone(),
            device_name: extras.text(F::DeviceName)?.clone(),
            device_oem: extras.text(F::DeviceOem)?.clone(),
            electronic_description: extras.text(F::ElectronicDescription)?.clone(),
        })
    }

    pub(crate) fn body(&self) -> HashableCreationExtras {
        HashableCreationExtras::from_declared([
            (
                CredentialField::from(F::DeviceId),
                HashableValue::Integer(self.device_id.clone()),
            ),
            (F::DeviceName.into(), HashableValue::Text(self.device_name.clone())),
            (F::DeviceOem.into(), HashableValue::Text(self.device_oem.clone())),
            (
                F::ElectronicDescription.into(),
                HashableValue::Text(self.electronic_description.clone()),
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

    /// Human-readable device name.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Manufacturer.
    pub fn device_oem(&self) -> &str {
        &self.device_oem
    }

    /// Free-form electrical description.
    pub fn electronic_description(&self) -> &str {
        &self.electronic_description
    }
}
