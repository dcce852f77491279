//! # Credential Kinds and Declared Fields
//!
//! Every credential kind declares an ordered list of body fields. The order
//! is part of the external contract: it fixes the Merkle leaf order of the
//! signing tree and the layout of the scalar lists fed to circuits.
//!
//! Field identifiers are closed enums, one per kind, wrapped in
//! [`CredentialField`] so a single creation-extras container can carry the
//! properties of any kind while rejecting anything undeclared at compile
//! time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The type of value a declared field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// A field-element integer.
    Integer,
    /// A UTF-8 string.
    Text,
    /// Milliseconds since the epoch.
    Timestamp,
    /// A BabyJubJub public key.
    PublicKey,
    /// An EdDSA signature.
    Signature,
    /// A [`PrequalificationType`](crate::value::PrequalificationType).
    PrequalificationType,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueType::Integer => "integer",
            ValueType::Text => "text",
            ValueType::Timestamp => "timestamp",
            ValueType::PublicKey => "public key",
            ValueType::Signature => "signature",
            ValueType::PrequalificationType => "prequalification type",
        };
        f.write_str(s)
    }
}

macro_rules! declared_fields {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => ($json:literal, $ty:ident) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every field in declared order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The JSON key and stable identifier of the field.
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $json),+
                }
            }

            /// The value type the field accepts.
            pub const fn value_type(self) -> ValueType {
                match self {
                    $($name::$variant => ValueType::$ty),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

declared_fields! {
    /// Body fields of a device-specifications credential.
    DeviceSpecificationsField {
        /// Identifier of the device.
        DeviceId => ("deviceID", Integer),
        /// Human-readable device name.
        DeviceName => ("deviceName", Text),
        /// Manufacturer.
        DeviceOem => ("deviceOEM", Text),
        /// Free-form electrical description.
        ElectronicDescription => ("electronicDescription", Text),
    }
}

declared_fields! {
    /// Body fields of a prequalification credential.
    PrequalificationField {
        /// Identifier of the device.
        DeviceId => ("deviceID", Integer),
        /// The granted prequalification.
        PrequalificationType => ("prequalificationType", PrequalificationType),
        /// The grid area the device is connected to.
        GridConnectionArea => ("gridConnectionArea", Text),
    }
}

declared_fields! {
    /// Body fields of a consent credential.
    ConsentField {
        /// Identifier of the device.
        DeviceId => ("deviceID", Integer),
        /// Public key of the home energy manager.
        HemIssuer => ("hemIssuer", PublicKey),
        /// Home energy manager signature over the preliminary root.
        HemSignature => ("hemSignature", Signature),
        /// Power the device may feed into the grid.
        FlexibilityGive => ("flexibilityGive", Integer),
        /// Power the device may draw from the grid.
        FlexibilityReceive => ("flexibilityReceive", Integer),
        /// The usage consented to.
        ConsentForUsage => ("consentForUsage", PrequalificationType),
        /// Start of the consented window.
        TStart => ("tStart", Timestamp),
        /// End of the consented window.
        TEnd => ("tEnd", Timestamp),
    }
}

/// A declared body field of any credential kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CredentialField {
    /// Field of a device-specifications credential.
    DeviceSpecifications(DeviceSpecificationsField),
    /// Field of a prequalification credential.
    Prequalification(PrequalificationField),
    /// Field of a consent credential.
    Consent(ConsentField),
}

impl CredentialField {
    /// The JSON key and stable identifier of the field.
    pub const fn name(self) -> &'static str {
        match self {
            CredentialField::DeviceSpecifications(f) => f.name(),
            CredentialField::Prequalification(f) => f.name(),
            CredentialField::Consent(f) => f.name(),
        }
    }

    /// The value type the field accepts.
    pub const fn value_type(self) -> ValueType {
        match self {
            CredentialField::DeviceSpecifications(f) => f.value_type(),
            CredentialField::Prequalification(f) => f.value_type(),
            CredentialField::Consent(f) => f.value_type(),
        }
    }

    /// The credential kind that declares this field.
    pub const fn kind(self) -> CredentialKind {
        match self {
            CredentialField::DeviceSpecifications(_) => CredentialKind::DeviceSpecifications,
            CredentialField::Prequalification(_) => CredentialKind::Prequalification,
            CredentialField::Consent(_) => CredentialKind::Consent,
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<DeviceSpecificationsField> for CredentialField {
    fn from(field: DeviceSpecificationsField) -> Self {
        CredentialField::DeviceSpecifications(field)
    }
}

impl From<PrequalificationField> for CredentialField {
    fn from(field: PrequalificationField) -> Self {
        CredentialField::Prequalification(field)
    }
}

impl From<ConsentField> for CredentialField {
    fn from(field: ConsentField) -> Self {
        CredentialField::Consent(field)
    }
}

const DEVICE_SPECIFICATIONS_FIELDS: [CredentialField; 4] = [
    CredentialField::DeviceSpecifications(DeviceSpecificationsField::DeviceId),
    CredentialField::DeviceSpecifications(DeviceSpecificationsField::DeviceName),
    CredentialField::DeviceSpecifications(DeviceSpecificationsField::DeviceOem),
    CredentialField::DeviceSpecifications(DeviceSpecificationsField::ElectronicDescription),
];

const PREQUALIFICATION_FIELDS: [CredentialField; 3] = [
    CredentialField::Prequalification(PrequalificationField::DeviceId),
    CredentialField::Prequalification(PrequalificationField::PrequalificationType),
    CredentialField::Prequalification(PrequalificationField::GridConnectionArea),
];

const CONSENT_FIELDS: [CredentialField; 8] = [
    CredentialField::Consent(ConsentField::DeviceId),
    CredentialField::Consent(ConsentField::HemIssuer),
    CredentialField::Consent(ConsentField::HemSignature),
    CredentialField::Consent(ConsentField::FlexibilityGive),
    CredentialField::Consent(ConsentField::FlexibilityReceive),
    CredentialField::Consent(ConsentField::ConsentForUsage),
    CredentialField::Consent(ConsentField::TStart),
    CredentialField::Consent(ConsentField::TEnd),
];

/// The three credential kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CredentialKind {
    /// Static description of a flexible device.
    #[serde(rename = "DeviceSpecificationsCredential")]
    DeviceSpecifications,
    /// Grid operator prequalification of a device.
    #[serde(rename = "PrequalificationCredential")]
    Prequalification,
    /// Owner consent to use a device's flexibility in a time window.
    #[serde(rename = "ConsentCredential")]
    Consent,
}

impl CredentialKind {
    /// Every kind.
    pub const ALL: [CredentialKind; 3] = [
        CredentialKind::DeviceSpecifications,
        CredentialKind::Prequalification,
        CredentialKind::Consent,
    ];

    /// The `type` discriminant used in the canonical JSON encoding.
    pub const fn type_name(self) -> &'static str {
        match self {
            CredentialKind::DeviceSpecifications => "DeviceSpecificationsCredential",
            CredentialKind::Prequalification => "PrequalificationCredential",
            CredentialKind::Consent => "ConsentCredential",
        }
    }

    /// Parse a `type` discriminant.
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_name() == name)
    }

    /// Declared body fields in signing order.
    pub fn fields(self) -> &'static [CredentialField] {
        match self {
            CredentialKind::DeviceSpecifications => &DEVICE_SPECIFICATIONS_FIELDS,
            CredentialKind::Prequalification => &PREQUALIFICATION_FIELDS,
            CredentialKind::Consent => &CONSENT_FIELDS,
        }
    }

    /// Length of the compact scalar list: six metadata scalars plus one
    /// hash per body field.
    pub fn compact_len(self) -> usize {
        6 + self.fields().len()
    }

    /// Length of the extended scalar list.
    pub fn extended_len(self) -> usize {
        let body = match self {
            CredentialKind::DeviceSpecifications | CredentialKind::Prequalification => 1,
            CredentialKind::Consent => 10,
        };
        self.compact_len() + 9 + body
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
