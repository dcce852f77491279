//! # Hashable Property Values
//!
//! [`HashableValue`] is the closed set of value types credential properties
//! can hold. Each variant hashes with the rule fixed for its type (see
//! [`PoseidonHashable`]), so a property's Merkle leaf depends only on its
//! value.
//!
//! [`HashableCreationExtras`] wraps the generic creation-extras container
//! and checks every inserted value against the declared type of its field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use fim_core::{CreationExtras, FieldElement, MissingCreationExtra, Timestamp};
use fim_crypto::{PoseidonHashable, PublicKey, Signature};

use crate::error::VcError;
use crate::field::{CredentialField, ValueType};

// ---------------------------------------------------------------------------
// PrequalificationType
// ---------------------------------------------------------------------------

/// Grid usage a device is prequalified for, or consented to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrequalificationType {
    /// No flexibility usage.
    None,
    /// Flexibility trading.
    Flex,
}

impl PrequalificationType {
    /// The canonical name, `"NONE"` or `"FLEX"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            PrequalificationType::None => "NONE",
            PrequalificationType::Flex => "FLEX",
        }
    }
}

impl fmt::Display for PrequalificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrequalificationType {
    type Err = VcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NONE" => Ok(PrequalificationType::None),
            "FLEX" => Ok(PrequalificationType::Flex),
            other => Err(VcError::Validation(format!(
                "unknown prequalification type {other:?}"
            ))),
        }
    }
}

impl PoseidonHashable for PrequalificationType {
    fn poseidon_hash(&self) -> FieldElement {
        self.as_str().poseidon_hash()
    }
}

// ---------------------------------------------------------------------------
// HashableValue
// ---------------------------------------------------------------------------

/// A credential property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashableValue {
    /// A field-element integer.
    Integer(FieldElement),
    /// A UTF-8 string.
    Text(String),
    /// A millisecond timestamp.
    Timestamp(Timestamp),
    /// A public key.
    PublicKey(PublicKey),
    /// A signature.
    Signature(Signature),
    /// A prequalification type.
    PrequalificationType(PrequalificationType),
}

impl HashableValue {
    /// The type of the held value.
    pub fn value_type(&self) -> ValueType {
        match self {
            HashableValue::Integer(_) => ValueType::Integer,
            HashableValue::Text(_) => ValueType::Text,
            HashableValue::Timestamp(_) => ValueType::Timestamp,
            HashableValue::PublicKey(_) => ValueType::PublicKey,
            HashableValue::Signature(_) => ValueType::Signature,
            HashableValue::PrequalificationType(_) => ValueType::PrequalificationType,
        }
    }

    /// The information-preserving scalar encoding used for circuit inputs.
    ///
    /// Integers and timestamps map to themselves, keys to their two
    /// coordinates and signatures to `[R8x, R8y, S]`. Strings and
    /// prequalification types have no such encoding and contribute nothing.
    pub fn to_field_elements(&self) -> Vec<FieldElement> {
        match self {
            HashableValue::Integer(v) => vec![v.clone()],
            HashableValue::Timestamp(t) => vec![t.to_field()],
            HashableValue::PublicKey(pk) => vec![pk.x().clone(), pk.y().clone()],
            HashableValue::Signature(sig) => sig.scalars().into_iter().cloned().collect(),
            HashableValue::Text(_) | HashableValue::PrequalificationType(_) => Vec::new(),
        }
    }
}

impl PoseidonHashable for HashableValue {
    fn poseidon_hash(&self) -> FieldElement {
        match self {
            HashableValue::Integer(v) => v.poseidon_hash(),
            HashableValue::Text(s) => s.poseidon_hash(),
            HashableValue::Timestamp(t) => t.poseidon_hash(),
            HashableValue::PublicKey(pk) => pk.poseidon_hash(),
            HashableValue::Signature(sig) => sig.poseidon_hash(),
            HashableValue::PrequalificationType(p) => p.poseidon_hash(),
        }
    }
}

impl From<FieldElement> for HashableValue {
    fn from(value: FieldElement) -> Self {
        HashableValue::Integer(value)
    }
}

impl From<u64> for HashableValue {
    fn from(value: u64) -> Self {
        HashableValue::Integer(FieldElement::from_u64(value))
    }
}

impl From<String> for HashableValue {
    fn from(value: String) -> Self {
        HashableValue::Text(value)
    }
}

impl From<&str> for HashableValue {
    fn from(value: &str) -> Self {
        HashableValue::Text(value.to_owned())
    }
}

impl From<Timestamp> for HashableValue {
    fn from(value: Timestamp) -> Self {
        HashableValue::Timestamp(value)
    }
}

impl From<PublicKey> for HashableValue {
    fn from(value: PublicKey) -> Self {
        HashableValue::PublicKey(value)
    }
}

impl From<Signature> for HashableValue {
    fn from(value: Signature) -> Self {
        HashableValue::Signature(value)
    }
}

impl From<PrequalificationType> for HashableValue {
    fn from(value: PrequalificationType) -> Self {
        HashableValue::PrequalificationType(value)
    }
}

// ---------------------------------------------------------------------------
// HashableCreationExtras
// ---------------------------------------------------------------------------

macro_rules! typed_getter {
    ($(#[$meta:meta])* $name:ident, $variant:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $name(&self, field: impl Into<CredentialField>) -> Result<&$ty, VcError> {
            let field = field.into();
            match self.get(field)? {
                HashableValue::$variant(v) => Ok(v),
                other => Err(VcError::ExtraTypeMismatch {
                    field: field.name().to_owned(),
                    expected: ValueType::$variant,
                    actual: other.value_type(),
                }),
            }
        }
    };
}

/// Credential properties keyed by declared field, type-checked on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashableCreationExtras {
    inner: CreationExtras<CredentialField, HashableValue>,
}

impl HashableCreationExtras {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property. Fails with [`VcError::ExtraTypeMismatch`] when the
    /// value's type differs from the field's declared type.
    pub fn insert(
        &mut self,
        field: impl Into<CredentialField>,
        value: impl Into<HashableValue>,
    ) -> Result<Option<HashableValue>, VcError> {
        let field = field.into();
        let value = value.into();
        if value.value_type() != field.value_type() {
            return Err(VcError::ExtraTypeMismatch {
                field: field.name().to_owned(),
                expected: field.value_type(),
                actual: value.value_type(),
            });
        }
        Ok(self.inner.insert(field, value))
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(
        mut self,
        field: impl Into<CredentialField>,
        value: impl Into<HashableValue>,
    ) -> Result<Self, VcError> {
        self.insert(field, value)?;
        Ok(self)
    }

    /// Required lookup.
    pub fn get(&self, field: impl Into<CredentialField>) -> Result<&HashableValue, MissingCreationExtra> {
        self.inner.get(field)
    }

    /// Optional lookup.
    pub fn get_or_none(&self, field: impl Into<CredentialField>) -> Option<&HashableValue> {
        self.inner.get_or_none(field)
    }

    /// Remove a property.
    pub fn remove(&mut self, field: impl Into<CredentialField>) -> Option<HashableValue> {
        self.inner.remove(field)
    }

    /// Whether a property is set.
    pub fn contains(&self, field: impl Into<CredentialField>) -> bool {
        self.inner.contains(field)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no properties are set.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&CredentialField, &HashableValue)> {
        self.inner.iter()
    }

    /// Build from entries whose types are already known to match their
    /// fields, such as the body of an existing credential.
    pub(crate) fn from_declared(
        entries: impl IntoIterator<Item = (CredentialField, HashableValue)>,
    ) -> Self {
        Self {
            inner: entries.into_iter().collect(),
        }
    }

    /// An independent duplicate.
    pub fn copy(&self) -> Self {
        Self {
            inner: self.inner.copy(),
        }
    }

    typed_getter!(
        /// Required integer property.
        integer, Integer, FieldElement
    );
    typed_getter!(
        /// Required string property.
        text, Text, String
    );
    typed_getter!(
        /// Required timestamp property.
        timestamp, Timestamp, Timestamp
    );
    typed_getter!(
        /// Required public-key property.
        public_key, PublicKey, PublicKey
    );
    typed_getter!(
        /// Required signature property.
        signature, Signature, Signature
    );
    typed_getter!(
        /// Required prequalification-type property.
        prequalification_type, PrequalificationType, PrequalificationType
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ConsentField, DeviceSpecificationsField};

    #[test]
    fn test_insert_checks_type() {
        let mut extras = HashableCreationExtras::new();
        let err = extras
            .insert(ConsentField::TStart, "yesterday")
            .unwrap_err();
        assert!(matches!(
            err,
            VcError::ExtraTypeMismatch {
                expected: ValueType::Timestamp,
                actual: ValueType::Text,
                ..
            }
        ));
        assert!(extras.is_empty());
        extras
            .insert(ConsentField::TStart, Timestamp::from_millis(5))
            .unwrap();
        assert_eq!(
            extras.timestamp(ConsentField::TStart).unwrap(),
            &Timestamp::from_millis(5)
        );
    }

    #[test]
    fn test_required_get_reports_field() {
        let extras = HashableCreationExtras::new();
        let err = extras.integer(DeviceSpecificationsField::DeviceId).unwrap_err();
        assert_eq!(format!("{err}"), "missing creation extra: deviceID");
    }

    #[test]
    fn test_copy_does_not_share_mutations() {
        let base = HashableCreationExtras::new()
            .with(ConsentField::FlexibilityGive, 10u64)
            .unwrap();
        let mut copy = base.copy();
        copy.insert(ConsentField::FlexibilityReceive, 3u64).unwrap();
        assert_eq!(base.len(), 1);
        assert_eq!(copy.len(), 2);
    }

    #[test]
    fn test_prequalification_type_hash_is_string_hash() {
        assert_eq!(
            PrequalificationType::Flex.poseidon_hash(),
            "FLEX".poseidon_hash()
        );
        assert_ne!(
            PrequalificationType::Flex.poseidon_hash(),
            PrequalificationType::None.poseidon_hash()
        );
    }

    #[test]
    fn test_prequalification_type_parse_and_serde() {
        assert_eq!("FLEX".parse::<PrequalificationType>().unwrap(), PrequalificationType::Flex);
        assert!("flex".parse::<PrequalificationType>().is_err());
        assert_eq!(
            serde_json::to_string(&PrequalificationType::None).unwrap(),
            "\"NONE\""
        );
    }

    #[test]
    fn test_field_element_encoding() {
        assert_eq!(
            HashableValue::from(7u64).to_field_elements(),
            vec![FieldElement::from_u64(7)]
        );
        assert!(HashableValue::from("x").to_field_elements().is_empty());
        assert_eq!(
            HashableValue::from(Timestamp::from_millis(9)).to_field_elements(),
            vec![FieldElement::from_u64(9)]
        );
    }

    #[test]
    fn test_value_hash_matches_inner_hash() {
        let v = HashableValue::from(Timestamp::from_millis(3));
        assert_eq!(v.poseidon_hash(), Timestamp::from_millis(3).poseidon_hash());
    }
}
