//! # Credentials
//!
//! A credential is shared metadata (id, issuer, holder, signature,
//! timestamp, Merkle root) plus the declared body fields of its kind.
//! [`Credential`] is the sum of the three kinds; [`create`] materializes one
//! from metadata and creation extras.
//!
//! ## Signing Tree
//!
//! The issuer signs the root of a [`BinaryMerkleTree`] whose leaves are
//! `[id, issuer, holder, timestamp]` followed by every declared body field
//! present in the extras, in declared order. The signature and root fields
//! are excluded to avoid circular hashing.
//!
//! ## Scalar Encodings
//!
//! - **Compact** ([`Credential::to_field_list`]): hashes of the six metadata
//!   fields (the root is taken as-is) followed by the body field hashes.
//!   Used for equality and commitments.
//! - **Extended** ([`Credential::to_extended_field_list`]): the compact list,
//!   then the metadata preimages `[id, issuer.x, issuer.y, holder.x,
//!   holder.y, R8x, R8y, S, timestamp]`, then the kind's body preimages.
//!   Used only to build circuit inputs.
//!
//! ## Serde
//!
//! Flat JSON object with discriminant `type` (`"ConsentCredential"`, ...),
//! the metadata keys and the body fields as sibling keys. Keys outside that
//! set are rejected on deserialization.

mod consent;
mod device_specifications;
mod prequalification;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use fim_core::{FieldElement, Timestamp};
use fim_crypto::{BinaryMerkleTree, PoseidonHashable, PublicKey, Signature};

use crate::error::VcError;
use crate::field::CredentialKind;
use crate::value::HashableCreationExtras;

pub use consent::ConsentCredential;
pub use device_specifications::DeviceSpecificationsCredential;
pub use prequalification::PrequalificationCredential;

/// Metadata shared by every credential kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialMetadata {
    /// Unique identifier assigned at issuance.
    pub id: Uuid,
    /// Public key of the issuer.
    pub issuer: PublicKey,
    /// Public key of the holder.
    pub holder: PublicKey,
    /// Issuer signature over the signing-tree root.
    pub signature: Signature,
    /// Issuance time.
    pub timestamp: Timestamp,
    /// Root of the signing tree.
    pub root: FieldElement,
}

/// Keys of the canonical encoding that are not body fields.
const ENVELOPE_KEYS: [&str; 7] = ["type", "id", "issuer", "holder", "signature", "timestamp", "root"];

/// A credential of any kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Credential {
    /// Device specifications.
    #[serde(rename = "DeviceSpecificationsCredential")]
    DeviceSpecifications(DeviceSpecificationsCredential),
    /// Prequalification.
    #[serde(rename = "PrequalificationCredential")]
    Prequalification(PrequalificationCredential),
    /// Consent.
    #[serde(rename = "ConsentCredential")]
    Consent(ConsentCredential),
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum CredentialRepr {
    #[serde(rename = "DeviceSpecificationsCredential")]
    DeviceSpecifications(DeviceSpecificationsCredential),
    #[serde(rename = "PrequalificationCredential")]
    Prequalification(PrequalificationCredential),
    #[serde(rename = "ConsentCredential")]
    Consent(ConsentCredential),
}

impl From<CredentialRepr> for Credential {
    fn from(repr: CredentialRepr) -> Self {
        match repr {
            CredentialRepr::DeviceSpecifications(c) => Credential::DeviceSpecifications(c),
            CredentialRepr::Prequalification(c) => Credential::Prequalification(c),
            CredentialRepr::Consent(c) => Credential::Consent(c),
        }
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let kind = object
            .get("type")
            .and_then(serde_json::Value::as_str)
            .and_then(CredentialKind::from_type_name)
            .ok_or_else(|| D::Error::custom("missing or unknown credential type"))?;
        let unknown = object.keys().find(|key| {
            !ENVELOPE_KEYS.contains(&key.as_str())
                && !kind.fields().iter().any(|field| field.name() == key.as_str())
        });
        if let Some(key) = unknown {
            return Err(D::Error::custom(format!("unknown field `{key}` for {kind}")));
        }
        serde_json::from_value::<CredentialRepr>(serde_json::Value::Object(object))
            .map(Credential::from)
            .map_err(D::Error::custom)
    }
}

/// Materialize a credential of `kind` from metadata and extras.
///
/// Every field declared by `kind` must be present in `extras`, otherwise
/// this fails with [`VcError::MissingCreationExtra`]. Entries for other
/// fields are ignored.
pub fn create(
    kind: CredentialKind,
    metadata: CredentialMetadata,
    extras: &HashableCreationExtras,
) -> Result<Credential, VcError> {
    Ok(match kind {
        CredentialKind::DeviceSpecifications => Credential::DeviceSpecifications(
            DeviceSpecificationsCredential::from_extras(metadata, extras)?,
        ),
        CredentialKind::Prequalification => {
            Credential::Prequalification(PrequalificationCredential::from_extras(metadata, extras)?)
        }
        CredentialKind::Consent => {
            Credential::Consent(ConsentCredential::from_extras(metadata, extras)?)
        }
    })
}

/// Build the signing tree for a credential of `kind` that does not exist yet.
///
/// Body fields missing from `extras` are skipped, which is how the consent
/// flow computes the preliminary root before the HEM signature exists.
pub fn signing_tree(
    kind: CredentialKind,
    id: &Uuid,
    issuer: &PublicKey,
    holder: &PublicKey,
    timestamp: Timestamp,
    extras: &HashableCreationExtras,
) -> Result<BinaryMerkleTree, VcError> {
    let mut leaves = vec![
        id.poseidon_hash(),
        issuer.poseidon_hash(),
        holder.poseidon_hash(),
        timestamp.poseidon_hash(),
    ];
    leaves.extend(
        kind.fields()
            .iter()
            .filter_map(|field| extras.get_or_none(*field))
            .map(PoseidonHashable::poseidon_hash),
    );
    Ok(BinaryMerkleTree::from_leaf_hashes(leaves)?)
}

impl Credential {
    /// The credential kind.
    pub fn kind(&self) -> CredentialKind {
        match self {
            Credential::DeviceSpecifications(_) => CredentialKind::DeviceSpecifications,
            Credential::Prequalification(_) => CredentialKind::Prequalification,
            Credential::Consent(_) => CredentialKind::Consent,
        }
    }

    /// Shared metadata.
    pub fn metadata(&self) -> &CredentialMetadata {
        match self {
            Credential::DeviceSpecifications(c) => &c.metadata,
            Credential::Prequalification(c) => &c.metadata,
            Credential::Consent(c) => &c.metadata,
        }
    }

    /// Unique identifier.
    pub fn id(&self) -> Uuid {
        self.metadata().id
    }

    /// Issuer public key.
    pub fn issuer(&self) -> &PublicKey {
        &self.metadata().issuer
    }

    /// Holder public key.
    pub fn holder(&self) -> &PublicKey {
        &self.metadata().holder
    }

    /// Issuer signature.
    pub fn signature(&self) -> &Signature {
        &self.metadata().signature
    }

    /// Issuance time.
    pub fn timestamp(&self) -> Timestamp {
        self.metadata().timestamp
    }

    /// Stored signing-tree root.
    pub fn root(&self) -> &FieldElement {
        &self.metadata().root
    }

    /// The declared body fields as creation extras.
    pub fn extras(&self) -> HashableCreationExtras {
        match self {
            Credential::DeviceSpecifications(c) => c.body(),
            Credential::Prequalification(c) => c.body(),
            Credential::Consent(c) => c.body(),
        }
    }

    /// Hashes of the metadata fields; the root is included unhashed.
    pub fn base_hashes(&self) -> Vec<FieldElement> {
        let m = self.metadata();
        vec![
            m.id.poseidon_hash(),
            m.issuer.poseidon_hash(),
            m.holder.poseidon_hash(),
            m.signature.poseidon_hash(),
            m.timestamp.poseidon_hash(),
            m.root.clone(),
        ]
    }

    /// Compact encoding: metadata hashes then body field hashes.
    pub fn to_field_list(&self) -> Vec<FieldElement> {
        let extras = self.extras();
        let mut out = self.base_hashes();
        out.extend(
            self.kind()
                .fields()
                .iter()
                .filter_map(|field| extras.get_or_none(*field))
                .map(PoseidonHashable::poseidon_hash),
        );
        out
    }

    /// Extended encoding preserving preimages, for circuit inputs.
    pub fn to_extended_field_list(&self) -> Vec<FieldElement> {
        let m = self.metadata();
        let mut out = self.to_field_list();
        out.push(FieldElement::from_uuid(&m.id));
        out.push(m.issuer.x().clone());
        out.push(m.issuer.y().clone());
        out.push(m.holder.x().clone());
        out.push(m.holder.y().clone());
        out.extend(m.signature.scalars().into_iter().cloned());
        out.push(m.timestamp.to_field());
        out.extend(match self {
            Credential::DeviceSpecifications(c) => c.extended_body(),
            Credential::Prequalification(c) => c.extended_body(),
            Credential::Consent(c) => c.extended_body(),
        });
        out
    }

    /// Recompute the signing tree from the credential's own fields.
    pub fn signing_tree(&self) -> Result<BinaryMerkleTree, VcError> {
        let m = self.metadata();
        signing_tree(
            self.kind(),
            &m.id,
            &m.issuer,
            &m.holder,
            m.timestamp,
            &self.extras(),
        )
    }

    /// Canonical JSON encoding.
    pub fn to_json(&self) -> Result<serde_json::Value, VcError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Parse the canonical JSON encoding.
    pub fn from_json(value: serde_json::Value) -> Result<Self, VcError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Parse the canonical JSON encoding from text.
    pub fn from_json_str(text: &str) -> Result<Self, VcError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The device-specifications view, if this is one.
    pub fn as_device_specifications(&self) -> Option<&DeviceSpecificationsCredential> {
        match self {
            Credential::DeviceSpecifications(c) => Some(c),
            _ => None,
        }
    }

    /// The prequalification view, if this is one.
    pub fn as_prequalification(&self) -> Option<&PrequalificationCredential> {
        match self {
            Credential::Prequalification(c) => Some(c),
            _ => None,
        }
    }

    /// The consent view, if this is one.
    pub fn as_consent(&self) -> Option<&ConsentCredential> {
        match self {
            Credential::Consent(c) => Some(c),
            _ => None,
        }
    }
}

/// Structural equality: same kind, same metadata hashes, same body values.
impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && self.base_hashes() == other.base_hashes()
            && self.extras() == other.extras()
    }
}

impl Eq for Credential {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{ConsentField, DeviceSpecificationsField, PrequalificationField};
    use crate::value::PrequalificationType;
    use fim_crypto::PrivateKey;

    fn key(byte: u8) -> PrivateKey {
        PrivateKey::from_bytes([byte; 32])
    }

    fn metadata() -> CredentialMetadata {
        let issuer = key(1);
        CredentialMetadata {
            id: Uuid::from_u128(0x1234),
            issuer: issuer.public_key(),
            holder: key(2).public_key(),
            signature: issuer.sign(&FieldElement::from_u64(1)),
            timestamp: Timestamp::from_millis(123_456),
            root: FieldElement::from_u64(1234),
        }
    }

    fn device_extras() -> HashableCreationExtras {
        HashableCreationExtras::new()
            .with(DeviceSpecificationsField::DeviceId, 42u64)
            .unwrap()
            .with(DeviceSpecificationsField::DeviceName, "Heat pump")
            .unwrap()
            .with(DeviceSpecificationsField::DeviceOem, "Acme")
            .unwrap()
            .with(DeviceSpecificationsField::ElectronicDescription, "3 kW")
            .unwrap()
    }

    fn consent_extras(t_start: u64, t_end: u64) -> HashableCreationExtras {
        let hem = key(3);
        HashableCreationExtras::new()
            .with(ConsentField::DeviceId, 42u64)
            .unwrap()
            .with(ConsentField::HemIssuer, hem.public_key())
            .unwrap()
            .with(ConsentField::HemSignature, hem.sign(&FieldElement::from_u64(7)))
            .unwrap()
            .with(ConsentField::FlexibilityGive, 43u64)
            .unwrap()
            .with(ConsentField::FlexibilityReceive, 3u64)
            .unwrap()
            .with(ConsentField::ConsentForUsage, PrequalificationType::Flex)
            .unwrap()
            .with(ConsentField::TStart, Timestamp::from_millis(t_start))
            .unwrap()
            .with(ConsentField::TEnd, Timestamp::from_millis(t_end))
            .unwrap()
    }

    #[test]
    fn test_factory_builds_each_kind() {
        let c = create(CredentialKind::DeviceSpecifications, metadata(), &device_extras()).unwrap();
        assert_eq!(c.kind(), CredentialKind::DeviceSpecifications);
        let d = c.as_device_specifications().unwrap();
        assert_eq!(d.device_name(), "Heat pump");
        assert_eq!(d.device_id(), &FieldElement::from_u64(42));

        let c = create(CredentialKind::Consent, metadata(), &consent_extras(123, 456)).unwrap();
        assert_eq!(c.as_consent().unwrap().t_end(), Timestamp::from_millis(456));
    }

    #[test]
    fn test_missing_field_fails() {
        let mut extras = device_extras();
        extras.remove(DeviceSpecificationsField::DeviceOem);
        let err = create(CredentialKind::DeviceSpecifications, metadata(), &extras).unwrap_err();
        assert!(matches!(err, VcError::MissingCreationExtra(ref e) if e.field == "deviceOEM"));
    }

    #[test]
    fn test_extraneous_field_ignored() {
        let plain = create(CredentialKind::DeviceSpecifications, metadata(), &device_extras()).unwrap();
        let noisy_extras = device_extras()
            .with(PrequalificationField::GridConnectionArea, "north")
            .unwrap();
        let noisy = create(CredentialKind::DeviceSpecifications, metadata(), &noisy_extras).unwrap();
        assert_eq!(plain, noisy);
    }

    #[test]
    fn test_consent_window_validated() {
        let err = create(CredentialKind::Consent, metadata(), &consent_extras(500, 1)).unwrap_err();
        assert!(matches!(err, VcError::Validation(_)));
        assert!(create(CredentialKind::Consent, metadata(), &consent_extras(5, 5)).is_ok());
    }

    #[test]
    fn test_compact_and_extended_lengths() {
        let device = create(CredentialKind::DeviceSpecifications, metadata(), &device_extras()).unwrap();
        assert_eq!(device.to_field_list().len(), 6 + 4);
        assert_eq!(device.to_extended_field_list().len(), 6 + 4 + 9 + 1);

        let consent = create(CredentialKind::Consent, metadata(), &consent_extras(1, 2)).unwrap();
        assert_eq!(consent.to_field_list().len(), 6 + 8);
        assert_eq!(consent.to_extended_field_list().len(), 6 + 8 + 9 + 10);

        for c in [&device, &consent] {
            assert_eq!(c.to_field_list().len(), c.kind().compact_len());
            assert_eq!(c.to_extended_field_list().len(), c.kind().extended_len());
        }
    }

    #[test]
    fn test_extended_list_layout() {
        let m = metadata();
        let c = create(CredentialKind::DeviceSpecifications, m.clone(), &device_extras()).unwrap();
        let list = c.to_extended_field_list();
        assert_eq!(list[5], m.root);
        assert_eq!(list[10], FieldElement::from_u64(0x1234));
        assert_eq!(&list[11], m.issuer.x());
        assert_eq!(&list[14], m.holder.y());
        assert_eq!(&list[17], m.signature.s());
        assert_eq!(list[18], FieldElement::from_u64(123_456));
        assert_eq!(list[19], FieldElement::from_u64(42));
    }

    #[test]
    fn test_signing_tree_leaves() {
        let c = create(CredentialKind::Prequalification, metadata(), &HashableCreationExtras::new()
            .with(PrequalificationField::DeviceId, 1u64).unwrap()
            .with(PrequalificationField::PrequalificationType, PrequalificationType::Flex).unwrap()
            .with(PrequalificationField::GridConnectionArea, "DE-1").unwrap()).unwrap();
        let tree = c.signing_tree().unwrap();
        assert_eq!(tree.original_leaf_count(), 7);
        assert_eq!(tree.leaf_count(), 8);
        assert_eq!(tree.leaf_hashes()[0], c.id().poseidon_hash());
        assert_eq!(tree.leaf_hashes()[3], c.timestamp().poseidon_hash());
        assert_eq!(tree.leaf_hashes()[5], "FLEX".poseidon_hash());
    }

    #[test]
    fn test_signing_tree_skips_absent_fields() {
        let m = metadata();
        let mut extras = consent_extras(1, 2);
        let full = signing_tree(CredentialKind::Consent, &m.id, &m.issuer, &m.holder, m.timestamp, &extras).unwrap();
        extras.remove(ConsentField::HemSignature);
        let partial = signing_tree(CredentialKind::Consent, &m.id, &m.issuer, &m.holder, m.timestamp, &extras).unwrap();
        assert_eq!(full.original_leaf_count(), 12);
        assert_eq!(partial.original_leaf_count(), 11);
        assert_ne!(full.root(), partial.root());
    }

    #[test]
    fn test_json_shape() {
        let c = create(CredentialKind::Consent, metadata(), &consent_extras(123, 456)).unwrap();
        let json = c.to_json().unwrap();
        assert_eq!(json["type"], "ConsentCredential");
        assert_eq!(json["timestamp"], 123_456);
        assert_eq!(json["root"], "1234");
        assert_eq!(json["flexibilityGive"], "43");
        assert_eq!(json["consentForUsage"], "FLEX");
        assert_eq!(json["tStart"], 123);
        assert_eq!(json["id"], Uuid::from_u128(0x1234).to_string());
        assert!(json["hemIssuer"].is_array());
        assert_eq!(json["hemSignature"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_json_roundtrip() {
        for (kind, extras) in [
            (CredentialKind::DeviceSpecifications, device_extras()),
            (CredentialKind::Consent, consent_extras(10, 20)),
        ] {
            let c = create(kind, metadata(), &extras).unwrap();
            let back = Credential::from_json(c.to_json().unwrap()).unwrap();
            assert_eq!(back, c);
        }
    }

    #[test]
    fn test_json_rejects_inverted_window() {
        let c = create(CredentialKind::Consent, metadata(), &consent_extras(10, 20)).unwrap();
        let mut json = c.to_json().unwrap();
        json["tStart"] = serde_json::json!(30);
        assert!(Credential::from_json(json).is_err());
    }

    #[test]
    fn test_json_rejects_unknown_field() {
        let c = create(CredentialKind::DeviceSpecifications, metadata(), &device_extras()).unwrap();
        let mut json = c.to_json().unwrap();
        json["gridConnectionArea"] = serde_json::json!("DE-1");
        let err = Credential::from_json(json).unwrap_err();
        assert!(matches!(err, VcError::Encoding(_)));
        assert!(err.to_string().contains("gridConnectionArea"));
    }

    #[test]
    fn test_json_rejects_missing_type() {
        let c = create(CredentialKind::DeviceSpecifications, metadata(), &device_extras()).unwrap();
        let mut json = c.to_json().unwrap();
        json.as_object_mut().unwrap().remove("type");
        assert!(Credential::from_json(json).is_err());
    }

    #[test]
    fn test_equality_detects_body_change() {
        let a = create(CredentialKind::Consent, metadata(), &consent_extras(10, 20)).unwrap();
        let b = create(CredentialKind::Consent, metadata(), &consent_extras(10, 21)).unwrap();
        assert_ne!(a, b);
    }
}
