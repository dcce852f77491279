//! # Credential Signing
//!
//! [`CredentialDraft`] holds everything a credential needs except its
//! signature and root. Signing a draft builds the signing tree, has the
//! issuer sign its root and materializes the credential through the
//! factory.
//!
//! ## Consent Credentials
//!
//! Consent credentials carry a second signature by the home energy manager
//! (HEM) and the issuer signature must cover it. [`ConsentSigning`] makes
//! the two phases explicit and the order unskippable:
//!
//! ```text
//! UnsignedWithPlaceholder --hem_sign--> HemSigned --sign--> FullySigned
//! ```
//!
//! 1. The preliminary root is computed with `hemSignature` absent.
//! 2. The HEM key signs the preliminary root; the signature is inserted
//!    into the extras.
//! 3. The tree is rebuilt including `hemSignature` and the issuer signs
//!    the final root.

use uuid::Uuid;

use fim_core::{FieldElement, Timestamp};
use fim_crypto::{PrivateKey, PublicKey, Signature, SignatureProvider};

use crate::credential::{self, Credential, CredentialMetadata};
use crate::error::VcError;
use crate::field::{ConsentField, CredentialKind};
use crate::value::HashableCreationExtras;

/// An unsigned credential.
#[derive(Debug, Clone)]
pub struct CredentialDraft {
    kind: CredentialKind,
    id: Uuid,
    issuer: PublicKey,
    holder: PublicKey,
    timestamp: Timestamp,
    extras: HashableCreationExtras,
}

impl CredentialDraft {
    /// Start a draft with a fresh random id and the current time.
    pub fn new(
        kind: CredentialKind,
        issuer: PublicKey,
        holder: PublicKey,
        extras: HashableCreationExtras,
    ) -> Self {
        Self::with_identity(kind, Uuid::new_v4(), issuer, holder, Timestamp::now(), extras)
    }

    /// Start a draft with a caller-chosen id and timestamp.
    pub fn with_identity(
        kind: CredentialKind,
        id: Uuid,
        issuer: PublicKey,
        holder: PublicKey,
        timestamp: Timestamp,
        extras: HashableCreationExtras,
    ) -> Self {
        Self {
            kind,
            id,
            issuer,
            holder,
            timestamp,
            extras,
        }
    }

    /// The credential kind.
    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    /// The id the credential will carry.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The issuance time the credential will carry.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The body extras.
    pub fn extras(&self) -> &HashableCreationExtras {
        &self.extras
    }

    /// Root of the signing tree over the current extras.
    pub fn root(&self) -> Result<FieldElement, VcError> {
        let tree = credential::signing_tree(
            self.kind,
            &self.id,
            &self.issuer,
            &self.holder,
            self.timestamp,
            &self.extras,
        )?;
        Ok(tree.root().clone())
    }

    /// Sign the draft's root with the issuer key and create the credential.
    pub async fn sign(
        self,
        provider: &dyn SignatureProvider,
        issuer_key: &PrivateKey,
    ) -> Result<Credential, VcError> {
        let root = self.root()?;
        let signature = provider.sign(&root, issuer_key).await?;
        self.into_credential(signature, root)
    }

    fn into_credential(self, signature: Signature, root: FieldElement) -> Result<Credential, VcError> {
        let metadata = CredentialMetadata {
            id: self.id,
            issuer: self.issuer,
            holder: self.holder,
            signature,
            timestamp: self.timestamp,
            root,
        };
        credential::create(self.kind, metadata, &self.extras)
    }
}

// ─── Consent signing states ──────────────────────────────────────────

/// State: the HEM signature slot is empty and the preliminary root is known.
#[derive(Debug, Clone)]
pub struct UnsignedWithPlaceholder {
    preliminary_root: FieldElement,
}

/// State: the HEM signature has been inserted.
#[derive(Debug, Clone)]
pub struct HemSigned {
    preliminary_root: FieldElement,
    hem_signature: Signature,
}

/// State: the issuer has signed the final root.
#[derive(Debug, Clone)]
pub struct FullySigned {
    credential: Credential,
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::UnsignedWithPlaceholder {}
    impl Sealed for super::HemSigned {}
    impl Sealed for super::FullySigned {}
}

/// Marker trait for consent signing states.
pub trait SigningState: private::Sealed + std::fmt::Debug {
    /// Stable state name.
    fn name() -> &'static str;
}

impl SigningState for UnsignedWithPlaceholder {
    fn name() -> &'static str {
        "UNSIGNED_WITH_PLACEHOLDER"
    }
}

impl SigningState for HemSigned {
    fn name() -> &'static str {
        "HEM_SIGNED"
    }
}

impl SigningState for FullySigned {
    fn name() -> &'static str {
        "FULLY_SIGNED"
    }
}

/// Two-phase signing of a consent credential.
#[derive(Debug, Clone)]
pub struct ConsentSigning<S: SigningState> {
    draft: CredentialDraft,
    state: S,
}

impl<S: SigningState> ConsentSigning<S> {
    /// The current state name.
    pub fn state_name(&self) -> &'static str {
        S::name()
    }
}

impl ConsentSigning<UnsignedWithPlaceholder> {
    /// Start signing a consent credential.
    ///
    /// Any `hemSignature` already present in `extras` is discarded.
    pub fn new(
        id: Uuid,
        issuer: PublicKey,
        holder: PublicKey,
        timestamp: Timestamp,
        mut extras: HashableCreationExtras,
    ) -> Result<Self, VcError> {
        extras.remove(ConsentField::HemSignature);
        let draft = CredentialDraft::with_identity(
            CredentialKind::Consent,
            id,
            issuer,
            holder,
            timestamp,
            extras,
        );
        Self::from_draft(draft)
    }

    /// Start signing from an existing draft, which must be of consent kind.
    pub fn from_draft(mut draft: CredentialDraft) -> Result<Self, VcError> {
        if draft.kind != CredentialKind::Consent {
            return Err(VcError::KindMismatch {
                expected: CredentialKind::Consent.type_name(),
                actual: draft.kind.type_name(),
            });
        }
        draft.extras.remove(ConsentField::HemSignature);
        let preliminary_root = draft.root()?;
        Ok(Self {
            draft,
            state: UnsignedWithPlaceholder { preliminary_root },
        })
    }

    /// Root over the extras without the HEM signature.
    pub fn preliminary_root(&self) -> &FieldElement {
        &self.state.preliminary_root
    }

    /// Have the HEM key sign the preliminary root.
    pub async fn hem_sign(
        self,
        provider: &dyn SignatureProvider,
        hem_key: &PrivateKey,
    ) -> Result<ConsentSigning<HemSigned>, VcError> {
        let hem_signature = provider
            .sign(&self.state.preliminary_root, hem_key)
            .await?;
        let mut draft = self.draft;
        draft
            .extras
            .insert(ConsentField::HemSignature, hem_signature.clone())?;
        tracing::debug!(credential_id = %draft.id, "consent credential countersigned by HEM");
        Ok(ConsentSigning {
            draft,
            state: HemSigned {
                preliminary_root: self.state.preliminary_root,
                hem_signature,
            },
        })
    }
}

impl ConsentSigning<HemSigned> {
    /// Root the HEM signature covers.
    pub fn preliminary_root(&self) -> &FieldElement {
        &self.state.preliminary_root
    }

    /// The HEM signature.
    pub fn hem_signature(&self) -> &Signature {
        &self.state.hem_signature
    }

    /// Have the issuer sign the final root, which includes the HEM signature.
    pub async fn sign(
        self,
        provider: &dyn SignatureProvider,
        issuer_key: &PrivateKey,
    ) -> Result<ConsentSigning<FullySigned>, VcError> {
        let draft = self.draft.clone();
        let credential = self.draft.sign(provider, issuer_key).await?;
        Ok(ConsentSigning {
            draft,
            state: FullySigned { credential },
        })
    }
}

impl ConsentSigning<FullySigned> {
    /// The signed credential.
    pub fn credential(&self) -> &Credential {
        &self.state.credential
    }

    /// Finish, yielding the signed credential.
    pub fn into_credential(self) -> Credential {
        self.state.credential
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::DeviceSpecificationsField;
    use crate::value::PrequalificationType;
    use fim_crypto::EddsaSignatureProvider;

    fn key(byte: u8) -> PrivateKey {
        PrivateKey::from_bytes([byte; 32])
    }

    fn consent_extras(hem: &PublicKey) -> HashableCreationExtras {
        HashableCreationExtras::new()
            .with(ConsentField::DeviceId, 7u64)
            .unwrap()
            .with(ConsentField::HemIssuer, hem.clone())
            .unwrap()
            .with(ConsentField::FlexibilityGive, 10u64)
            .unwrap()
            .with(ConsentField::FlexibilityReceive, 4u64)
            .unwrap()
            .with(ConsentField::ConsentForUsage, PrequalificationType::Flex)
            .unwrap()
            .with(ConsentField::TStart, Timestamp::from_millis(1_000))
            .unwrap()
            .with(ConsentField::TEnd, Timestamp::from_millis(2_000))
            .unwrap()
    }

    #[tokio::test]
    async fn consent_signing_walks_all_states() {
        let provider = EddsaSignatureProvider::new();
        let (issuer_key, hem_key) = (key(1), key(2));
        let hem = hem_key.public_key();
        let signing = ConsentSigning::new(
            Uuid::from_u128(99),
            issuer_key.public_key(),
            key(3).public_key(),
            Timestamp::from_millis(500),
            consent_extras(&hem),
        )
        .unwrap();
        assert_eq!(signing.state_name(), "UNSIGNED_WITH_PLACEHOLDER");
        let preliminary = signing.preliminary_root().clone();

        let signing = signing.hem_sign(&provider, &hem_key).await.unwrap();
        assert_eq!(signing.state_name(), "HEM_SIGNED");
        assert!(hem.verify(&preliminary, signing.hem_signature()));

        let signing = signing.sign(&provider, &issuer_key).await.unwrap();
        assert_eq!(signing.state_name(), "FULLY_SIGNED");
        let credential = signing.into_credential();

        assert_ne!(credential.root(), &preliminary);
        assert_eq!(credential.signing_tree().unwrap().root(), credential.root());
        assert!(credential
            .issuer()
            .verify(credential.root(), credential.signature()));
        let consent = credential.as_consent().unwrap();
        assert!(hem.verify(&preliminary, consent.hem_signature()));
    }

    #[tokio::test]
    async fn placeholder_discards_supplied_hem_signature() {
        let hem_key = key(2);
        let hem = hem_key.public_key();
        let with_bogus = consent_extras(&hem)
            .with(ConsentField::HemSignature, key(9).sign(&FieldElement::one()))
            .unwrap();
        let a = ConsentSigning::new(
            Uuid::from_u128(1),
            key(1).public_key(),
            key(3).public_key(),
            Timestamp::from_millis(1),
            with_bogus,
        )
        .unwrap();
        let b = ConsentSigning::new(
            Uuid::from_u128(1),
            key(1).public_key(),
            key(3).public_key(),
            Timestamp::from_millis(1),
            consent_extras(&hem),
        )
        .unwrap();
        assert_eq!(a.preliminary_root(), b.preliminary_root());
    }

    #[test]
    fn from_draft_rejects_other_kinds() {
        let draft = CredentialDraft::new(
            CredentialKind::DeviceSpecifications,
            key(1).public_key(),
            key(2).public_key(),
            HashableCreationExtras::new()
                .with(DeviceSpecificationsField::DeviceId, 1u64)
                .unwrap(),
        );
        assert!(matches!(
            ConsentSigning::from_draft(draft),
            Err(VcError::KindMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn draft_sign_covers_root() {
        let provider = EddsaSignatureProvider::new();
        let issuer_key = key(4);
        let extras = HashableCreationExtras::new()
            .with(DeviceSpecificationsField::DeviceId, 1u64)
            .unwrap()
            .with(DeviceSpecificationsField::DeviceName, "Battery")
            .unwrap()
            .with(DeviceSpecificationsField::DeviceOem, "Acme")
            .unwrap()
            .with(DeviceSpecificationsField::ElectronicDescription, "10 kWh")
            .unwrap();
        let draft = CredentialDraft::new(
            CredentialKind::DeviceSpecifications,
            issuer_key.public_key(),
            key(5).public_key(),
            extras,
        );
        let expected_root = draft.root().unwrap();
        let id = draft.id();
        let credential = draft.sign(&provider, &issuer_key).await.unwrap();
        assert_eq!(credential.id(), id);
        assert_eq!(credential.root(), &expected_root);
        assert!(credential
            .issuer()
            .verify(&expected_root, credential.signature()));
    }
}
