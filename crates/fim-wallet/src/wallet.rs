//! # Wallet Facade
//!
//! One [`Wallet`] per participant. It is constructed ready to use: the
//! constructor generates the wallet's key pair through the signature
//! provider before returning.

use std::sync::Arc;

use uuid::Uuid;

use fim_core::FieldElement;
use fim_crypto::{EddsaSignatureProvider, PrivateKey, PublicKey, SignatureProvider};
use fim_vc::{
    Credential, CredentialKind, HashableCreationExtras, IssueCredentialService,
    VerifyCredentialService,
};
use fim_zkp::{
    CreatePresentationService, MockZkpProvider, PersistencePresentationService,
    PresentationExtras, PresentationKind, VerifiablePresentation, VerifyPresentationService,
    ZkpProvider,
};

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::store::{TypedCredentialStore, WalletRepositories};

/// A participant's wallet.
pub struct Wallet {
    config: WalletConfig,
    private_key: PrivateKey,
    public_key: PublicKey,
    issue: IssueCredentialService,
    verify: VerifyCredentialService,
    device_specifications: TypedCredentialStore,
    prequalifications: TypedCredentialStore,
    consents: TypedCredentialStore,
    create_presentation: CreatePresentationService,
    verify_presentation: VerifyPresentationService,
    presentations: PersistencePresentationService,
}

impl Wallet {
    /// Build a wallet over in-memory repositories.
    pub async fn new(
        config: WalletConfig,
        signature_provider: Arc<dyn SignatureProvider>,
        zkp_provider: Arc<dyn ZkpProvider>,
    ) -> Result<Self, WalletError> {
        Self::with_repositories(
            config,
            signature_provider,
            zkp_provider,
            WalletRepositories::in_memory(),
        )
        .await
    }

    /// Build a wallet over the given repositories.
    pub async fn with_repositories(
        config: WalletConfig,
        signature_provider: Arc<dyn SignatureProvider>,
        zkp_provider: Arc<dyn ZkpProvider>,
        repositories: WalletRepositories,
    ) -> Result<Self, WalletError> {
        config.validate()?;
        let (private_key, public_key) = signature_provider.key_pair().await?;
        tracing::info!(
            public_key = %public_key,
            signer = signature_provider.provider_name(),
            prover = zkp_provider.provider_name(),
            "wallet ready"
        );

        let store = |kind| TypedCredentialStore::new(repositories.credentials(kind), kind);
        Ok(Self {
            issue: IssueCredentialService::new(signature_provider.clone()),
            verify: VerifyCredentialService::new(signature_provider),
            device_specifications: store(CredentialKind::DeviceSpecifications),
            prequalifications: store(CredentialKind::Prequalification),
            consents: store(CredentialKind::Consent),
            create_presentation: CreatePresentationService::new(zkp_provider.clone()),
            verify_presentation: VerifyPresentationService::new(zkp_provider),
            presentations: PersistencePresentationService::new(repositories.presentations.clone()),
            config,
            private_key,
            public_key,
        })
    }

    /// Build a wallet with the EdDSA signer, the mock prover sized by
    /// `config.max_agents` and in-memory repositories.
    pub async fn with_defaults(config: WalletConfig) -> Result<Self, WalletError> {
        let prover = MockZkpProvider::with_aggregated_flexibility(config.max_agents);
        Self::new(
            config,
            Arc::new(EddsaSignatureProvider::new()),
            Arc::new(prover),
        )
        .await
    }

    /// The settings this wallet was built with.
    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// The wallet's public key; the issuer of everything it issues.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The typed store for `kind`.
    pub fn credential_store(&self, kind: CredentialKind) -> &TypedCredentialStore {
        match kind {
            CredentialKind::DeviceSpecifications => &self.device_specifications,
            CredentialKind::Prequalification => &self.prequalifications,
            CredentialKind::Consent => &self.consents,
        }
    }

    // ── Credentials ──────────────────────────────────────────────────

    /// Issue a device-specifications or prequalification credential to
    /// `holder`, signed with the wallet key.
    ///
    /// Consent credentials also need the home energy manager's signature;
    /// use [`Wallet::issue_consent_credential`] for them.
    pub async fn issue_credential(
        &self,
        holder: PublicKey,
        extras: HashableCreationExtras,
        kind: CredentialKind,
    ) -> Result<Credential, WalletError> {
        Ok(self
            .issue
            .issue_credential(
                self.public_key.clone(),
                holder,
                extras,
                kind,
                &self.private_key,
                None,
            )
            .await?)
    }

    /// Issue a consent credential to `holder`. The home energy manager
    /// signs first with `hem_key`, then the wallet signs as issuer.
    pub async fn issue_consent_credential(
        &self,
        holder: PublicKey,
        extras: HashableCreationExtras,
        hem_key: &PrivateKey,
    ) -> Result<Credential, WalletError> {
        Ok(self
            .issue
            .issue_credential(
                self.public_key.clone(),
                holder,
                extras,
                CredentialKind::Consent,
                &self.private_key,
                Some(hem_key),
            )
            .await?)
    }

    /// Check the issuer signature of `credential`.
    pub async fn verify_credential(&self, credential: &Credential) -> bool {
        self.verify.verify_credential(credential).await
    }

    /// File `credential` in the store for its kind.
    pub async fn store_credential(&self, credential: Credential) -> Result<(), WalletError> {
        Ok(self.credential_store(credential.kind()).store(credential).await?)
    }

    /// Parse a credential of `kind` from its canonical JSON and store it.
    /// A document of another kind fails with a kind mismatch.
    pub async fn store_credential_json(
        &self,
        kind: CredentialKind,
        json: serde_json::Value,
    ) -> Result<Credential, WalletError> {
        Ok(self.credential_store(kind).store_json(json).await?)
    }

    /// The stored credential of `kind` with `id`.
    pub async fn get_credential(
        &self,
        kind: CredentialKind,
        id: Uuid,
    ) -> Result<Credential, WalletError> {
        Ok(self.credential_store(kind).get(id).await?)
    }

    /// Every stored credential of `kind`.
    pub async fn get_all_credentials(
        &self,
        kind: CredentialKind,
    ) -> Result<Vec<Credential>, WalletError> {
        Ok(self.credential_store(kind).get_all().await?)
    }

    /// Remove the credential of `kind` with `id`.
    pub async fn delete_credential(
        &self,
        kind: CredentialKind,
        id: Uuid,
    ) -> Result<(), WalletError> {
        Ok(self.credential_store(kind).delete(id).await?)
    }

    // ── Presentations ────────────────────────────────────────────────

    /// Prove a presentation of `kind` over `credentials`.
    pub async fn create_presentation(
        &self,
        credentials: &[Credential],
        kind: PresentationKind,
        extras: &PresentationExtras,
    ) -> Result<VerifiablePresentation, WalletError> {
        Ok(self
            .create_presentation
            .full_presentation_of(credentials, kind, extras)
            .await?)
    }

    /// Check a presentation's proof against its public signals.
    pub async fn verify_presentation(
        &self,
        presentation: &VerifiablePresentation,
    ) -> Result<bool, WalletError> {
        Ok(self
            .verify_presentation
            .verify_presentation(presentation)
            .await?)
    }

    /// Store a presentation under its id hash and return that key.
    pub async fn store_presentation(
        &self,
        presentation: VerifiablePresentation,
    ) -> Result<FieldElement, WalletError> {
        let key = presentation.id_hash();
        self.presentations.store(presentation).await?;
        Ok(key)
    }

    /// The presentation stored under `id_hash`.
    pub async fn get_presentation(
        &self,
        id_hash: &FieldElement,
    ) -> Result<VerifiablePresentation, WalletError> {
        Ok(self.presentations.get_required(id_hash).await?)
    }

    /// Every stored presentation.
    pub async fn get_all_presentations(&self) -> Result<Vec<VerifiablePresentation>, WalletError> {
        Ok(self.presentations.get_all().await?)
    }

    /// Remove the presentation stored under `id_hash`.
    pub async fn delete_presentation(&self, id_hash: &FieldElement) -> Result<(), WalletError> {
        Ok(self.presentations.delete(id_hash).await?)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fim_vc::{DeviceSpecificationsField, VcError};

    fn device(id: u64) -> HashableCreationExtras {
        HashableCreationExtras::new()
            .with(DeviceSpecificationsField::DeviceId, id)
            .unwrap()
            .with(DeviceSpecificationsField::DeviceName, "Battery")
            .unwrap()
            .with(DeviceSpecificationsField::DeviceOem, "Acme")
            .unwrap()
            .with(DeviceSpecificationsField::ElectronicDescription, "10 kWh")
            .unwrap()
    }

    #[tokio::test]
    async fn wallets_get_distinct_keys() {
        let a = Wallet::with_defaults(WalletConfig::default()).await.unwrap();
        let b = Wallet::with_defaults(WalletConfig::default()).await.unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[tokio::test]
    async fn rejects_invalid_config() {
        let config = WalletConfig {
            max_agents: 0,
            ..WalletConfig::default()
        };
        assert!(matches!(
            Wallet::with_defaults(config).await,
            Err(WalletError::Config(_))
        ));
    }

    #[tokio::test]
    async fn issued_credentials_carry_the_wallet_key() {
        let wallet = Wallet::with_defaults(WalletConfig::default()).await.unwrap();
        let holder = PrivateKey::from_bytes([9; 32]).public_key();
        let credential = wallet
            .issue_credential(holder.clone(), device(1), CredentialKind::DeviceSpecifications)
            .await
            .unwrap();
        assert_eq!(credential.issuer(), wallet.public_key());
        assert_eq!(credential.holder(), &holder);
        assert!(wallet.verify_credential(&credential).await);
    }

    #[tokio::test]
    async fn consent_needs_the_dedicated_operation() {
        let wallet = Wallet::with_defaults(WalletConfig::default()).await.unwrap();
        let result = wallet
            .issue_credential(
                wallet.public_key().clone(),
                HashableCreationExtras::new(),
                CredentialKind::Consent,
            )
            .await;
        assert!(matches!(result, Err(WalletError::Credential(_))));
    }

    #[tokio::test]
    async fn credentials_are_filed_by_kind() {
        let wallet = Wallet::with_defaults(WalletConfig::default()).await.unwrap();
        let credential = wallet
            .issue_credential(
                wallet.public_key().clone(),
                device(7),
                CredentialKind::DeviceSpecifications,
            )
            .await
            .unwrap();
        let id = credential.id();
        wallet.store_credential(credential.clone()).await.unwrap();

        assert_eq!(
            wallet
                .get_credential(CredentialKind::DeviceSpecifications, id)
                .await
                .unwrap(),
            credential
        );
        assert!(matches!(
            wallet.get_credential(CredentialKind::Consent, id).await,
            Err(WalletError::Credential(VcError::NoSuchCredential(_)))
        ));

        let json = credential.to_json().unwrap();
        assert!(matches!(
            wallet
                .store_credential_json(CredentialKind::Prequalification, json)
                .await,
            Err(WalletError::Credential(VcError::KindMismatch { .. }))
        ));

        wallet
            .delete_credential(CredentialKind::DeviceSpecifications, id)
            .await
            .unwrap();
        assert!(wallet
            .get_all_credentials(CredentialKind::DeviceSpecifications)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn debug_redacts_the_private_key() {
        let wallet = Wallet::with_defaults(WalletConfig::default()).await.unwrap();
        let text = format!("{wallet:?}");
        assert!(text.contains("[REDACTED]"));
    }
}
