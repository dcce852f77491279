//! # Typed Credential Stores
//!
//! The wallet keeps each credential kind in its own repository. A
//! [`TypedCredentialStore`] bundles the store, get and delete services for
//! one kind over one repository, so a consent credential can never land in
//! the device-specifications store.

use std::sync::Arc;

use uuid::Uuid;

use fim_vc::{
    Credential, CredentialKind, CredentialRepository, DeleteCredentialService,
    GetCredentialService, InMemoryCredentialRepository, StoreCredentialService, VcError,
};
use fim_zkp::{InMemoryPresentationRepository, PresentationRepository};

/// Storage adapters injected into a wallet.
#[derive(Clone)]
pub struct WalletRepositories {
    /// Device-specifications credentials.
    pub device_specifications: Arc<dyn CredentialRepository>,
    /// Prequalification credentials.
    pub prequalifications: Arc<dyn CredentialRepository>,
    /// Consent credentials.
    pub consents: Arc<dyn CredentialRepository>,
    /// Presentations, keyed by id hash.
    pub presentations: Arc<dyn PresentationRepository>,
}

impl WalletRepositories {
    /// Fresh in-memory repositories.
    pub fn in_memory() -> Self {
        Self {
            device_specifications: Arc::new(InMemoryCredentialRepository::new()),
            prequalifications: Arc::new(InMemoryCredentialRepository::new()),
            consents: Arc::new(InMemoryCredentialRepository::new()),
            presentations: Arc::new(InMemoryPresentationRepository::new()),
        }
    }

    pub(crate) fn credentials(&self, kind: CredentialKind) -> Arc<dyn CredentialRepository> {
        match kind {
            CredentialKind::DeviceSpecifications => self.device_specifications.clone(),
            CredentialKind::Prequalification => self.prequalifications.clone(),
            CredentialKind::Consent => self.consents.clone(),
        }
    }
}

impl Default for WalletRepositories {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Store, lookup and deletion for one credential kind.
#[derive(Clone)]
pub struct TypedCredentialStore {
    kind: CredentialKind,
    store: StoreCredentialService,
    get: GetCredentialService,
    delete: DeleteCredentialService,
}

impl TypedCredentialStore {
    /// Bind the services for `kind` to `repository`.
    pub fn new(repository: Arc<dyn CredentialRepository>, kind: CredentialKind) -> Self {
        Self {
            kind,
            store: StoreCredentialService::for_kind(repository.clone(), kind),
            get: GetCredentialService::for_kind(repository.clone(), kind),
            delete: DeleteCredentialService::new(repository),
        }
    }

    /// The kind this store holds.
    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    /// Save a credential; other kinds fail with [`VcError::KindMismatch`].
    pub async fn store(&self, credential: Credential) -> Result<(), VcError> {
        self.store.store(credential).await
    }

    /// Parse and save the canonical JSON encoding.
    pub async fn store_json(&self, json: serde_json::Value) -> Result<Credential, VcError> {
        self.store.store_json(json).await
    }

    /// The credential with `id`.
    pub async fn get(&self, id: Uuid) -> Result<Credential, VcError> {
        self.get.get(id).await
    }

    /// Every stored credential.
    pub async fn get_all(&self) -> Result<Vec<Credential>, VcError> {
        self.get.get_all().await
    }

    /// Delete the credential with `id`.
    pub async fn delete(&self, id: Uuid) -> Result<(), VcError> {
        self.delete.delete(id).await
    }
}

impl std::fmt::Debug for TypedCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCredentialStore")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repositories_are_separate_per_kind() {
        let repos = WalletRepositories::in_memory();
        let ds = repos.credentials(CredentialKind::DeviceSpecifications);
        let consent = repos.credentials(CredentialKind::Consent);
        assert!(!Arc::ptr_eq(&ds, &consent));
        assert!(Arc::ptr_eq(
            &ds,
            &repos.credentials(CredentialKind::DeviceSpecifications)
        ));
    }

    #[tokio::test]
    async fn empty_store_reports_missing_credentials() {
        let store = TypedCredentialStore::new(
            Arc::new(InMemoryCredentialRepository::new()),
            CredentialKind::Prequalification,
        );
        assert_eq!(store.kind(), CredentialKind::Prequalification);
        assert!(store.get_all().await.unwrap().is_empty());
        assert!(matches!(
            store.get(Uuid::nil()).await,
            Err(VcError::NoSuchCredential(_))
        ));
        store.delete(Uuid::nil()).await.unwrap();
    }
}
