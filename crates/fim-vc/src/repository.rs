//! # Credential Repository Port
//!
//! Persistence is a collaborator, not part of the credential core. Services
//! take an `Arc<dyn CredentialRepository>`; the in-memory adapter backs the
//! wallet and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::credential::Credential;
use crate::error::VcError;

/// Storage for credentials keyed by id.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Insert or replace a credential.
    async fn save(&self, credential: Credential) -> Result<(), VcError>;

    /// Look up a credential by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Credential>, VcError>;

    /// Every stored credential.
    async fn get_all(&self) -> Result<Vec<Credential>, VcError>;

    /// Remove a credential. Removing an absent id is not an error.
    async fn delete(&self, id: Uuid) -> Result<(), VcError>;
}

/// Process-local credential store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialRepository {
    credentials: RwLock<HashMap<Uuid, Credential>>,
}

impl InMemoryCredentialRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored credentials.
    pub fn len(&self) -> usize {
        self.credentials.read().len()
    }

    /// Whether the repository holds no credentials.
    pub fn is_empty(&self) -> bool {
        self.credentials.read().is_empty()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn save(&self, credential: Credential) -> Result<(), VcError> {
        self.credentials.write().insert(credential.id(), credential);
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Credential>, VcError> {
        Ok(self.credentials.read().get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Credential>, VcError> {
        let mut all: Vec<Credential> = self.credentials.read().values().cloned().collect();
        all.sort_by_key(|c| (c.timestamp(), c.id()));
        Ok(all)
    }

    async fn delete(&self, id: Uuid) -> Result<(), VcError> {
        self.credentials.write().remove(&id);
        Ok(())
    }
}
