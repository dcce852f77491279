//! # Presentation Repository Port
//!
//! Presentations are keyed by the Poseidon hash of their id.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use fim_core::FieldElement;

use crate::error::ZkpError;
use crate::presentation::VerifiablePresentation;

/// Storage for presentations keyed by id hash.
#[async_trait]
pub trait PresentationRepository: Send + Sync {
    /// Insert or replace a presentation.
    async fn save(&self, presentation: VerifiablePresentation) -> Result<(), ZkpError>;

    /// Look up a presentation by id hash.
    async fn get_by_id(
        &self,
        id_hash: &FieldElement,
    ) -> Result<Option<VerifiablePresentation>, ZkpError>;

    /// Every stored presentation.
    async fn get_all(&self) -> Result<Vec<VerifiablePresentation>, ZkpError>;

    /// Remove a presentation. Removing an absent key is not an error.
    async fn delete(&self, id_hash: &FieldElement) -> Result<(), ZkpError>;
}

/// Process-local presentation store.
#[derive(Debug, Default)]
pub struct InMemoryPresentationRepository {
    presentations: RwLock<HashMap<FieldElement, VerifiablePresentation>>,
}

impl InMemoryPresentationRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored presentations.
    pub fn len(&self) -> usize {
        self.presentations.read().len()
    }

    /// Whether the repository holds no presentations.
    pub fn is_empty(&self) -> bool {
        self.presentations.read().is_empty()
    }
}

#[async_trait]
impl PresentationRepository for InMemoryPresentationRepository {
    async fn save(&self, presentation: VerifiablePresentation) -> Result<(), ZkpError> {
        self.presentations
            .write()
            .insert(presentation.id_hash(), presentation);
        Ok(())
    }

    async fn get_by_id(
        &self,
        id_hash: &FieldElement,
    ) -> Result<Option<VerifiablePresentation>, ZkpError> {
        Ok(self.presentations.read().get(id_hash).cloned())
    }

    async fn get_all(&self) -> Result<Vec<VerifiablePresentation>, ZkpError> {
        let mut all: Vec<VerifiablePresentation> =
            self.presentations.read().values().cloned().collect();
        all.sort_by_key(VerifiablePresentation::id);
        Ok(all)
    }

    async fn delete(&self, id_hash: &FieldElement) -> Result<(), ZkpError> {
        self.presentations.write().remove(id_hash);
        Ok(())
    }
}
