//! # Presentation Services
//!
//! - [`CreatePresentationService`]: credentials → circuit inputs → proof →
//!   presentation.
//! - [`VerifyPresentationService`]: checks a presentation's proof against
//!   its public signals.
//! - [`PersistencePresentationService`]: store, look up and delete
//!   presentations by id hash.

use std::sync::Arc;

use tracing::Instrument;

use fim_core::FieldElement;
use fim_vc::Credential;

use crate::error::ZkpError;
use crate::presentation::{self, PresentationExtras, PresentationKind, VerifiablePresentation};
use crate::provider::ZkpProvider;
use crate::repository::PresentationRepository;

/// Builds presentations through the proving backend.
#[derive(Clone)]
pub struct CreatePresentationService {
    provider: Arc<dyn ZkpProvider>,
}

impl CreatePresentationService {
    /// Create the service.
    pub fn new(provider: Arc<dyn ZkpProvider>) -> Self {
        Self { provider }
    }

    /// Prove `credentials` under `kind`'s circuit and decode the result.
    pub async fn full_presentation_of(
        &self,
        credentials: &[Credential],
        kind: PresentationKind,
        extras: &PresentationExtras,
    ) -> Result<VerifiablePresentation, ZkpError> {
        let circuit = kind.circuit_name();
        let span = tracing::info_span!(
            "create_presentation",
            circuit,
            kind = %kind,
            credentials = credentials.len(),
        );
        async move {
            let inputs = kind.circuit_inputs(credentials, extras)?;
            let result = self.provider.full_prove(circuit, &inputs).await?;
            let presentation = presentation::create(kind, result.public_signals(), result.proof)?;
            tracing::info!(presentation_id = %presentation.id(), "presentation created");
            Ok(presentation)
        }
        .instrument(span)
        .await
    }
}

/// Verifies presentation proofs.
#[derive(Clone)]
pub struct VerifyPresentationService {
    provider: Arc<dyn ZkpProvider>,
}

impl VerifyPresentationService {
    /// Create the service.
    pub fn new(provider: Arc<dyn ZkpProvider>) -> Self {
        Self { provider }
    }

    /// Check the proof. An invalid proof yields `Ok(false)`.
    pub async fn verify_presentation(
        &self,
        presentation: &VerifiablePresentation,
    ) -> Result<bool, ZkpError> {
        let circuit = presentation.kind().circuit_name();
        let valid = self
            .provider
            .verify(circuit, presentation.public_signals(), presentation.proof())
            .await?;
        tracing::info!(
            circuit,
            presentation_id = %presentation.id(),
            valid,
            "presentation verified"
        );
        Ok(valid)
    }
}

/// Persistence of presentations keyed by id hash.
#[derive(Clone)]
pub struct PersistencePresentationService {
    repository: Arc<dyn PresentationRepository>,
}

impl PersistencePresentationService {
    /// Create the service.
    pub fn new(repository: Arc<dyn PresentationRepository>) -> Self {
        Self { repository }
    }

    /// Save a presentation under its id hash.
    pub async fn store(&self, presentation: VerifiablePresentation) -> Result<(), ZkpError> {
        tracing::info!(id_hash = %presentation.id_hash(), "storing presentation");
        self.repository.save(presentation).await
    }

    /// The presentation stored under `id_hash`, if any.
    pub async fn get(
        &self,
        id_hash: &FieldElement,
    ) -> Result<Option<VerifiablePresentation>, ZkpError> {
        self.repository.get_by_id(id_hash).await
    }

    /// The presentation stored under `id_hash`, failing with
    /// [`ZkpError::NoSuchPresentation`] when absent.
    pub async fn get_required(
        &self,
        id_hash: &FieldElement,
    ) -> Result<VerifiablePresentation, ZkpError> {
        self.get(id_hash)
            .await?
            .ok_or_else(|| ZkpError::NoSuchPresentation(id_hash.clone()))
    }

    /// Every stored presentation.
    pub async fn get_all(&self) -> Result<Vec<VerifiablePresentation>, ZkpError> {
        self.repository.get_all().await
    }

    /// Delete the presentation stored under `id_hash`.
    pub async fn delete(&self, id_hash: &FieldElement) -> Result<(), ZkpError> {
        tracing::info!(id_hash = %id_hash, "deleting presentation");
        self.repository.delete(id_hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::Proof;
    use crate::repository::InMemoryPresentationRepository;

    fn presentation() -> VerifiablePresentation {
        let z = FieldElement::zero;
        let proof = Proof::new(
            vec![z(), z(), z()],
            vec![vec![z(), z()], vec![z(), z()], vec![z(), z()]],
            vec![z(), z(), z()],
            "groth16",
            "bn128",
        )
        .unwrap();
        presentation::create(PresentationKind::Aggregator, vec![z(); 4], proof).unwrap()
    }

    #[tokio::test]
    async fn store_get_delete_by_id_hash() {
        let repo = Arc::new(InMemoryPresentationRepository::new());
        let service = PersistencePresentationService::new(repo.clone());
        let p = presentation();
        let key = p.id_hash();

        service.store(p.clone()).await.unwrap();
        assert_eq!(service.get(&key).await.unwrap(), Some(p.clone()));
        assert_eq!(service.get_required(&key).await.unwrap(), p);
        assert_eq!(service.get_all().await.unwrap().len(), 1);

        service.delete(&key).await.unwrap();
        assert_eq!(service.get(&key).await.unwrap(), None);
        assert!(matches!(
            service.get_required(&key).await,
            Err(ZkpError::NoSuchPresentation(_))
        ));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn raw_id_is_not_a_key() {
        let service =
            PersistencePresentationService::new(Arc::new(InMemoryPresentationRepository::new()));
        let p = presentation();
        let raw = FieldElement::from_uuid(&p.id());
        service.store(p).await.unwrap();
        assert_eq!(service.get(&raw).await.unwrap(), None);
    }
}
