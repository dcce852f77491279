//! # Credential Services
//!
//! Application services over the credential model. Each service receives
//! its ports through its constructor:
//!
//! - [`IssueCredentialService`] and [`VerifyCredentialService`] use a
//!   [`SignatureProvider`].
//! - [`StoreCredentialService`], [`GetCredentialService`] and
//!   [`DeleteCredentialService`] use a [`CredentialRepository`].
//!
//! Store, get and delete services may be restricted to one credential kind,
//! giving each kind its own typed store over a shared repository type.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use fim_crypto::{PrivateKey, PublicKey, SignatureProvider};

use crate::credential::Credential;
use crate::error::VcError;
use crate::field::CredentialKind;
use crate::repository::CredentialRepository;
use crate::signing::{ConsentSigning, CredentialDraft};
use crate::value::HashableCreationExtras;

/// Issues signed credentials.
#[derive(Clone)]
pub struct IssueCredentialService {
    provider: Arc<dyn SignatureProvider>,
}

impl IssueCredentialService {
    /// Create the service.
    pub fn new(provider: Arc<dyn SignatureProvider>) -> Self {
        Self { provider }
    }

    /// Issue a credential of `kind` with a fresh id and the current time.
    ///
    /// Consent credentials need `hem_key`, the home energy manager's key;
    /// it is ignored for other kinds.
    pub async fn issue_credential(
        &self,
        issuer: PublicKey,
        holder: PublicKey,
        extras: HashableCreationExtras,
        kind: CredentialKind,
        issuer_key: &PrivateKey,
        hem_key: Option<&PrivateKey>,
    ) -> Result<Credential, VcError> {
        let draft = CredentialDraft::new(kind, issuer, holder, extras);
        let span = tracing::info_span!(
            "issue_credential",
            credential_id = %draft.id(),
            kind = %kind,
        );
        async move {
            let credential = match kind {
                CredentialKind::Consent => {
                    let hem_key = hem_key.ok_or_else(|| {
                        VcError::Validation(
                            "consent credentials require a HEM signing key".to_string(),
                        )
                    })?;
                    ConsentSigning::from_draft(draft)?
                        .hem_sign(self.provider.as_ref(), hem_key)
                        .await?
                        .sign(self.provider.as_ref(), issuer_key)
                        .await?
                        .into_credential()
                }
                _ => draft.sign(self.provider.as_ref(), issuer_key).await?,
            };
            tracing::info!(root = %credential.root(), "credential issued");
            Ok(credential)
        }
        .instrument(span)
        .await
    }
}

/// Verifies issuer signatures on credentials.
#[derive(Clone)]
pub struct VerifyCredentialService {
    provider: Arc<dyn SignatureProvider>,
}

impl VerifyCredentialService {
    /// Create the service.
    pub fn new(provider: Arc<dyn SignatureProvider>) -> Self {
        Self { provider }
    }

    /// Recompute the signing root and check the issuer's signature over it.
    ///
    /// Returns `false` for a bad signature or a credential whose signing
    /// tree cannot be rebuilt; never errors.
    pub async fn verify_credential(&self, credential: &Credential) -> bool {
        let span = tracing::info_span!(
            "verify_credential",
            credential_id = %credential.id(),
            kind = %credential.kind(),
        );
        async move {
            let root = match credential.signing_tree() {
                Ok(tree) => tree.root().clone(),
                Err(err) => {
                    tracing::warn!(error = %err, "signing tree could not be rebuilt");
                    return false;
                }
            };
            let valid = self
                .provider
                .verify(&root, credential.signature(), credential.issuer())
                .await;
            tracing::info!(valid, "credential verified");
            valid
        }
        .instrument(span)
        .await
    }
}

fn check_kind(accepts: Option<CredentialKind>, credential: &Credential) -> Result<(), VcError> {
    match accepts {
        Some(kind) if kind != credential.kind() => Err(VcError::KindMismatch {
            expected: kind.type_name(),
            actual: credential.kind().type_name(),
        }),
        _ => Ok(()),
    }
}

/// Saves credentials to a repository.
#[derive(Clone)]
pub struct StoreCredentialService {
    repository: Arc<dyn CredentialRepository>,
    accepts: Option<CredentialKind>,
}

impl StoreCredentialService {
    /// Store credentials of any kind.
    pub fn new(repository: Arc<dyn CredentialRepository>) -> Self {
        Self {
            repository,
            accepts: None,
        }
    }

    /// Store only credentials of `kind`.
    pub fn for_kind(repository: Arc<dyn CredentialRepository>, kind: CredentialKind) -> Self {
        Self {
            repository,
            accepts: Some(kind),
        }
    }

    /// Save a credential.
    pub async fn store(&self, credential: Credential) -> Result<(), VcError> {
        check_kind(self.accepts, &credential)?;
        tracing::info!(
            credential_id = %credential.id(),
            kind = %credential.kind(),
            "storing credential"
        );
        self.repository.save(credential).await
    }

    /// Parse the canonical JSON encoding and save the result.
    pub async fn store_json(&self, json: serde_json::Value) -> Result<Credential, VcError> {
        let credential = Credential::from_json(json)?;
        self.store(credential.clone()).await?;
        Ok(credential)
    }
}

/// Looks up stored credentials.
#[derive(Clone)]
pub struct GetCredentialService {
    repository: Arc<dyn CredentialRepository>,
    accepts: Option<CredentialKind>,
}

impl GetCredentialService {
    /// Look up credentials of any kind.
    pub fn new(repository: Arc<dyn CredentialRepository>) -> Self {
        Self {
            repository,
            accepts: None,
        }
    }

    /// Look up only credentials of `kind`; others are treated as absent.
    pub fn for_kind(repository: Arc<dyn CredentialRepository>, kind: CredentialKind) -> Self {
        Self {
            repository,
            accepts: Some(kind),
        }
    }

    fn admits(&self, credential: &Credential) -> bool {
        self.accepts.map_or(true, |kind| kind == credential.kind())
    }

    /// The credential with `id`, failing with
    /// [`VcError::NoSuchCredential`] when absent.
    pub async fn get(&self, id: Uuid) -> Result<Credential, VcError> {
        match self.repository.get_by_id(id).await? {
            Some(credential) if self.admits(&credential) => Ok(credential),
            _ => Err(VcError::NoSuchCredential(id)),
        }
    }

    /// Every stored credential this service admits.
    pub async fn get_all(&self) -> Result<Vec<Credential>, VcError> {
        let all = self.repository.get_all().await?;
        Ok(all.into_iter().filter(|c| self.admits(c)).collect())
    }
}

/// Removes stored credentials.
#[derive(Clone)]
pub struct DeleteCredentialService {
    repository: Arc<dyn CredentialRepository>,
}

impl DeleteCredentialService {
    /// Create the service.
    pub fn new(repository: Arc<dyn CredentialRepository>) -> Self {
        Self { repository }
    }

    /// Delete the credential with `id`. Deleting an absent id succeeds.
    pub async fn delete(&self, id: Uuid) -> Result<(), VcError> {
        tracing::info!(credential_id = %id, "deleting credential");
        self.repository.delete(id).await
    }
}
