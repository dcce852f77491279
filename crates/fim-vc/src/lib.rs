//! # fim-vc — Flexibility Credentials
//!
//! The credential model of the flexibility wallet:
//!
//! - **Declared fields** (`field.rs`): one closed enum of body fields per
//!   credential kind, in signing order.
//! - **Creation extras** (`value.rs`): a type-checked property bag keyed by
//!   declared fields, used to feed the generic factory.
//! - **Credentials** (`credential/`): the sum type over device
//!   specifications, prequalification and consent, the factory, the Merkle
//!   signing tree, compact and extended scalar lists and canonical JSON.
//! - **Signing** (`signing.rs`): drafts and the consent two-phase state
//!   machine.
//! - **Services and repository** (`service.rs`, `repository.rs`).
//!
//! ## Crate Policy
//!
//! - Depends on `fim-core` and `fim-crypto` internally.
//! - Credentials are immutable values; equality is structural.
//! - Invalid signatures are reported as `false`, never as errors.

pub mod credential;
pub mod error;
pub mod field;
pub mod repository;
pub mod service;
pub mod signing;
pub mod value;

pub use credential::{
    create, signing_tree, ConsentCredential, Credential, CredentialMetadata,
    DeviceSpecificationsCredential, PrequalificationCredential,
};
pub use error::VcError;
pub use field::{
    ConsentField, CredentialField, CredentialKind, DeviceSpecificationsField,
    PrequalificationField, ValueType,
};
pub use repository::{CredentialRepository, InMemoryCredentialRepository};
pub use service::{
    DeleteCredentialService, GetCredentialService, IssueCredentialService,
    StoreCredentialService, VerifyCredentialService,
};
pub use signing::{
    ConsentSigning, CredentialDraft, FullySigned, HemSigned, SigningState,
    UnsignedWithPlaceholder,
};
pub use value::{HashableCreationExtras, HashableValue, PrequalificationType};
