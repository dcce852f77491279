//! # fim-zkp — Zero-Knowledge Presentations
//!
//! Bridges credentials to zk-SNARK circuits and back:
//!
//! - **Inputs** (`inputs.rs`): named scalar and array circuit inputs.
//! - **Proofs** (`proof.rs`): Groth16 proof objects with checked arities
//!   and the prover's result type.
//! - **Provider** (`provider.rs`): the `ZkpProvider` port, addressed by
//!   circuit name.
//! - **Mock** (`mock.rs`): `MockZkpProvider`, a deterministic backend that
//!   evaluates circuits natively and binds proofs with SHA-256.
//! - **Circuit** (`circuit.rs`): native evaluation of the aggregated
//!   flexibility circuit.
//! - **Presentations** (`presentation/`): the presentation sum type, the
//!   aggregator presentation and its positional signal decoding.
//! - **Services and repository** (`service.rs`, `repository.rs`).
//!
//! ## Crate Policy
//!
//! - Depends on `fim-core`, `fim-crypto` and `fim-vc` internally.
//! - Every circuit value is a `FieldElement`, so inputs are below the
//!   field modulus by construction.
//! - Invalid proofs are reported as `false`, never as errors.

pub mod circuit;
pub mod error;
pub mod inputs;
pub mod mock;
pub mod presentation;
pub mod proof;
pub mod provider;
pub mod repository;
pub mod service;

pub use error::ZkpError;
pub use inputs::CircuitInputs;
pub use mock::MockZkpProvider;
pub use presentation::{
    AggregatorPresentation, PresentationExtras, PresentationField, PresentationKind,
    VerifiablePresentation,
};
pub use proof::{CircomResult, Proof};
pub use provider::ZkpProvider;
pub use repository::{InMemoryPresentationRepository, PresentationRepository};
pub use service::{
    CreatePresentationService, PersistencePresentationService, VerifyPresentationService,
};
