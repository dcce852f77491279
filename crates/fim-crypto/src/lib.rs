//! # fim-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for the flexibility wallet:
//!
//! - **Poseidon** over BN254, constant-compatible with circomlib for block
//!   sizes 1 to 16, with a multi-block `digest`.
//! - **Binary Merkle trees** with Poseidon node hashing, used to commit to
//!   credential properties.
//! - **EdDSA-Poseidon** signatures on BabyJubJub for binding issuers to
//!   credential roots, key-compatible with circomlibjs. Curve arithmetic
//!   runs on arkworks.
//! - The async **SignatureProvider** port and its in-process adapter.
//!
//! ## Crate Policy
//!
//! - Depends only on `fim-core` internally.
//! - No mocking of cryptographic operations in tests: all tests use real
//!   Poseidon, real curve arithmetic, real signatures.
//! - No `unsafe` code.

pub mod babyjubjub;
pub mod eddsa;
pub mod error;
pub mod hashable;
pub mod merkle;
pub mod poseidon;
pub mod signature_provider;

pub use babyjubjub::Point;
pub use eddsa::{PrivateKey, PublicKey, Signature};
pub use error::CryptoError;
pub use hashable::PoseidonHashable;
pub use merkle::{BinaryMerkleTree, MerkleProof};
pub use poseidon::{digest, digest_str, PoseidonHash};
pub use signature_provider::{EddsaSignatureProvider, SignatureProvider};
