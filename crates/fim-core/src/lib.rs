//! # fim-core — Foundational Types for the Flexibility Wallet
//!
//! This crate defines the primitives every other crate in the workspace
//! builds on. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One field type.** Hash inputs, hash outputs, Merkle nodes and circuit
//!    signals are all [`FieldElement`], an integer below the BN254 scalar
//!    modulus. Reduction is explicit at construction time.
//!
//! 2. **Non-negative millisecond timestamps.** [`Timestamp`] is a `u64`
//!    newtype, so negative times are unrepresentable.
//!
//! 3. **Typed property bags.** [`CreationExtras`] is keyed by a closed enum
//!    chosen by the consumer, so a factory can only be handed fields that
//!    were declared.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `fim-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod extras;
pub mod field;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::{CoreError, MissingCreationExtra};
pub use extras::CreationExtras;
pub use field::{modulus, FieldElement, MODULUS_DECIMAL};
pub use temporal::Timestamp;
