//! # fim-wallet — Flexibility Wallet
//!
//! The facade a participant runs: it owns a key pair, issues credentials
//! under it, keeps the credentials it receives in one typed store per
//! credential kind and produces aggregated presentations for the grid
//! operator.
//!
//! Ports are injected explicitly. [`Wallet::new`] takes the signature and
//! proving backends; [`Wallet::with_repositories`] also takes the storage
//! adapters; [`Wallet::with_defaults`] wires the in-process EdDSA provider,
//! the mock prover and in-memory repositories.
//!
//! ## Crate Policy
//!
//! - Depends on every other library crate of the workspace.
//! - Construction is async and returns a ready wallet; there is no
//!   half-initialised state.
//! - Configuration is read once, through [`WalletConfig`].

pub mod config;
pub mod error;
pub mod store;
pub mod wallet;

pub use config::{ConfigError, WalletConfig};
pub use error::WalletError;
pub use store::{TypedCredentialStore, WalletRepositories};
pub use wallet::Wallet;
