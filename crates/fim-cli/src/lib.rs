//! # fim-cli — Flexibility Wallet Command-Line Interface
//!
//! Provides the `fim` binary.
//!
//! ## Subcommands
//!
//! - `fim keygen`: BabyJubJub key pair generation.
//! - `fim hash`: Poseidon digest of integers or a string.
//! - `fim issue-demo`: issue a device's credential triple.
//! - `fim verify-credential`: check a credential's issuer signature.
//! - `fim present-demo`: aggregate a device pool into a verified
//!   presentation.
//!
//! ```bash
//! fim keygen --output keys --prefix aggregator
//! fim issue-demo --holder keys/aggregator.pub --out triple.json
//! fim verify-credential triple.json
//! fim present-demo --agents 3
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; behaviour is delegated to the library
//!   crates.
//! - Handlers return an exit code: `0` on success, `1` when a check fails.

pub mod demo;
pub mod hash;
pub mod keys;
pub mod verify;

use std::path::Path;

use anyhow::{Context, Result};

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse JSON: {}", path.display()))
}

/// Pretty-print `value` to `out`, or to stdout when `out` is `None`.
pub fn emit_json(value: &serde_json::Value, out: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to encode JSON")?;
    match out {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            println!("OK: wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let value = serde_json::json!({"a": ["1", "2"]});
        emit_json(&value, Some(&path)).unwrap();
        assert_eq!(read_json(&path).unwrap(), value);
    }

    #[test]
    fn read_reports_missing_file() {
        let err = read_json(Path::new("/nonexistent/fim.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read"));
    }
}
