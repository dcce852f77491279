//! # Verify-Credential Subcommand
//!
//! Checks the issuer signature of one credential or of every credential in
//! a JSON array, as written by `fim issue-demo`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use fim_crypto::EddsaSignatureProvider;
use fim_vc::{Credential, VerifyCredentialService};

/// Arguments for `fim verify-credential`.
#[derive(Args, Debug)]
pub struct VerifyCredentialArgs {
    /// Credential JSON file (one object or an array).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Parse one credential or an array of credentials.
pub fn parse_credentials(value: serde_json::Value) -> Result<Vec<Credential>> {
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                Credential::from_json(item).with_context(|| format!("credential #{i} is invalid"))
            })
            .collect(),
        single => Ok(vec![Credential::from_json(single).context("invalid credential")?]),
    }
}

/// Execute `fim verify-credential`.
pub async fn run_verify_credential(args: &VerifyCredentialArgs) -> Result<u8> {
    let credentials = parse_credentials(crate::read_json(&args.file)?)?;
    let service = VerifyCredentialService::new(Arc::new(EddsaSignatureProvider::new()));

    let mut failed = 0usize;
    for credential in &credentials {
        if service.verify_credential(credential).await {
            println!("OK: {} {} is valid", credential.kind(), credential.id());
        } else {
            println!(
                "FAIL: {} {} signature verification failed",
                credential.kind(),
                credential.id()
            );
            failed += 1;
        }
    }
    Ok(u8::from(failed > 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_credential_type() {
        let err = parse_credentials(serde_json::json!([{"type": "DriverLicense"}])).unwrap_err();
        assert!(err.to_string().contains("credential #0"));
    }

    #[test]
    fn empty_array_parses_to_nothing() {
        assert!(parse_credentials(serde_json::json!([])).unwrap().is_empty());
    }
}
