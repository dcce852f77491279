//! # Keygen Subcommand
//!
//! Writes a BabyJubJub key pair as two files: `<prefix>.key` holds the 32
//! private key bytes in hex, `<prefix>.pub` the public key as the JSON pair
//! `["x", "y"]`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use fim_crypto::{EddsaSignatureProvider, PrivateKey, PublicKey, SignatureProvider};

/// Arguments for `fim keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output directory for the key files.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,
    /// Prefix for the key filenames.
    #[arg(long, default_value = "fim")]
    pub prefix: String,
}

/// Execute `fim keygen`.
pub async fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    std::fs::create_dir_all(&args.output).with_context(|| {
        format!("failed to create output directory: {}", args.output.display())
    })?;

    let (private_key, public_key) = EddsaSignatureProvider::new()
        .key_pair()
        .await
        .context("key generation failed")?;

    let key_path = args.output.join(format!("{}.key", args.prefix));
    let pub_path = args.output.join(format!("{}.pub", args.prefix));
    std::fs::write(&key_path, bytes_to_hex(private_key.as_bytes()))
        .with_context(|| format!("failed to write private key: {}", key_path.display()))?;
    let public_json = serde_json::to_string(&public_key).context("failed to encode public key")?;
    std::fs::write(&pub_path, &public_json)
        .with_context(|| format!("failed to write public key: {}", pub_path.display()))?;

    println!("OK: generated BabyJubJub key pair");
    println!("  Private key: {}", key_path.display());
    println!("  Public key:  {}", pub_path.display());
    println!("  Public key (x, y): {public_key}");
    Ok(0)
}

/// Load a private key written by `fim keygen`.
pub fn load_private_key(path: &Path) -> Result<PrivateKey> {
    let hex = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read private key: {}", path.display()))?;
    let bytes = hex_to_bytes(hex.trim()).context("invalid private key hex")?;
    if bytes.len() != 32 {
        bail!(
            "private key must be 32 bytes (64 hex chars), got {} bytes",
            bytes.len()
        );
    }
    PrivateKey::from_slice(&bytes).map_err(|e| anyhow::anyhow!("invalid private key: {e}"))
}

/// Load a public key written by `fim keygen`.
pub fn load_public_key(path: &Path) -> Result<PublicKey> {
    let value = crate::read_json(path)?;
    serde_json::from_value(value)
        .with_context(|| format!("invalid public key: {}", path.display()))
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_to_bytes(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        bail!("hex string has odd length: {}", hex.len());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .with_context(|| format!("invalid hex at position {i}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keygen_writes_loadable_pair() {
        let dir = tempfile::tempdir().unwrap();
        let args = KeygenArgs {
            output: dir.path().to_path_buf(),
            prefix: "test".to_string(),
        };
        assert_eq!(run_keygen(&args).await.unwrap(), 0);

        let key_hex = std::fs::read_to_string(dir.path().join("test.key")).unwrap();
        assert_eq!(key_hex.len(), 64);

        let private_key = load_private_key(&dir.path().join("test.key")).unwrap();
        let public_key = load_public_key(&dir.path().join("test.pub")).unwrap();
        assert_eq!(private_key.public_key(), public_key);
    }

    #[test]
    fn hex_roundtrip_and_errors() {
        let bytes = [0u8, 1, 0xab, 0xff];
        assert_eq!(hex_to_bytes(&bytes_to_hex(&bytes)).unwrap(), bytes);
        assert!(hex_to_bytes("abc").is_err());
        assert!(hex_to_bytes("zz").is_err());
        assert!(hex_to_bytes("é0").is_err());
    }

    #[test]
    fn short_private_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.key");
        std::fs::write(&path, "abcd").unwrap();
        let err = load_private_key(&path).unwrap_err();
        assert!(err.to_string().contains("32 bytes"));
    }
}
