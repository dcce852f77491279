//! # Hash Subcommand
//!
//! Poseidon digests as the circuits compute them. Integers are hashed with
//! a block size equal to their count; `--text` hashes a string with block
//! size 1.

use anyhow::{bail, Context, Result};
use clap::Args;

use fim_core::FieldElement;

/// Arguments for `fim hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// Decimal field elements (1 to 16), or one string with `--text`.
    #[arg(required = true, value_name = "VALUE")]
    pub values: Vec<String>,
    /// Hash the value as a UTF-8 string.
    #[arg(long)]
    pub text: bool,
}

/// Compute the digest `args` describe.
pub fn digest_of(args: &HashArgs) -> Result<FieldElement> {
    if args.text {
        if args.values.len() != 1 {
            bail!("--text takes exactly one value, got {}", args.values.len());
        }
        return Ok(fim_crypto::digest_str(&args.values[0]));
    }
    let inputs = args
        .values
        .iter()
        .map(|v| v.parse::<FieldElement>())
        .collect::<Result<Vec<_>, _>>()
        .context("inputs must be decimal field elements")?;
    fim_crypto::digest(&inputs).context("digest failed")
}

/// Execute `fim hash`.
pub fn run_hash(args: &HashArgs) -> Result<u8> {
    println!("{}", digest_of(args)?);
    Ok(0)
}
