//! # Demo Subcommands
//!
//! `issue-demo` plays the three issuers of a device: the OEM signs the
//! device specifications, the grid operator the prequalification and the
//! owner the consent, which the home energy manager co-signs.
//! `present-demo` plays the aggregator: it proves the pooled flexibility of
//! several devices and verifies the result.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use fim_core::Timestamp;
use fim_crypto::{EddsaSignatureProvider, PrivateKey, PublicKey, SignatureProvider};
use fim_vc::{
    ConsentField, Credential, CredentialKind, DeviceSpecificationsField, HashableCreationExtras,
    PrequalificationField, PrequalificationType,
};
use fim_wallet::{Wallet, WalletConfig};
use fim_zkp::{PresentationExtras, PresentationField, PresentationKind};

const ONE_HOUR_MS: i64 = 3_600_000;

/// Timeframe arguments shared by the demos.
#[derive(Args, Debug, Clone, Default)]
pub struct TimeframeArgs {
    /// Start of the timeframe in Unix milliseconds (default: now).
    #[arg(long)]
    pub t_start: Option<u64>,
    /// End of the timeframe in Unix milliseconds (default: one hour after
    /// the start).
    #[arg(long)]
    pub t_end: Option<u64>,
}

impl TimeframeArgs {
    /// Resolve the defaults.
    pub fn resolve(&self) -> Result<(Timestamp, Timestamp)> {
        let start = self.t_start.map_or_else(Timestamp::now, Timestamp::from_millis);
        let end = match self.t_end {
            Some(ms) => Timestamp::from_millis(ms),
            None => start
                .checked_add_millis(ONE_HOUR_MS)
                .context("timeframe end overflows")?,
        };
        Ok((start, end))
    }
}

/// Arguments for `fim issue-demo`.
#[derive(Args, Debug)]
pub struct IssueDemoArgs {
    /// Device identifier.
    #[arg(long, default_value_t = 1)]
    pub device_id: u64,
    /// Power the device can feed into the grid.
    #[arg(long, default_value_t = 10)]
    pub give: u64,
    /// Power the device can draw from the grid.
    #[arg(long, default_value_t = 5)]
    pub receive: u64,
    /// Holder public key file from `fim keygen` (default: a fresh key).
    #[arg(long)]
    pub holder: Option<PathBuf>,
    /// Consent window.
    #[command(flatten)]
    pub window: TimeframeArgs,
    /// Write the credentials here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments for `fim present-demo`.
#[derive(Args, Debug)]
pub struct PresentDemoArgs {
    /// Number of devices to issue and aggregate.
    #[arg(long, default_value_t = 2)]
    pub agents: u64,
    /// Aggregate these credentials (JSON array) instead of issuing new ones.
    #[arg(long)]
    pub credentials: Option<PathBuf>,
    /// Presented timeframe.
    #[command(flatten)]
    pub timeframe: TimeframeArgs,
    /// Write the presentation here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// The issuers of one device's credentials.
pub struct DemoIssuers {
    oem: Wallet,
    grid_operator: Wallet,
    owner: Wallet,
    hem: PrivateKey,
}

impl DemoIssuers {
    /// Fresh wallets for every issuer and a fresh HEM key.
    pub async fn new(config: &WalletConfig) -> Result<Self> {
        let (hem, _) = EddsaSignatureProvider::new()
            .key_pair()
            .await
            .context("HEM key generation failed")?;
        Ok(Self {
            oem: Wallet::with_defaults(config.clone()).await?,
            grid_operator: Wallet::with_defaults(config.clone()).await?,
            owner: Wallet::with_defaults(config.clone()).await?,
            hem,
        })
    }

    /// Issue the device-specifications, prequalification and consent
    /// credentials of one device to `holder`.
    pub async fn issue_triple(
        &self,
        holder: &PublicKey,
        device_id: u64,
        give: u64,
        receive: u64,
        window: (Timestamp, Timestamp),
    ) -> Result<Vec<Credential>> {
        let device = self
            .oem
            .issue_credential(
                holder.clone(),
                HashableCreationExtras::new()
                    .with(DeviceSpecificationsField::DeviceId, device_id)?
                    .with(DeviceSpecificationsField::DeviceName, "Heat pump")?
                    .with(DeviceSpecificationsField::DeviceOem, "Demo OEM")?
                    .with(DeviceSpecificationsField::ElectronicDescription, "3 kW, 230 V")?,
                CredentialKind::DeviceSpecifications,
            )
            .await?;
        let prequalification = self
            .grid_operator
            .issue_credential(
                holder.clone(),
                HashableCreationExtras::new()
                    .with(PrequalificationField::DeviceId, device_id)?
                    .with(PrequalificationField::PrequalificationType, PrequalificationType::Flex)?
                    .with(PrequalificationField::GridConnectionArea, "Demo area")?,
                CredentialKind::Prequalification,
            )
            .await?;
        let consent = self
            .owner
            .issue_consent_credential(
                holder.clone(),
                HashableCreationExtras::new()
                    .with(ConsentField::DeviceId, device_id)?
                    .with(ConsentField::HemIssuer, self.hem.public_key())?
                    .with(ConsentField::FlexibilityGive, give)?
                    .with(ConsentField::FlexibilityReceive, receive)?
                    .with(ConsentField::ConsentForUsage, PrequalificationType::Flex)?
                    .with(ConsentField::TStart, window.0)?
                    .with(ConsentField::TEnd, window.1)?,
                &self.hem,
            )
            .await?;
        tracing::info!(device_id, "issued credential triple");
        Ok(vec![device, prequalification, consent])
    }
}

fn credentials_json(credentials: &[Credential]) -> Result<serde_json::Value> {
    let items = credentials
        .iter()
        .map(Credential::to_json)
        .collect::<Result<Vec<_>, _>>()
        .context("failed to encode credentials")?;
    Ok(serde_json::Value::Array(items))
}

/// Execute `fim issue-demo`.
pub async fn run_issue_demo(args: &IssueDemoArgs, config: &WalletConfig) -> Result<u8> {
    let holder = match &args.holder {
        Some(path) => crate::keys::load_public_key(path)?,
        None => {
            let (_, public_key) = EddsaSignatureProvider::new()
                .key_pair()
                .await
                .context("holder key generation failed")?;
            public_key
        }
    };
    let issuers = DemoIssuers::new(config).await?;
    let credentials = issuers
        .issue_triple(
            &holder,
            args.device_id,
            args.give,
            args.receive,
            args.window.resolve()?,
        )
        .await?;
    crate::emit_json(&credentials_json(&credentials)?, args.out.as_deref())?;
    Ok(0)
}

/// Execute `fim present-demo`.
pub async fn run_present_demo(args: &PresentDemoArgs, config: &WalletConfig) -> Result<u8> {
    let aggregator = Wallet::with_defaults(config.clone()).await?;
    let (t_start, t_end) = args.timeframe.resolve()?;

    let credentials = match &args.credentials {
        Some(path) => crate::verify::parse_credentials(crate::read_json(path)?)?,
        None => {
            let issuers = DemoIssuers::new(config).await?;
            let mut credentials = Vec::new();
            for device_id in 1..=args.agents {
                credentials.extend(
                    issuers
                        .issue_triple(
                            aggregator.public_key(),
                            device_id,
                            10 * device_id,
                            5 * device_id,
                            (t_start, t_end),
                        )
                        .await?,
                );
            }
            credentials
        }
    };

    let extras = PresentationExtras::new()
        .with(PresentationField::TStart, t_start)
        .with(PresentationField::TEnd, t_end);
    let presentation = aggregator
        .create_presentation(&credentials, PresentationKind::Aggregator, &extras)
        .await?;
    let valid = aggregator.verify_presentation(&presentation).await?;
    let key = aggregator.store_presentation(presentation.clone()).await?;

    if let Some(aggregate) = presentation.as_aggregator() {
        tracing::info!(
            id_hash = %key,
            agents = aggregate.agent_count(),
            give = %aggregate.flexibility_give_sum(),
            receive = %aggregate.flexibility_receive_sum(),
            valid,
            "aggregated presentation"
        );
    }
    let json = presentation.to_json().context("failed to encode presentation")?;
    crate::emit_json(&json, args.out.as_deref())?;
    if valid {
        Ok(0)
    } else {
        println!("FAIL: presentation proof does not verify");
        Ok(1)
    }
}
