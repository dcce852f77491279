//! A device pool end to end: three issuers, one aggregator wallet.

use fim_core::Timestamp;
use fim_crypto::PrivateKey;
use fim_vc::{
    ConsentField, Credential, CredentialKind, DeviceSpecificationsField, HashableCreationExtras,
    PrequalificationField, PrequalificationType,
};
use fim_wallet::{Wallet, WalletConfig, WalletError};
use fim_zkp::{PresentationExtras, PresentationField, PresentationKind, ZkpError};

const T_START: u64 = 1_720_000_000_000;
const T_END: u64 = 1_720_000_900_000;

struct Pool {
    oem: Wallet,
    grid_operator: Wallet,
    owner: Wallet,
    aggregator: Wallet,
    hem: PrivateKey,
}

async fn pool(max_agents: usize) -> Pool {
    let config = WalletConfig {
        max_agents,
        ..WalletConfig::default()
    };
    Pool {
        oem: Wallet::with_defaults(config.clone()).await.unwrap(),
        grid_operator: Wallet::with_defaults(config.clone()).await.unwrap(),
        owner: Wallet::with_defaults(config.clone()).await.unwrap(),
        aggregator: Wallet::with_defaults(config).await.unwrap(),
        hem: PrivateKey::from_bytes([42; 32]),
    }
}

async fn enroll(pool: &Pool, device_id: u64, give: u64, receive: u64) -> Vec<Credential> {
    let holder = pool.aggregator.public_key().clone();

    let device = pool
        .oem
        .issue_credential(
            holder.clone(),
            HashableCreationExtras::new()
                .with(DeviceSpecificationsField::DeviceId, device_id)
                .unwrap()
                .with(DeviceSpecificationsField::DeviceName, "Wallbox")
                .unwrap()
                .with(DeviceSpecificationsField::DeviceOem, "Acme")
                .unwrap()
                .with(DeviceSpecificationsField::ElectronicDescription, "11 kW")
                .unwrap(),
            CredentialKind::DeviceSpecifications,
        )
        .await
        .unwrap();
    let prequalification = pool
        .grid_operator
        .issue_credential(
            holder.clone(),
            HashableCreationExtras::new()
                .with(PrequalificationField::DeviceId, device_id)
                .unwrap()
                .with(PrequalificationField::PrequalificationType, PrequalificationType::Flex)
                .unwrap()
                .with(PrequalificationField::GridConnectionArea, "DE-Sued")
                .unwrap(),
            CredentialKind::Prequalification,
        )
        .await
        .unwrap();
    let consent = pool
        .owner
        .issue_consent_credential(
            holder,
            HashableCreationExtras::new()
                .with(ConsentField::DeviceId, device_id)
                .unwrap()
                .with(ConsentField::HemIssuer, pool.hem.public_key())
                .unwrap()
                .with(ConsentField::FlexibilityGive, give)
                .unwrap()
                .with(ConsentField::FlexibilityReceive, receive)
                .unwrap()
                .with(ConsentField::ConsentForUsage, PrequalificationType::Flex)
                .unwrap()
                .with(ConsentField::TStart, Timestamp::from_millis(T_START))
                .unwrap()
                .with(ConsentField::TEnd, Timestamp::from_millis(T_END))
                .unwrap(),
            &pool.hem,
        )
        .await
        .unwrap();

    vec![device, prequalification, consent]
}

fn timeframe() -> PresentationExtras {
    PresentationExtras::new()
        .with(PresentationField::TStart, Timestamp::from_millis(T_START))
        .with(PresentationField::TEnd, Timestamp::from_millis(T_END))
}

#[tokio::test]
async fn aggregator_collects_presents_and_archives() {
    let pool = pool(8).await;
    let aggregator = &pool.aggregator;

    // Credentials reach the aggregator as JSON and are filed by kind.
    let mut issued = enroll(&pool, 11, 7, 3).await;
    issued.extend(enroll(&pool, 12, 7, 3).await);
    for credential in &issued {
        assert!(aggregator.verify_credential(credential).await);
        let stored = aggregator
            .store_credential_json(credential.kind(), credential.to_json().unwrap())
            .await
            .unwrap();
        assert_eq!(&stored, credential);
    }
    for kind in [
        CredentialKind::DeviceSpecifications,
        CredentialKind::Prequalification,
        CredentialKind::Consent,
    ] {
        assert_eq!(aggregator.get_all_credentials(kind).await.unwrap().len(), 2);
    }

    let mut credentials = Vec::new();
    for credential in &issued {
        credentials.push(
            aggregator
                .get_credential(credential.kind(), credential.id())
                .await
                .unwrap(),
        );
    }

    let presentation = aggregator
        .create_presentation(&credentials, PresentationKind::Aggregator, &timeframe())
        .await
        .unwrap();
    let aggregate = presentation.as_aggregator().unwrap();
    assert_eq!(aggregate.agent_count(), 2);
    assert_eq!(aggregate.flexibility_give_sum().to_string(), "14");
    assert_eq!(aggregate.flexibility_receive_sum().to_string(), "6");
    assert_eq!(
        aggregate.device_specification_issuer(),
        &[pool.oem.public_key().clone(), pool.oem.public_key().clone()]
    );
    assert!(aggregator.verify_presentation(&presentation).await.unwrap());

    let key = aggregator
        .store_presentation(presentation.clone())
        .await
        .unwrap();
    assert_eq!(key, presentation.id_hash());
    assert_eq!(aggregator.get_presentation(&key).await.unwrap(), presentation);
    assert_eq!(aggregator.get_all_presentations().await.unwrap().len(), 1);

    aggregator.delete_presentation(&key).await.unwrap();
    assert!(matches!(
        aggregator.get_presentation(&key).await,
        Err(WalletError::Presentation(ZkpError::NoSuchPresentation(_)))
    ));
}

#[tokio::test]
async fn configured_agent_limit_bounds_presentations() {
    let pool = pool(1).await;
    let mut credentials = enroll(&pool, 1, 1, 1).await;
    credentials.extend(enroll(&pool, 2, 1, 1).await);
    let result = pool
        .aggregator
        .create_presentation(&credentials, PresentationKind::Aggregator, &timeframe())
        .await;
    assert!(matches!(
        result,
        Err(WalletError::Presentation(ZkpError::Validation(_)))
    ));
}

#[tokio::test]
async fn presentations_from_other_wallets_verify() {
    let pool = pool(8).await;
    let credentials = enroll(&pool, 5, 2, 2).await;
    let presentation = pool
        .aggregator
        .create_presentation(&credentials, PresentationKind::Aggregator, &timeframe())
        .await
        .unwrap();
    assert!(pool.owner.verify_presentation(&presentation).await.unwrap());
}
