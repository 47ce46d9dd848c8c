//! Integration test: credential lifecycle across lumi-core, lumi-crypto and
//! lumi-registry.
//!
//! Covers issuer-signed minting, stage progression, metadata resolution and
//! the soulbound transfer lock.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lumi_core::{CredentialId, Stage, StageContent};
use lumi_crypto::KeyPair;
use lumi_integration_tests::{participant, Campaign};
use lumi_registry::{EventKind, RegistryError, INLINE_JSON_PREFIX};

// =========================================================================
// End-to-end scenarios
// =========================================================================

#[test]
fn test_mint_progress_and_duplicate() {
    let mut campaign = Campaign::with_uris();
    let w = participant(0x57);

    let sig = campaign.authorize(&campaign.issuer, &w, 1);
    let id = campaign.registry.mint(&w, 1, &sig).expect("first mint");
    assert_eq!(id, CredentialId(0));
    assert_eq!(campaign.registry.resolve_uri(id).unwrap(), "uriA");

    let owner = campaign.owner_id();
    campaign.registry.update_stage(&owner, id, 2).unwrap();
    assert_eq!(campaign.registry.resolve_uri(id).unwrap(), "uriB");

    // Replaying the original authorization hits the uniqueness rule.
    let err = campaign.registry.mint(&w, 1, &sig).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateIdentity(who) if who == w));
    assert_eq!(campaign.registry.total_supply(), 1);
}

#[test]
fn test_inline_descriptor_resolves_to_data_uri() {
    let mut campaign = Campaign::with_uris();
    let id = campaign.mint(&participant(0x57), 1);

    let owner = campaign.owner_id();
    campaign
        .registry
        .set_stage_descriptor(&owner, 1, StageContent::Inline(r#"{"a":1}"#.into()))
        .unwrap();

    let expected = format!("{}{}", INLINE_JSON_PREFIX, STANDARD.encode(r#"{"a":1}"#));
    assert_eq!(campaign.registry.resolve_uri(id).unwrap(), expected);
    assert_eq!(expected, "data:application/json;base64,eyJhIjoxfQ==");
}

#[test]
fn test_three_stage_campaign_with_inline_metadata() {
    let documents = [
        r#"{"name":"Lumi Seed","attributes":[{"trait_type":"Stage","value":1}]}"#,
        r#"{"name":"Lumi Sprout","attributes":[{"trait_type":"Stage","value":2}]}"#,
        r#"{"name":"Lumi Bloom","attributes":[{"trait_type":"Stage","value":3}]}"#,
    ];
    let mut campaign = Campaign::deploy(documents.map(|d| StageContent::Inline(d.into())));
    let participants: Vec<_> = (1u8..=4).map(participant).collect();
    for p in &participants {
        campaign.mint(p, 1);
    }

    let owner = campaign.owner_id();
    campaign
        .registry
        .batch_update_stages_by_owner(&owner, &participants[..2], 2)
        .unwrap();
    campaign
        .registry
        .update_stage(&owner, CredentialId(0), 3)
        .unwrap();

    let stages: Vec<Stage> = campaign.registry.credentials().map(|c| c.stage).collect();
    assert_eq!(stages, vec![Stage::Three, Stage::Two, Stage::One, Stage::One]);

    for credential in campaign.registry.credentials() {
        let uri = campaign.registry.resolve_uri(credential.id).unwrap();
        let encoded = uri.strip_prefix(INLINE_JSON_PREFIX).expect("data uri");
        let decoded = STANDARD.decode(encoded).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(json["attributes"][0]["value"], credential.stage.as_u8());
    }
}

// =========================================================================
// Mint authorization
// =========================================================================

#[test]
fn test_signature_bound_to_recipient_and_stage() {
    let mut campaign = Campaign::with_uris();
    let a = participant(1);
    let b = participant(2);
    let sig = campaign.authorize(&campaign.issuer, &a, 2);

    for (to, stage) in [(b, 2u8), (b, 1), (a, 1), (a, 3)] {
        assert!(matches!(
            campaign.registry.mint(&to, stage, &sig),
            Err(RegistryError::InvalidSigner)
        ));
    }
    assert_eq!(campaign.registry.total_supply(), 0);
    assert!(campaign.registry.mint(&a, 2, &sig).is_ok());
}

#[test]
fn test_stage_domain_enforced() {
    let mut campaign = Campaign::with_uris();
    let a = participant(1);
    for stage in [0u8, 4, 200] {
        let sig = campaign.authorize(&campaign.issuer, &a, stage);
        assert!(matches!(
            campaign.registry.mint(&a, stage, &sig),
            Err(RegistryError::InvalidStage(s)) if s == stage
        ));
    }
    assert_eq!(campaign.registry.balance_of(&a), 0);

    let id = campaign.mint(&a, 1);
    let owner = campaign.owner_id();
    assert!(matches!(
        campaign.registry.update_stage(&owner, id, 0),
        Err(RegistryError::InvalidStage(0))
    ));
    assert_eq!(campaign.registry.stage_of(id).unwrap(), Stage::One);
}

#[test]
fn test_authorization_from_outsider_rejected() {
    let mut campaign = Campaign::with_uris();
    let outsider = KeyPair::from_seed(&[0xEEu8; 32]);
    let a = participant(1);
    let sig = campaign.authorize(&outsider, &a, 1);
    assert!(matches!(
        campaign.registry.mint(&a, 1, &sig),
        Err(RegistryError::InvalidSigner)
    ));
    assert!(matches!(
        campaign.registry.mint(&a, 1, b"short"),
        Err(RegistryError::InvalidSigner)
    ));
}

// =========================================================================
// Soulbound lock
// =========================================================================

#[test]
fn test_no_ownership_change_ever_succeeds() {
    let mut campaign = Campaign::with_uris();
    let a = participant(1);
    let b = participant(2);
    let id = campaign.mint(&a, 1);
    let owner = campaign.owner_id();

    // Neither the holder, a stranger nor the registry owner can move it.
    for caller in [a, b, owner] {
        assert!(matches!(
            campaign.registry.transfer_from(&caller, &a, &b, id),
            Err(RegistryError::TransferDisallowed)
        ));
        assert!(matches!(
            campaign.registry.safe_transfer_from(&caller, &a, &b, id),
            Err(RegistryError::TransferDisallowed)
        ));
        assert!(matches!(
            campaign.registry.burn(&caller, id),
            Err(RegistryError::TransferDisallowed)
        ));
    }

    assert_eq!(campaign.registry.owner_of(id).unwrap(), a);
    assert_eq!(campaign.registry.balance_of(&a), 1);
    assert_eq!(campaign.registry.balance_of(&b), 0);
    assert_eq!(campaign.registry.token_of_owner_by_index(&a, 0).unwrap(), id);
}

// =========================================================================
// Enumeration and journal
// =========================================================================

#[test]
fn test_enumeration_follows_mint_order() {
    let mut campaign = Campaign::with_uris();
    let holders: Vec<_> = [9u8, 3, 7].into_iter().map(participant).collect();
    for (i, h) in holders.iter().enumerate() {
        assert_eq!(campaign.mint(h, 1), CredentialId(i as u64));
    }
    for (i, h) in holders.iter().enumerate() {
        let id = campaign.registry.token_by_index(i as u64).unwrap();
        assert_eq!(campaign.registry.owner_of(id).unwrap(), *h);
    }
    assert!(matches!(
        campaign.registry.token_by_index(3),
        Err(RegistryError::NotFound(_))
    ));
}

#[test]
fn test_journal_records_successes_only() {
    let mut campaign = Campaign::with_uris();
    let a = participant(1);
    campaign.mint(&a, 1);
    let _ = campaign.registry.mint(&a, 1, &[]);
    let _ = campaign.registry.update_stage(&a, CredentialId(0), 2);

    let kinds: Vec<_> = campaign
        .registry
        .events()
        .iter()
        .map(|e| e.kind.clone())
        .collect();
    assert_eq!(kinds.len(), 2);
    assert!(matches!(kinds[0], EventKind::Initialized { .. }));
    assert!(matches!(kinds[1], EventKind::Minted { to, .. } if to == a));
}
