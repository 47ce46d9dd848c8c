//! Integration test: owner administration of a deployed registry.
//!
//! Tests batch stage updates, issuer rotation, retroactive metadata,
//! the one-shot initialization gate and signed admin envelopes.

use lumi_core::{CredentialId, Stage, StageContent};
use lumi_crypto::KeyPair;
use lumi_integration_tests::{participant, Campaign};
use lumi_registry::{AdminAction, AdminEnvelope, CredentialRegistry, EventKind, RegistryError};

// =========================================================================
// Batch updates
// =========================================================================

#[test]
fn test_batch_update_promotes_everyone_listed() {
    let mut campaign = Campaign::with_uris();
    let a = participant(1);
    let b = participant(2);
    let bystander = participant(3);
    for p in [a, b, bystander] {
        campaign.mint(&p, 1);
    }

    let owner = campaign.owner_id();
    campaign
        .registry
        .batch_update_stages_by_owner(&owner, &[a, b], 3)
        .unwrap();

    assert_eq!(campaign.registry.stage_of_owner(&a).unwrap(), Stage::Three);
    assert_eq!(campaign.registry.stage_of_owner(&b).unwrap(), Stage::Three);
    assert_eq!(campaign.registry.stage_of_owner(&bystander).unwrap(), Stage::One);
    assert_eq!(campaign.registry.resolve_uri(CredentialId(1)).unwrap(), "uriC");
}

#[test]
fn test_batch_update_with_unmapped_identity_changes_nothing() {
    let mut campaign = Campaign::with_uris();
    let a = participant(1);
    let b = participant(2);
    campaign.mint(&a, 1);
    campaign.mint(&b, 2);
    let journal_len = campaign.registry.events().len();

    let owner = campaign.owner_id();
    let err = campaign
        .registry
        .batch_update_stages_by_owner(&owner, &[a, b, participant(99)], 3)
        .unwrap_err();

    assert!(matches!(err, RegistryError::NotFound(_)));
    assert_eq!(campaign.registry.stage_of_owner(&a).unwrap(), Stage::One);
    assert_eq!(campaign.registry.stage_of_owner(&b).unwrap(), Stage::Two);
    assert_eq!(campaign.registry.events().len(), journal_len);
}

#[test]
fn test_batch_update_by_non_owner() {
    let mut campaign = Campaign::with_uris();
    let a = participant(1);
    campaign.mint(&a, 1);
    let issuer = campaign.issuer.identity();
    assert!(matches!(
        campaign.registry.batch_update_stages_by_owner(&issuer, &[a], 2),
        Err(RegistryError::Unauthorized(_))
    ));
}

// =========================================================================
// Issuer rotation
// =========================================================================

#[test]
fn test_issuer_rotation_voids_outstanding_authorizations() {
    let mut campaign = Campaign::with_uris();
    let a = participant(1);
    let b = participant(2);
    let old_issuer = KeyPair::from_seed(&[0x1Bu8; 32]);
    let outstanding = campaign.authorize(&old_issuer, &a, 1);

    let new_issuer = KeyPair::from_seed(&[0x2Cu8; 32]);
    let owner = campaign.owner_id();
    campaign
        .registry
        .set_issuer_key(&owner, new_issuer.identity())
        .unwrap();

    assert!(matches!(
        campaign.registry.mint(&a, 1, &outstanding),
        Err(RegistryError::InvalidSigner)
    ));
    let fresh = campaign.authorize(&new_issuer, &b, 2);
    assert_eq!(campaign.registry.mint(&b, 2, &fresh).unwrap(), CredentialId(0));

    let rotated = campaign
        .registry
        .events()
        .iter()
        .any(|e| matches!(e.kind, EventKind::IssuerRotated { issuer, .. } if issuer == new_issuer.identity()));
    assert!(rotated);
}

// =========================================================================
// Metadata
// =========================================================================

#[test]
fn test_descriptor_change_is_retroactive() {
    let mut campaign = Campaign::with_uris();
    let ids: Vec<_> = (1u8..=3).map(|s| campaign.mint(&participant(s), 2)).collect();
    let other = campaign.mint(&participant(4), 1);

    let owner = campaign.owner_id();
    campaign
        .registry
        .set_stage_descriptor(&owner, 2, StageContent::Uri("ipfs://stage-two-v2".into()))
        .unwrap();

    for id in ids {
        assert_eq!(
            campaign.registry.resolve_uri(id).unwrap(),
            "ipfs://stage-two-v2"
        );
    }
    assert_eq!(campaign.registry.resolve_uri(other).unwrap(), "uriA");
}

#[test]
fn test_stage_may_move_backward() {
    let mut campaign = Campaign::with_uris();
    let id = campaign.mint(&participant(1), 3);
    let owner = campaign.owner_id();
    campaign.registry.update_stage(&owner, id, 1).unwrap();
    assert_eq!(campaign.registry.resolve_uri(id).unwrap(), "uriA");
}

// =========================================================================
// Initialization gate
// =========================================================================

#[test]
fn test_initialize_is_one_shot() {
    let mut campaign = Campaign::with_uris();
    let hijacker = participant(0x66);
    let err = campaign
        .registry
        .initialize(
            hijacker,
            hijacker,
            [
                StageContent::Uri("evil".into()),
                StageContent::Uri("evil".into()),
                StageContent::Uri("evil".into()),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyInitialized));
    assert_eq!(campaign.registry.owner(), Some(&campaign.owner_id()));
    assert_eq!(campaign.registry.descriptor(Stage::One).unwrap().content, StageContent::Uri("uriA".into()));
}

#[test]
fn test_restored_registry_keeps_gate_closed() {
    let mut campaign = Campaign::with_uris();
    campaign.mint(&participant(1), 2);

    let json = serde_json::to_string(&campaign.registry.snapshot()).unwrap();
    let mut restored = CredentialRegistry::from_snapshot(serde_json::from_str(&json).unwrap()).unwrap();

    assert!(matches!(
        restored.initialize(
            participant(5),
            participant(5),
            [
                StageContent::Uri("x".into()),
                StageContent::Uri("y".into()),
                StageContent::Uri("z".into()),
            ],
        ),
        Err(RegistryError::AlreadyInitialized)
    ));
    assert_eq!(restored.stage_of(CredentialId(0)).unwrap(), Stage::Two);
}

// =========================================================================
// Signed envelopes
// =========================================================================

#[test]
fn test_envelope_round_trip_through_json() {
    let mut campaign = Campaign::with_uris();
    let a = participant(1);
    let b = participant(2);
    campaign.mint(&a, 1);
    campaign.mint(&b, 1);

    let envelope = AdminEnvelope::sign(
        campaign.registry.domain(),
        0,
        AdminAction::BatchUpdateStages {
            identities: vec![a, b],
            stage: 2,
        },
        &campaign.owner,
    )
    .unwrap();
    let wire = serde_json::to_string(&envelope).unwrap();
    let received: AdminEnvelope = serde_json::from_str(&wire).unwrap();

    assert!(received.verify(campaign.registry.domain()));
    campaign
        .registry
        .apply_admin(&received.caller, &received.action)
        .unwrap();
    assert_eq!(campaign.registry.stage_of_owner(&a).unwrap(), Stage::Two);
    assert_eq!(campaign.registry.stage_of_owner(&b).unwrap(), Stage::Two);
}

#[test]
fn test_envelope_for_other_registry_rejected() {
    let campaign = Campaign::with_uris();
    let other = CredentialRegistry::new(
        lumi_core::RegistryConfig::default(),
        lumi_core::RegistryId([0x43u8; 32]),
    );
    let envelope = AdminEnvelope::sign(
        other.domain(),
        0,
        AdminAction::SetIssuer {
            issuer: participant(7),
        },
        &campaign.owner,
    )
    .unwrap();
    assert!(!envelope.verify(campaign.registry.domain()));
}
