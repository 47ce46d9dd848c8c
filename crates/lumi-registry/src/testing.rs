//! Shared fixtures for unit tests.

use lumi_core::{CredentialId, Identity, RegistryConfig, RegistryId, StageContent};
use lumi_crypto::{sign_mint, KeyPair};

use crate::registry::CredentialRegistry;

/// An initialized registry with deterministic owner and issuer keys and
/// descriptors "uriA", "uriB", "uriC".
pub(crate) struct Fixture {
    pub registry: CredentialRegistry,
    pub owner: KeyPair,
    pub issuer: KeyPair,
}

impl Fixture {
    pub fn new() -> Self {
        let owner = KeyPair::from_seed(&[1u8; 32]);
        let issuer = KeyPair::from_seed(&[2u8; 32]);
        let mut registry =
            CredentialRegistry::new(RegistryConfig::default(), RegistryId([0xAAu8; 32]));
        registry
            .initialize(
                owner.identity(),
                issuer.identity(),
                [
                    StageContent::Uri("uriA".into()),
                    StageContent::Uri("uriB".into()),
                    StageContent::Uri("uriC".into()),
                ],
            )
            .unwrap();
        Self {
            registry,
            owner,
            issuer,
        }
    }

    pub fn owner_id(&self) -> Identity {
        self.owner.identity()
    }

    /// Issuer authorization for `(to, stage)`.
    pub fn sign(&self, to: &Identity, stage: u8) -> Vec<u8> {
        sign_mint(self.registry.domain(), to, stage, &self.issuer)
            .to_bytes()
            .to_vec()
    }

    pub fn mint(&mut self, to: &Identity, stage: u8) -> CredentialId {
        let sig = self.sign(to, stage);
        self.registry.mint(to, stage, &sig).unwrap()
    }
}

/// Deterministic holder identity.
pub(crate) fn holder(seed: u8) -> Identity {
    KeyPair::from_seed(&[seed; 32]).identity()
}
