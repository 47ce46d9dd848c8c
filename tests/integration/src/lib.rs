//! Shared harness for the cross-crate tests.

use lumi_core::{CredentialId, Identity, RegistryConfig, RegistryId, StageContent};
use lumi_crypto::{sign_mint, KeyPair};
use lumi_registry::CredentialRegistry;

/// A deployed registry together with the keys that control it.
pub struct Campaign {
    pub registry: CredentialRegistry,
    pub owner: KeyPair,
    pub issuer: KeyPair,
}

impl Campaign {
    /// Deploy with the given stage descriptors, stage 1 first.
    pub fn deploy(descriptors: [StageContent; 3]) -> Self {
        let owner = KeyPair::from_seed(&[0x0Au8; 32]);
        let issuer = KeyPair::from_seed(&[0x1Bu8; 32]);
        let registry = CredentialRegistry::with_bootstrap(
            RegistryConfig::default(),
            RegistryId([0x42u8; 32]),
            owner.identity(),
            issuer.identity(),
            descriptors,
        )
        .expect("fresh registry initializes");
        tracing::debug!(registry = %registry.registry_id(), "campaign deployed");
        Self {
            registry,
            owner,
            issuer,
        }
    }

    /// Deploy with locators "uriA", "uriB", "uriC".
    pub fn with_uris() -> Self {
        Self::deploy([
            StageContent::Uri("uriA".into()),
            StageContent::Uri("uriB".into()),
            StageContent::Uri("uriC".into()),
        ])
    }

    pub fn owner_id(&self) -> Identity {
        self.owner.identity()
    }

    /// Authorization from `signer` for `(to, stage)` on this registry.
    pub fn authorize(&self, signer: &KeyPair, to: &Identity, stage: u8) -> Vec<u8> {
        sign_mint(self.registry.domain(), to, stage, signer)
            .to_bytes()
            .to_vec()
    }

    /// Mint with a current-issuer authorization, panicking on failure.
    pub fn mint(&mut self, to: &Identity, stage: u8) -> CredentialId {
        let sig = self.authorize(&self.issuer, to, stage);
        self.registry
            .mint(to, stage, &sig)
            .expect("authorized mint succeeds")
    }
}

/// A participant identity derived from `seed`.
pub fn participant(seed: u8) -> Identity {
    KeyPair::from_seed(&[seed; 32]).identity()
}
