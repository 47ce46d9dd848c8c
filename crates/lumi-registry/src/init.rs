use lumi_core::{Identity, RegistryConfig, RegistryId, StageContent};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::events::EventKind;
use crate::metadata::StageMetadataStore;
use crate::registry::CredentialRegistry;

/// One-shot bootstrap flag. The flag is part of the persisted state, so a
/// registry reloaded from storage stays consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializationGate {
    consumed: bool,
}

impl InitializationGate {
    pub(crate) fn consumed() -> Self {
        Self { consumed: true }
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    fn ensure_open(&self) -> Result<(), RegistryError> {
        if self.consumed {
            return Err(RegistryError::AlreadyInitialized);
        }
        Ok(())
    }
}

impl CredentialRegistry {
    /// Construct and initialize in one step.
    pub fn with_bootstrap(
        config: RegistryConfig,
        registry_id: RegistryId,
        owner: Identity,
        issuer: Identity,
        descriptors: [StageContent; 3],
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new(config, registry_id);
        registry.initialize(owner, issuer, descriptors)?;
        Ok(registry)
    }

    /// Set the owner, the issuer and the three stage descriptors (stage 1
    /// first). Fails `AlreadyInitialized` on every call after the first.
    pub fn initialize(
        &mut self,
        owner: Identity,
        issuer: Identity,
        descriptors: [StageContent; 3],
    ) -> Result<(), RegistryError> {
        self.gate.ensure_open()?;

        self.owner = Some(owner);
        self.authority.set_issuer(issuer);
        self.metadata = StageMetadataStore::with_contents(descriptors);
        self.gate = InitializationGate::consumed();
        self.journal.record(EventKind::Initialized { owner, issuer });

        tracing::info!(
            owner = %owner,
            issuer = %issuer,
            registry = %self.registry_id(),
            "registry initialized"
        );
        Ok(())
    }
}
