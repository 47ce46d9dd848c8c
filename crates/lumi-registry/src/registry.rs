//! The credential registry aggregate: identity↔credential mapping,
//! sequential id allocation, stage tracking and mint-order enumeration.
//!
//! All mutators take `&mut self` and validate every precondition before
//! the first write, so a failed call leaves the registry untouched.

use std::collections::{BTreeMap, HashMap};

use lumi_core::{
    Credential, CredentialId, Domain, Identity, RegistryConfig, RegistryId, Stage,
    StageDescriptor,
};

use crate::authority::SignatureAuthority;
use crate::error::{parse_stage, RegistryError};
use crate::events::{EventJournal, EventKind, RegistryEvent};
use crate::guard::{OwnershipChange, TransferGuard};
use crate::init::InitializationGate;
use crate::metadata::StageMetadataStore;

/// Soulbound staged credential registry.
#[derive(Debug, Clone)]
pub struct CredentialRegistry {
    pub(crate) config: RegistryConfig,
    pub(crate) authority: SignatureAuthority,
    pub(crate) metadata: StageMetadataStore,
    pub(crate) gate: InitializationGate,
    pub(crate) owner: Option<Identity>,
    pub(crate) credentials: BTreeMap<CredentialId, Credential>,
    pub(crate) holders: HashMap<Identity, CredentialId>,
    pub(crate) index: Vec<CredentialId>,
    pub(crate) next_id: CredentialId,
    pub(crate) journal: EventJournal,
    pub(crate) guard: TransferGuard,
}

impl CredentialRegistry {
    /// Create an uninitialized registry instance. Nothing can be minted
    /// until [`CredentialRegistry::initialize`] has run.
    pub fn new(config: RegistryConfig, registry_id: RegistryId) -> Self {
        let domain = config.domain(registry_id);
        Self {
            config,
            authority: SignatureAuthority::new(domain),
            metadata: StageMetadataStore::default(),
            gate: InitializationGate::default(),
            owner: None,
            credentials: BTreeMap::new(),
            holders: HashMap::new(),
            index: Vec::new(),
            next_id: CredentialId(0),
            journal: EventJournal::default(),
            guard: TransferGuard,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Signing domain mint authorizations must be bound to.
    pub fn domain(&self) -> &Domain {
        self.authority.domain()
    }

    pub fn registry_id(&self) -> RegistryId {
        self.authority.domain().registry
    }

    /// Administrative owner, once initialized.
    pub fn owner(&self) -> Option<&Identity> {
        self.owner.as_ref()
    }

    /// Current trusted issuer, once initialized.
    pub fn issuer(&self) -> Option<&Identity> {
        self.authority.issuer()
    }

    pub fn is_initialized(&self) -> bool {
        self.gate.is_consumed()
    }

    pub fn descriptor(&self, stage: Stage) -> Option<StageDescriptor> {
        self.metadata.descriptor(stage)
    }

    /// Issue a credential to `to` at `stage`, authorized by the issuer's
    /// signature over `(to, stage)`.
    ///
    /// Only the issuer's signature is checked. `to` never signs, so any
    /// holder of a valid authorization may submit it on behalf of `to`.
    pub fn mint(
        &mut self,
        to: &Identity,
        stage: u8,
        signature: &[u8],
    ) -> Result<CredentialId, RegistryError> {
        if self.holders.contains_key(to) {
            return Err(RegistryError::DuplicateIdentity(*to));
        }
        let stage_value = parse_stage(stage)?;
        if !self.authority.verify(to, stage, signature) {
            tracing::warn!(to = %to, stage, "mint rejected: invalid signer");
            return Err(RegistryError::InvalidSigner);
        }
        self.guard.check(&OwnershipChange::Mint { to: *to })?;

        let id = self.next_id;
        self.credentials.insert(
            id,
            Credential {
                id,
                owner: *to,
                stage: stage_value,
            },
        );
        self.holders.insert(*to, id);
        self.index.push(id);
        self.next_id = id.next();
        self.journal.record(EventKind::Minted {
            id,
            to: *to,
            stage: stage_value,
        });

        tracing::info!(id = %id, to = %to, stage = %stage_value, "credential minted");
        Ok(id)
    }

    /// Snapshot of credential `id`.
    pub fn credential(&self, id: CredentialId) -> Result<&Credential, RegistryError> {
        self.credentials
            .get(&id)
            .ok_or_else(|| RegistryError::NotFound(format!("credential {}", id)))
    }

    /// Credential held by `identity`.
    pub fn credential_of(&self, identity: &Identity) -> Result<&Credential, RegistryError> {
        let id = self.id_of(identity)?;
        self.credential(id)
    }

    pub fn stage_of(&self, id: CredentialId) -> Result<Stage, RegistryError> {
        Ok(self.credential(id)?.stage)
    }

    pub fn stage_of_owner(&self, identity: &Identity) -> Result<Stage, RegistryError> {
        Ok(self.credential_of(identity)?.stage)
    }

    /// Metadata locator for credential `id`, rendered from the descriptor
    /// of its current stage.
    pub fn resolve_uri(&self, id: CredentialId) -> Result<String, RegistryError> {
        let stage = self.stage_of(id)?;
        tracing::debug!(id = %id, stage = %stage, "resolving metadata");
        self.metadata.render(stage)
    }

    pub fn owner_of(&self, id: CredentialId) -> Result<Identity, RegistryError> {
        Ok(self.credential(id)?.owner)
    }

    /// Number of credentials held by `identity`: 0 or 1.
    pub fn balance_of(&self, identity: &Identity) -> u64 {
        u64::from(self.holders.contains_key(identity))
    }

    pub fn total_supply(&self) -> u64 {
        self.index.len() as u64
    }

    /// Credential at position `index` in mint order.
    pub fn token_by_index(&self, index: u64) -> Result<CredentialId, RegistryError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.index.get(i).copied())
            .ok_or_else(|| RegistryError::NotFound(format!("index {} out of bounds", index)))
    }

    /// Credential at position `index` among those held by `identity`.
    /// Only index 0 can exist.
    pub fn token_of_owner_by_index(
        &self,
        identity: &Identity,
        index: u64,
    ) -> Result<CredentialId, RegistryError> {
        match (index, self.holders.get(identity)) {
            (0, Some(id)) => Ok(*id),
            _ => Err(RegistryError::NotFound(format!(
                "index {} out of bounds for {}",
                index, identity
            ))),
        }
    }

    /// All credentials in mint order.
    pub fn credentials(&self) -> impl Iterator<Item = &Credential> + '_ {
        self.index.iter().filter_map(|id| self.credentials.get(id))
    }

    /// Journal of successful state changes, oldest first.
    pub fn events(&self) -> &[RegistryEvent] {
        self.journal.entries()
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    /// Direct transfer. Always rejected.
    pub fn transfer_from(
        &mut self,
        caller: &Identity,
        from: &Identity,
        to: &Identity,
        id: CredentialId,
    ) -> Result<(), RegistryError> {
        self.guard.check(&OwnershipChange::Transfer {
            caller: *caller,
            from: *from,
            to: *to,
            id,
        })
    }

    /// Transfer with receiver acknowledgement. Always rejected.
    pub fn safe_transfer_from(
        &mut self,
        caller: &Identity,
        from: &Identity,
        to: &Identity,
        id: CredentialId,
    ) -> Result<(), RegistryError> {
        self.transfer_from(caller, from, to, id)
    }

    /// Destroy a credential. Always rejected.
    pub fn burn(&mut self, caller: &Identity, id: CredentialId) -> Result<(), RegistryError> {
        self.guard.check(&OwnershipChange::Burn {
            caller: *caller,
            id,
        })
    }

    pub(crate) fn id_of(&self, identity: &Identity) -> Result<CredentialId, RegistryError> {
        self.holders
            .get(identity)
            .copied()
            .ok_or_else(|| RegistryError::NotFound(format!("no credential held by {}", identity)))
    }
}
