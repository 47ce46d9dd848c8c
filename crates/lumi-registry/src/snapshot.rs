//! Serializable form of the whole registry, used by the node to persist
//! and reload state, and the per-operation change set written after each
//! successful mutation.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use lumi_core::{Credential, CredentialId, Identity, RegistryConfig, RegistryId};
use serde::{Deserialize, Serialize};

use crate::authority::SignatureAuthority;
use crate::error::RegistryError;
use crate::events::{EventJournal, EventKind, RegistryEvent};
use crate::guard::TransferGuard;
use crate::init::InitializationGate;
use crate::metadata::StageMetadataStore;
use crate::registry::CredentialRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub config: RegistryConfig,
    pub registry_id: RegistryId,
    pub owner: Option<Identity>,
    pub issuer: Option<Identity>,
    pub descriptors: StageMetadataStore,
    pub initialized: bool,
    pub next_id: CredentialId,
    /// Credentials in mint order.
    pub credentials: Vec<Credential>,
    pub events: Vec<RegistryEvent>,
}

impl RegistrySnapshot {
    /// The whole snapshot viewed as one change set.
    pub fn as_changes(&self) -> RegistryChanges<'_> {
        RegistryChanges {
            owner: self.owner,
            issuer: self.issuer,
            descriptors: &self.descriptors,
            initialized: self.initialized,
            next_id: self.next_id,
            credentials: self.credentials.iter().collect(),
            events: &self.events,
        }
    }
}

/// Rows a mutation touched: the credentials named by its events, the
/// events themselves and the small scalar state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryChanges<'a> {
    pub owner: Option<Identity>,
    pub issuer: Option<Identity>,
    pub descriptors: &'a StageMetadataStore,
    pub initialized: bool,
    pub next_id: CredentialId,
    /// Touched credentials, ascending by id.
    pub credentials: Vec<&'a Credential>,
    pub events: &'a [RegistryEvent],
}

impl CredentialRegistry {
    /// Everything that changed since the journal held `journal_len` entries.
    ///
    /// Every credential write is journaled, so the credentials to persist
    /// are exactly those named by the new events.
    pub fn changes_since(&self, journal_len: usize) -> RegistryChanges<'_> {
        let events = self.journal.since(journal_len as u64);
        let touched: BTreeSet<CredentialId> = events
            .iter()
            .filter_map(|event| match event.kind {
                EventKind::Minted { id, .. } | EventKind::StageUpdated { id, .. } => Some(id),
                _ => None,
            })
            .collect();
        RegistryChanges {
            owner: self.owner,
            issuer: self.authority.issuer().copied(),
            descriptors: &self.metadata,
            initialized: self.gate.is_consumed(),
            next_id: self.next_id,
            credentials: touched
                .into_iter()
                .filter_map(|id| self.credentials.get(&id))
                .collect(),
            events,
        }
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            config: self.config.clone(),
            registry_id: self.registry_id(),
            owner: self.owner,
            issuer: self.authority.issuer().copied(),
            descriptors: self.metadata.clone(),
            initialized: self.gate.is_consumed(),
            next_id: self.next_id,
            credentials: self.credentials().cloned().collect(),
            events: self.journal.entries().to_vec(),
        }
    }

    /// Rebuild a registry from a snapshot, rejecting any snapshot whose
    /// contents could not have been produced by a live registry.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Result<Self, RegistryError> {
        let RegistrySnapshot {
            config,
            registry_id,
            owner,
            issuer,
            descriptors,
            initialized,
            next_id,
            credentials,
            events,
        } = snapshot;

        let fully_set = owner.is_some() && issuer.is_some() && descriptors.is_complete();
        if initialized != fully_set {
            return Err(RegistryError::CorruptSnapshot(format!(
                "initialized flag is {} but owner, issuer and descriptors disagree",
                initialized
            )));
        }
        if next_id.value() != credentials.len() as u64 {
            return Err(RegistryError::CorruptSnapshot(format!(
                "next id {} does not match {} credentials",
                next_id,
                credentials.len()
            )));
        }

        let mut by_id = BTreeMap::new();
        let mut holders = HashMap::new();
        let mut index = Vec::with_capacity(credentials.len());
        for (position, credential) in credentials.into_iter().enumerate() {
            if credential.id.value() != position as u64 {
                return Err(RegistryError::CorruptSnapshot(format!(
                    "credential {} found at position {}",
                    credential.id, position
                )));
            }
            if holders.insert(credential.owner, credential.id).is_some() {
                return Err(RegistryError::CorruptSnapshot(format!(
                    "identity {} holds more than one credential",
                    credential.owner
                )));
            }
            index.push(credential.id);
            by_id.insert(credential.id, credential);
        }

        let mut authority = SignatureAuthority::new(config.domain(registry_id));
        if let Some(issuer) = issuer {
            authority.set_issuer(issuer);
        }
        let gate = if initialized {
            InitializationGate::consumed()
        } else {
            InitializationGate::default()
        };

        tracing::debug!(
            registry = %registry_id,
            credentials = index.len(),
            events = events.len(),
            "registry restored from snapshot"
        );

        Ok(Self {
            config,
            authority,
            metadata: descriptors,
            gate,
            owner,
            credentials: by_id,
            holders,
            index,
            next_id,
            journal: EventJournal::from_entries(events),
            guard: TransferGuard,
        })
    }
}
