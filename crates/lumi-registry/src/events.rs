use chrono::{DateTime, Utc};
use lumi_core::{CredentialId, Identity, Stage, StageContent};
use serde::{Deserialize, Serialize};

/// A successful state change recorded by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Initialized {
        owner: Identity,
        issuer: Identity,
    },
    Minted {
        id: CredentialId,
        to: Identity,
        stage: Stage,
    },
    StageUpdated {
        id: CredentialId,
        from: Stage,
        to: Stage,
    },
    IssuerRotated {
        previous: Option<Identity>,
        issuer: Identity,
    },
    DescriptorUpdated {
        stage: Stage,
        content: StageContent,
    },
}

/// Journal entry: sequence number, timestamp and the change itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEvent {
    pub seq: u64,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Append-only journal of registry events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventJournal {
    entries: Vec<RegistryEvent>,
}

impl EventJournal {
    pub fn from_entries(entries: Vec<RegistryEvent>) -> Self {
        Self { entries }
    }

    /// Append `kind` stamped with the next sequence number.
    pub fn record(&mut self, kind: EventKind) {
        let seq = self.entries.len() as u64;
        self.entries.push(RegistryEvent {
            seq,
            at: Utc::now(),
            kind,
        });
    }

    pub fn entries(&self) -> &[RegistryEvent] {
        &self.entries
    }

    /// Entries with `seq >= from`.
    pub fn since(&self, from: u64) -> &[RegistryEvent] {
        let start = (from as usize).min(self.entries.len());
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
