//! Owner-gated registry mutators.
//!
//! Each operation checks the caller against the registry owner before
//! looking at its arguments. Stage updates are not monotonic: the owner
//! may move a credential to any stage, including a lower one.

use lumi_core::{CredentialId, Domain, Identity, StageContent};
use lumi_crypto::{sign_admin, verify_admin, KeyPair, Signature};
use serde::{Deserialize, Serialize};

use crate::error::{parse_stage, RegistryError};
use crate::events::EventKind;
use crate::registry::CredentialRegistry;

/// An owner-gated call in serializable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AdminAction {
    UpdateStage {
        id: CredentialId,
        stage: u8,
    },
    BatchUpdateStages {
        identities: Vec<Identity>,
        stage: u8,
    },
    SetIssuer {
        issuer: Identity,
    },
    SetDescriptor {
        stage: u8,
        content: StageContent,
    },
}

impl AdminAction {
    /// Bytes the envelope signature commits to.
    pub fn canonical_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// A signed admin call: `caller` signs the action bound to the registry
/// domain and the current admin nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEnvelope {
    pub caller: Identity,
    pub nonce: u64,
    pub action: AdminAction,
    /// Hex-encoded Ed25519 signature.
    pub signature: String,
}

impl AdminEnvelope {
    pub fn sign(
        domain: &Domain,
        nonce: u64,
        action: AdminAction,
        caller: &KeyPair,
    ) -> serde_json::Result<Self> {
        let signature = sign_admin(domain, nonce, &action.canonical_bytes()?, caller);
        Ok(Self {
            caller: caller.identity(),
            nonce,
            action,
            signature: signature.to_hex(),
        })
    }

    /// Whether the signature was produced by `caller` for this action and
    /// nonce under `domain`.
    pub fn verify(&self, domain: &Domain) -> bool {
        let Ok(signature) = Signature::from_hex(&self.signature) else {
            return false;
        };
        let Ok(action) = self.action.canonical_bytes() else {
            return false;
        };
        verify_admin(
            domain,
            self.nonce,
            &action,
            &signature.to_bytes(),
            &self.caller,
        )
    }
}

impl CredentialRegistry {
    /// Dispatch `action` to the matching owner-gated operation.
    pub fn apply_admin(
        &mut self,
        caller: &Identity,
        action: &AdminAction,
    ) -> Result<(), RegistryError> {
        match action {
            AdminAction::UpdateStage { id, stage } => self.update_stage(caller, *id, *stage),
            AdminAction::BatchUpdateStages { identities, stage } => {
                self.batch_update_stages_by_owner(caller, identities, *stage)
            }
            AdminAction::SetIssuer { issuer } => self.set_issuer_key(caller, *issuer),
            AdminAction::SetDescriptor { stage, content } => {
                self.set_stage_descriptor(caller, *stage, content.clone())
            }
        }
    }

    fn ensure_owner(&self, caller: &Identity) -> Result<(), RegistryError> {
        match self.owner {
            Some(owner) if owner == *caller => Ok(()),
            _ => {
                tracing::warn!(caller = %caller, "admin call rejected: not owner");
                Err(RegistryError::Unauthorized(*caller))
            }
        }
    }

    /// Overwrite the stage of credential `id`.
    pub fn update_stage(
        &mut self,
        caller: &Identity,
        id: CredentialId,
        stage: u8,
    ) -> Result<(), RegistryError> {
        self.ensure_owner(caller)?;
        let stage = parse_stage(stage)?;
        let credential = self
            .credentials
            .get_mut(&id)
            .ok_or_else(|| RegistryError::NotFound(format!("credential {}", id)))?;

        let from = credential.stage;
        credential.stage = stage;
        self.journal.record(EventKind::StageUpdated { id, from, to: stage });

        tracing::info!(id = %id, from = %from, to = %stage, "stage updated");
        Ok(())
    }

    /// Set every listed identity's credential to `stage`, in list order.
    /// If any identity holds no credential nothing is changed.
    pub fn batch_update_stages_by_owner(
        &mut self,
        caller: &Identity,
        identities: &[Identity],
        stage: u8,
    ) -> Result<(), RegistryError> {
        self.ensure_owner(caller)?;
        let stage = parse_stage(stage)?;
        let ids = identities
            .iter()
            .map(|identity| self.id_of(identity))
            .collect::<Result<Vec<_>, _>>()?;

        for id in &ids {
            if let Some(credential) = self.credentials.get_mut(id) {
                let from = credential.stage;
                credential.stage = stage;
                self.journal.record(EventKind::StageUpdated {
                    id: *id,
                    from,
                    to: stage,
                });
            }
        }

        tracing::info!(count = ids.len(), to = %stage, "batch stage update applied");
        Ok(())
    }

    /// Replace the trusted issuer. Unused authorizations from the previous
    /// issuer stop verifying immediately.
    pub fn set_issuer_key(
        &mut self,
        caller: &Identity,
        issuer: Identity,
    ) -> Result<(), RegistryError> {
        self.ensure_owner(caller)?;
        let previous = self.authority.issuer().copied();
        self.authority.set_issuer(issuer);
        self.journal
            .record(EventKind::IssuerRotated { previous, issuer });

        tracing::info!(issuer = %issuer, "issuer rotated");
        Ok(())
    }

    /// Replace the descriptor of `stage`. Every credential currently at
    /// that stage resolves to the new content from now on.
    pub fn set_stage_descriptor(
        &mut self,
        caller: &Identity,
        stage: u8,
        content: StageContent,
    ) -> Result<(), RegistryError> {
        self.ensure_owner(caller)?;
        let stage = parse_stage(stage)?;
        self.metadata.set(stage, content.clone());
        self.journal
            .record(EventKind::DescriptorUpdated { stage, content });

        tracing::info!(stage = %stage, "stage descriptor updated");
        Ok(())
    }
}
