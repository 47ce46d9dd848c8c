//! Commands dispatched from the HTTP API to the node event loop.

use lumi_core::{Credential, CredentialId, Identity, StageContent};
use lumi_registry::{AdminEnvelope, RegistryError, RegistryEvent};
use serde::Serialize;
use tokio::sync::oneshot;

/// Reply channel carried by every command.
pub type Reply<T> = oneshot::Sender<Result<T, CommandError>>;

/// Why a command failed.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl CommandError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Registry(e) => e.kind(),
            Self::BadRequest(_) => "BadRequest",
            Self::Storage(_) => "Storage",
        }
    }
}

/// A command sent from the HTTP API to the node's main event loop.
pub enum NodeCommand {
    /// Summary of the registry.
    Status { reply: Reply<StatusResponse> },
    /// One-shot initialization.
    Initialize {
        owner: Identity,
        issuer: Identity,
        descriptors: [StageContent; 3],
        reply: Reply<StatusResponse>,
    },
    /// Mint with an issuer authorization.
    Mint {
        to: Identity,
        stage: u8,
        signature: Vec<u8>,
        reply: Reply<MintResponse>,
    },
    /// Look up a credential by id.
    GetCredential {
        id: CredentialId,
        reply: Reply<CredentialResponse>,
    },
    /// Look up the credential held by an identity.
    GetCredentialOf {
        identity: Identity,
        reply: Reply<CredentialResponse>,
    },
    /// Resolve the metadata locator of a credential.
    ResolveUri {
        id: CredentialId,
        reply: Reply<UriResponse>,
    },
    /// Transfer attempt. Never succeeds.
    Transfer {
        id: CredentialId,
        from: Identity,
        to: Identity,
        reply: Reply<()>,
    },
    /// Current admin nonce.
    AdminNonce { reply: Reply<NonceResponse> },
    /// Signed owner call.
    Admin {
        envelope: AdminEnvelope,
        reply: Reply<NonceResponse>,
    },
    /// Journal entries from `since` on.
    Events {
        since: u64,
        reply: Reply<Vec<RegistryEvent>>,
    },
}

/// Registry summary.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub name: String,
    pub symbol: String,
    pub version: String,
    pub context_id: u64,
    pub registry_id: String,
    pub initialized: bool,
    pub owner: Option<Identity>,
    pub issuer: Option<Identity>,
    pub total_supply: u64,
}

/// Response after a successful mint.
#[derive(Debug, Clone, Serialize)]
pub struct MintResponse {
    pub id: CredentialId,
}

/// A credential record.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialResponse {
    pub id: CredentialId,
    pub owner: Identity,
    pub stage: u8,
}

impl From<&Credential> for CredentialResponse {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id,
            owner: credential.owner,
            stage: credential.stage.as_u8(),
        }
    }
}

/// Resolved metadata locator.
#[derive(Debug, Clone, Serialize)]
pub struct UriResponse {
    pub id: CredentialId,
    pub uri: String,
}

/// Admin nonce the next admin call must carry.
#[derive(Debug, Clone, Serialize)]
pub struct NonceResponse {
    pub nonce: u64,
}
