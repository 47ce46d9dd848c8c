//! The Lumi node orchestrator.
//!
//! Owns the registry and its storage. HTTP handlers never touch the
//! registry directly: they send [`NodeCommand`]s to the event loop, which
//! applies them one at a time. Registry mutators change nothing when they
//! fail, so a command is applied in place and only the rows it touched are
//! written. If that write fails the last committed state is reloaded.

use anyhow::Result;
use lumi_core::{Identity, RegistryId};
use lumi_registry::{AdminEnvelope, CredentialRegistry, RegistryError};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::commands::{
    CommandError, CredentialResponse, MintResponse, NodeCommand, NonceResponse, StatusResponse,
    UriResponse,
};
use crate::config::LumiConfig;
use crate::state::NodeState;
use crate::storage::Storage;

/// The Lumi node: one registry, its storage and the API event loop.
pub struct LumiNode {
    /// Node configuration.
    config: LumiConfig,
    /// Live registry state.
    registry: CredentialRegistry,
    /// Nonce the next admin envelope must carry.
    admin_nonce: u64,
    /// Persistent storage.
    storage: Storage,
    /// Receives commands from the HTTP API.
    command_rx: Option<mpsc::Receiver<NodeCommand>>,
}

impl LumiNode {
    /// Open storage and restore the registry, or create and persist a fresh
    /// one with a random registry id.
    pub fn new(config: LumiConfig) -> Result<Self> {
        let storage = Storage::open(&config.storage.data_dir)?;
        tracing::info!(path = %config.storage.data_dir.display(), "storage initialized");

        let (registry, admin_nonce) = match storage.load_snapshot()? {
            Some((snapshot, nonce)) => {
                let registry = CredentialRegistry::from_snapshot(snapshot)?;
                if registry.config() != &config.registry {
                    tracing::warn!("stored registry config differs from [registry]; keeping stored");
                }
                tracing::info!(
                    registry = %registry.registry_id(),
                    supply = registry.total_supply(),
                    "registry restored"
                );
                (registry, nonce)
            }
            None => {
                let registry_id = RegistryId(rand::random::<[u8; 32]>());
                let registry = CredentialRegistry::new(config.registry.clone(), registry_id);
                storage.save_snapshot(&registry.snapshot(), 0)?;
                tracing::info!(registry = %registry_id, "created fresh registry");
                (registry, 0)
            }
        };

        let mut node = Self {
            config,
            registry,
            admin_nonce,
            storage,
            command_rx: None,
        };

        if !node.registry.is_initialized() {
            if let Some(bootstrap) = node.config.bootstrap.clone() {
                node.initialize(bootstrap.owner, bootstrap.issuer, bootstrap.descriptors)?;
                tracing::info!("registry bootstrapped from config");
            }
        }

        Ok(node)
    }

    /// Create the command channel and the shared state handed to the API.
    pub fn connect(&mut self) -> Arc<NodeState> {
        let (command_tx, command_rx) = mpsc::channel::<NodeCommand>(256);
        self.command_rx = Some(command_rx);
        Arc::new(NodeState::new(command_tx))
    }

    /// Start the HTTP API server in a background task.
    pub async fn start(&mut self) -> Result<()> {
        tracing::info!("starting Lumi node");

        let node_state = self.connect();
        let api_addr: SocketAddr = self.config.api_addr().parse()?;
        if exposes_open_initialize(self.registry.is_initialized(), &api_addr) {
            tracing::warn!(
                addr = %api_addr,
                "registry is uninitialized and the API is reachable off-host; \
                 the first POST /api/v1/initialize becomes owner"
            );
        }
        tokio::spawn(async move {
            if let Err(e) = crate::api::start_api_server(api_addr, node_state).await {
                tracing::error!(error = %e, "HTTP API server error");
            }
        });

        Ok(())
    }

    /// Run the node's main event loop until the API side hangs up.
    pub async fn run(&mut self) -> Result<()> {
        let mut command_rx = self
            .command_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;

        tracing::info!("entering main event loop");

        while let Some(cmd) = command_rx.recv().await {
            self.handle_api_command(cmd);
        }

        tracing::info!("API command channel closed");
        Ok(())
    }

    /// Gracefully shut down the node.
    pub async fn shutdown(self) -> Result<()> {
        tracing::info!("shutting down Lumi node");
        drop(self.storage);
        tracing::info!("storage closed");
        Ok(())
    }

    pub fn registry(&self) -> &CredentialRegistry {
        &self.registry
    }

    /// Apply `op` to the registry and persist what it changed along with
    /// `admin_nonce`.
    fn commit<T>(
        &mut self,
        admin_nonce: u64,
        op: impl FnOnce(&mut CredentialRegistry) -> Result<T, RegistryError>,
    ) -> Result<T, CommandError> {
        let mark = self.registry.journal().len();
        let value = op(&mut self.registry)?;
        let saved = self
            .storage
            .save_changes(&self.registry.changes_since(mark), admin_nonce);
        if let Err(e) = saved {
            tracing::error!(error = %e, "failed to persist registry changes");
            self.reload_committed();
            return Err(CommandError::Storage(e.to_string()));
        }
        self.admin_nonce = admin_nonce;
        Ok(value)
    }

    /// Replace the in-memory registry with what storage last committed.
    fn reload_committed(&mut self) {
        let restored = self.storage.load_snapshot().and_then(|stored| {
            let (snapshot, nonce) =
                stored.ok_or_else(|| anyhow::anyhow!("no stored registry"))?;
            Ok((CredentialRegistry::from_snapshot(snapshot)?, nonce))
        });
        match restored {
            Ok((registry, nonce)) => {
                self.registry = registry;
                self.admin_nonce = nonce;
                tracing::warn!("registry reloaded from storage");
            }
            Err(e) => tracing::error!(error = %e, "failed to reload registry from storage"),
        }
    }

    fn initialize(
        &mut self,
        owner: Identity,
        issuer: Identity,
        descriptors: [lumi_core::StageContent; 3],
    ) -> Result<StatusResponse, CommandError> {
        self.commit(self.admin_nonce, |r| r.initialize(owner, issuer, descriptors))?;
        Ok(self.status())
    }

    fn admin(&mut self, envelope: AdminEnvelope) -> Result<NonceResponse, CommandError> {
        if envelope.nonce != self.admin_nonce {
            tracing::warn!(
                caller = %envelope.caller,
                expected = self.admin_nonce,
                got = envelope.nonce,
                "admin call rejected: stale nonce"
            );
            return Err(RegistryError::Unauthorized(envelope.caller).into());
        }
        if !envelope.verify(self.registry.domain()) {
            tracing::warn!(caller = %envelope.caller, "admin call rejected: bad signature");
            return Err(RegistryError::Unauthorized(envelope.caller).into());
        }

        let nonce = self.admin_nonce + 1;
        self.commit(nonce, |r| r.apply_admin(&envelope.caller, &envelope.action))?;
        Ok(NonceResponse { nonce })
    }

    fn status(&self) -> StatusResponse {
        let config = self.registry.config();
        StatusResponse {
            name: config.name.clone(),
            symbol: config.symbol.clone(),
            version: config.version.clone(),
            context_id: config.context_id,
            registry_id: self.registry.registry_id().to_hex(),
            initialized: self.registry.is_initialized(),
            owner: self.registry.owner().copied(),
            issuer: self.registry.issuer().copied(),
            total_supply: self.registry.total_supply(),
        }
    }

    /// Handle a command from the HTTP API.
    fn handle_api_command(&mut self, cmd: NodeCommand) {
        match cmd {
            NodeCommand::Status { reply } => {
                let _ = reply.send(Ok(self.status()));
            }
            NodeCommand::Initialize {
                owner,
                issuer,
                descriptors,
                reply,
            } => {
                let _ = reply.send(self.initialize(owner, issuer, descriptors));
            }
            NodeCommand::Mint {
                to,
                stage,
                signature,
                reply,
            } => {
                let nonce = self.admin_nonce;
                let result = self
                    .commit(nonce, |r| r.mint(&to, stage, &signature))
                    .map(|id| MintResponse { id });
                let _ = reply.send(result);
            }
            NodeCommand::GetCredential { id, reply } => {
                let result = self
                    .registry
                    .credential(id)
                    .map(CredentialResponse::from)
                    .map_err(CommandError::from);
                let _ = reply.send(result);
            }
            NodeCommand::GetCredentialOf { identity, reply } => {
                let result = self
                    .registry
                    .credential_of(&identity)
                    .map(CredentialResponse::from)
                    .map_err(CommandError::from);
                let _ = reply.send(result);
            }
            NodeCommand::ResolveUri { id, reply } => {
                let result = self
                    .registry
                    .resolve_uri(id)
                    .map(|uri| UriResponse { id, uri })
                    .map_err(CommandError::from);
                let _ = reply.send(result);
            }
            NodeCommand::Transfer {
                id,
                from,
                to,
                reply,
            } => {
                let result = self
                    .registry
                    .transfer_from(&from, &from, &to, id)
                    .map_err(CommandError::from);
                let _ = reply.send(result);
            }
            NodeCommand::AdminNonce { reply } => {
                let _ = reply.send(Ok(NonceResponse {
                    nonce: self.admin_nonce,
                }));
            }
            NodeCommand::Admin { envelope, reply } => {
                let _ = reply.send(self.admin(envelope));
            }
            NodeCommand::Events { since, reply } => {
                let events = self.registry.journal().since(since).to_vec();
                let _ = reply.send(Ok(events));
            }
        }
    }
}

/// An uninitialized registry served on a non-loopback address lets any
/// remote caller claim ownership.
fn exposes_open_initialize(initialized: bool, addr: &SocketAddr) -> bool {
    !initialized && !addr.ip().is_loopback()
}
