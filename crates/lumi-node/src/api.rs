//! HTTP API server for the Lumi node.
//!
//! Provides REST endpoints for registry status, initialization, minting,
//! credential lookup, metadata resolution, signed admin calls and the
//! event journal.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lumi_core::{CredentialId, Identity, StageContent};
use lumi_registry::{AdminEnvelope, RegistryError, RegistryEvent};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::commands::{
    CommandError, CredentialResponse, MintResponse, NodeCommand, NonceResponse, StatusResponse,
    UriResponse,
};
use crate::state::NodeState;

// --- Request / response types ---

#[derive(Deserialize)]
pub struct InitializeRequest {
    pub owner: Identity,
    pub issuer: Identity,
    pub descriptors: [StageContent; 3],
}

#[derive(Deserialize)]
pub struct MintRequest {
    pub to: Identity,
    pub stage: u8,
    /// Hex-encoded issuer signature.
    pub signature: String,
}

#[derive(Deserialize)]
pub struct TransferRequest {
    pub from: Identity,
    pub to: Identity,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub since: u64,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn status_for(error: &CommandError) -> StatusCode {
    match error {
        CommandError::Registry(e) => match e {
            RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::Unauthorized(_) | RegistryError::InvalidSigner => StatusCode::FORBIDDEN,
            RegistryError::TransferDisallowed
            | RegistryError::DuplicateIdentity(_)
            | RegistryError::AlreadyInitialized => StatusCode::CONFLICT,
            RegistryError::InvalidStage(_) => StatusCode::BAD_REQUEST,
            RegistryError::CorruptSnapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        CommandError::BadRequest(_) => StatusCode::BAD_REQUEST,
        CommandError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_reply(error: CommandError) -> (StatusCode, Json<ErrorResponse>) {
    (
        status_for(&error),
        Json(ErrorResponse {
            error: error.to_string(),
            kind: error.kind().into(),
        }),
    )
}

fn internal_error(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.into(),
            kind: "Internal".into(),
        }),
    )
}

fn parse_id(raw: &str) -> Result<CredentialId, (StatusCode, Json<ErrorResponse>)> {
    raw.parse::<u64>()
        .map(CredentialId)
        .map_err(|_| error_reply(CommandError::BadRequest(format!("invalid credential id '{}'", raw))))
}

// --- Handlers ---

async fn handle_health(State(state): State<Arc<NodeState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

async fn handle_status(State(state): State<Arc<NodeState>>) -> ApiResult<StatusResponse> {
    let (reply, reply_rx) = oneshot::channel();
    send_command_and_await(&state, NodeCommand::Status { reply }, reply_rx).await
}

async fn handle_initialize(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<InitializeRequest>,
) -> ApiResult<StatusResponse> {
    let (reply, reply_rx) = oneshot::channel();
    let cmd = NodeCommand::Initialize {
        owner: req.owner,
        issuer: req.issuer,
        descriptors: req.descriptors,
        reply,
    };
    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_mint(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<MintRequest>,
) -> ApiResult<MintResponse> {
    let hex_sig = req.signature.strip_prefix("0x").unwrap_or(&req.signature);
    let signature = hex::decode(hex_sig).map_err(|e| {
        error_reply(CommandError::BadRequest(format!("signature is not hex: {}", e)))
    })?;

    let (reply, reply_rx) = oneshot::channel();
    let cmd = NodeCommand::Mint {
        to: req.to,
        stage: req.stage,
        signature,
        reply,
    };
    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_get_credential(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<String>,
) -> ApiResult<CredentialResponse> {
    let id = parse_id(&id)?;
    let (reply, reply_rx) = oneshot::channel();
    send_command_and_await(&state, NodeCommand::GetCredential { id, reply }, reply_rx).await
}

async fn handle_resolve_uri(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<String>,
) -> ApiResult<UriResponse> {
    let id = parse_id(&id)?;
    let (reply, reply_rx) = oneshot::channel();
    send_command_and_await(&state, NodeCommand::ResolveUri { id, reply }, reply_rx).await
}

async fn handle_credential_of(
    State(state): State<Arc<NodeState>>,
    Path(identity): Path<String>,
) -> ApiResult<CredentialResponse> {
    let identity = Identity::from_hex(&identity)
        .map_err(|e| error_reply(CommandError::BadRequest(e.to_string())))?;
    let (reply, reply_rx) = oneshot::channel();
    send_command_and_await(
        &state,
        NodeCommand::GetCredentialOf { identity, reply },
        reply_rx,
    )
    .await
}

async fn handle_transfer(
    State(state): State<Arc<NodeState>>,
    Path(id): Path<String>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let (reply, reply_rx) = oneshot::channel();
    let cmd = NodeCommand::Transfer {
        id,
        from: req.from,
        to: req.to,
        reply,
    };
    send_command_and_await(&state, cmd, reply_rx).await
}

async fn handle_admin_nonce(State(state): State<Arc<NodeState>>) -> ApiResult<NonceResponse> {
    let (reply, reply_rx) = oneshot::channel();
    send_command_and_await(&state, NodeCommand::AdminNonce { reply }, reply_rx).await
}

async fn handle_admin(
    State(state): State<Arc<NodeState>>,
    Json(envelope): Json<AdminEnvelope>,
) -> ApiResult<NonceResponse> {
    let (reply, reply_rx) = oneshot::channel();
    send_command_and_await(&state, NodeCommand::Admin { envelope, reply }, reply_rx).await
}

async fn handle_events(
    State(state): State<Arc<NodeState>>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<Vec<RegistryEvent>> {
    let (reply, reply_rx) = oneshot::channel();
    let cmd = NodeCommand::Events {
        since: query.since,
        reply,
    };
    send_command_and_await(&state, cmd, reply_rx).await
}

/// Helper to send a command and await the reply.
async fn send_command_and_await<T: Serialize>(
    state: &Arc<NodeState>,
    cmd: NodeCommand,
    reply_rx: oneshot::Receiver<Result<T, CommandError>>,
) -> ApiResult<T> {
    state
        .command_tx
        .send(cmd)
        .await
        .map_err(|_| internal_error("node event loop not running"))?;

    match reply_rx.await {
        Ok(Ok(resp)) => Ok(Json(resp)),
        Ok(Err(e)) => Err(error_reply(e)),
        Err(_) => Err(internal_error("event loop dropped the reply channel")),
    }
}

// --- Server ---

pub fn build_router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/initialize", post(handle_initialize))
        .route("/api/v1/credentials/mint", post(handle_mint))
        .route("/api/v1/credentials/{id}", get(handle_get_credential))
        .route("/api/v1/credentials/{id}/uri", get(handle_resolve_uri))
        .route("/api/v1/credentials/{id}/transfer", post(handle_transfer))
        .route("/api/v1/owners/{identity}", get(handle_credential_of))
        .route("/api/v1/admin/nonce", get(handle_admin_nonce))
        .route("/api/v1/admin", post(handle_admin))
        .route("/api/v1/events", get(handle_events))
        .with_state(state)
}

pub async fn start_api_server(
    listen_addr: SocketAddr,
    state: Arc<NodeState>,
) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
