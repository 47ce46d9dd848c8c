pub mod admin;
pub mod keygen;
pub mod mint;
pub mod resolve;
pub mod show;
pub mod sign_mint;
pub mod status;

use lumi_core::{Domain, RegistryId};
use lumi_crypto::KeyPair;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9101";

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
    kind: String,
}

/// Subset of the node's status response needed to rebuild the domain.
#[derive(Deserialize)]
pub struct RemoteStatus {
    pub name: String,
    pub symbol: String,
    pub version: String,
    pub context_id: u64,
    pub registry_id: String,
    pub initialized: bool,
    pub owner: Option<String>,
    pub issuer: Option<String>,
    pub total_supply: u64,
}

impl RemoteStatus {
    pub fn domain(&self) -> anyhow::Result<Domain> {
        Ok(Domain {
            name: self.name.clone(),
            version: self.version.clone(),
            context_id: self.context_id,
            registry: RegistryId::from_hex(&self.registry_id)?,
        })
    }
}

/// Turn a node response into `T`, or into an error carrying the node's
/// error kind and message.
pub async fn decode<T: DeserializeOwned>(resp: reqwest::Response, what: &str) -> anyhow::Result<T> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    if let Ok(err) = resp.json::<ErrorResponse>().await {
        anyhow::bail!("{} failed (HTTP {}, {}): {}", what, status, err.kind, err.error);
    } else {
        anyhow::bail!("{} failed (HTTP {})", what, status);
    }
}

pub async fn fetch_status(endpoint: &str) -> anyhow::Result<RemoteStatus> {
    let url = format!("{}/api/v1/status", endpoint);
    tracing::debug!(%url, "fetching registry status");
    let resp = reqwest::get(&url)
        .await
        .map_err(|e| anyhow::anyhow!("could not reach node at {}: {}", endpoint, e))?;
    decode(resp, "status").await
}

/// Load a key pair from a file holding the hex-encoded 32-byte secret.
pub fn load_key(path: &Path) -> anyhow::Result<KeyPair> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading key file {}: {}", path.display(), e))?;
    Ok(KeyPair::from_hex(&contents)?)
}
