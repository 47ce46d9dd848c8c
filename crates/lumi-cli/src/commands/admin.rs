//! `lumi admin`: Owner-signed registry administration.

use clap::{Args, Subcommand};
use lumi_core::{CredentialId, Identity, StageContent};
use lumi_registry::{AdminAction, AdminEnvelope};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AdminArgs {
    /// Owner key file used to sign the call.
    #[arg(short, long)]
    pub key: PathBuf,

    /// API endpoint of the node.
    #[arg(short, long, default_value = super::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    #[command(subcommand)]
    pub action: AdminCommand,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Move one credential to a stage.
    UpdateStage {
        /// Credential id.
        id: u64,
        /// Target stage (1, 2 or 3).
        stage: u8,
    },
    /// Move the credentials of several holders to a stage, all or nothing.
    BatchUpdate {
        /// Target stage (1, 2 or 3).
        #[arg(long)]
        stage: u8,
        /// Holder identities (hex).
        #[arg(required = true)]
        identities: Vec<Identity>,
    },
    /// Replace the trusted issuer.
    SetIssuer {
        /// New issuer identity (hex).
        issuer: Identity,
    },
    /// Replace the descriptor of a stage.
    SetDescriptor {
        /// Stage (1, 2 or 3).
        stage: u8,
        /// Metadata locator, e.g. ipfs://...
        #[arg(long, conflicts_with = "inline", required_unless_present = "inline")]
        uri: Option<String>,
        /// Path to a JSON document, embedded exactly as stored on disk.
        #[arg(long)]
        inline: Option<PathBuf>,
    },
}

#[derive(Deserialize)]
struct NonceResponse {
    nonce: u64,
}

impl AdminCommand {
    fn to_action(&self) -> anyhow::Result<AdminAction> {
        Ok(match self {
            Self::UpdateStage { id, stage } => AdminAction::UpdateStage {
                id: CredentialId(*id),
                stage: *stage,
            },
            Self::BatchUpdate { stage, identities } => AdminAction::BatchUpdateStages {
                identities: identities.clone(),
                stage: *stage,
            },
            Self::SetIssuer { issuer } => AdminAction::SetIssuer { issuer: *issuer },
            Self::SetDescriptor { stage, uri, inline } => {
                let content = match (uri, inline) {
                    (Some(uri), _) => StageContent::Uri(uri.clone()),
                    (None, Some(path)) => {
                        let document = std::fs::read_to_string(path)?;
                        serde_json::from_str::<serde_json::Value>(&document).map_err(|e| {
                            anyhow::anyhow!("{} is not valid JSON: {}", path.display(), e)
                        })?;
                        StageContent::Inline(document)
                    }
                    (None, None) => anyhow::bail!("one of --uri or --inline is required"),
                };
                AdminAction::SetDescriptor {
                    stage: *stage,
                    content,
                }
            }
        })
    }
}

pub async fn run(args: &AdminArgs) -> anyhow::Result<()> {
    let owner = super::load_key(&args.key)?;
    let action = args.action.to_action()?;
    let domain = super::fetch_status(&args.endpoint).await?.domain()?;

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("{}/api/v1/admin/nonce", args.endpoint))
        .send()
        .await?;
    let current: NonceResponse = super::decode(resp, "nonce lookup").await?;

    let envelope = AdminEnvelope::sign(&domain, current.nonce, action, &owner)?;
    tracing::debug!(caller = %envelope.caller, nonce = envelope.nonce, "submitting admin call");

    let resp = client
        .post(format!("{}/api/v1/admin", args.endpoint))
        .json(&envelope)
        .send()
        .await?;
    let next: NonceResponse = super::decode(resp, "admin call").await?;

    println!("Admin call accepted.");
    println!("  Caller:      {}", envelope.caller);
    println!("  Next nonce:  {}", next.nonce);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_stage_action() {
        let cmd = AdminCommand::UpdateStage { id: 4, stage: 2 };
        assert_eq!(
            cmd.to_action().unwrap(),
            AdminAction::UpdateStage {
                id: CredentialId(4),
                stage: 2
            }
        );
    }

    #[test]
    fn test_inline_descriptor_is_validated_and_kept_verbatim() {
        let path = std::env::temp_dir().join(format!("lumi-cli-{}.json", std::process::id()));
        std::fs::write(&path, "not json").unwrap();
        let cmd = AdminCommand::SetDescriptor {
            stage: 1,
            uri: None,
            inline: Some(path.clone()),
        };
        assert!(cmd.to_action().is_err());

        std::fs::write(&path, "{\"name\":\"stage 1\"}\n").unwrap();
        assert_eq!(
            cmd.to_action().unwrap(),
            AdminAction::SetDescriptor {
                stage: 1,
                content: StageContent::Inline("{\"name\":\"stage 1\"}\n".into()),
            }
        );
        std::fs::remove_file(&path).ok();
    }
}
