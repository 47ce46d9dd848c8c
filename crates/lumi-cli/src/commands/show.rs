//! `lumi show`: Show a credential by id or by holder.

use clap::Args;
use serde::Deserialize;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Credential id.
    #[arg(required_unless_present = "owner")]
    pub id: Option<u64>,

    /// Look up the credential held by this identity instead.
    #[arg(long, conflicts_with = "id")]
    pub owner: Option<String>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = super::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct CredentialResponse {
    id: u64,
    owner: String,
    stage: u8,
}

pub async fn run(args: &ShowArgs) -> anyhow::Result<()> {
    let url = match (&args.owner, args.id) {
        (Some(owner), _) => format!("{}/api/v1/owners/{}", args.endpoint, owner),
        (None, Some(id)) => format!("{}/api/v1/credentials/{}", args.endpoint, id),
        (None, None) => anyhow::bail!("either a credential id or --owner is required"),
    };

    let resp = reqwest::get(&url)
        .await
        .map_err(|e| anyhow::anyhow!("could not reach node at {}: {}", args.endpoint, e))?;
    let data: CredentialResponse = super::decode(resp, "lookup").await?;

    println!("Credential {}", data.id);
    println!("  Owner:  {}", data.owner);
    println!("  Stage:  {}", data.stage);
    Ok(())
}
