//! `lumi mint`: Submit an issuer authorization to mint a credential.

use clap::Args;
use lumi_core::Identity;
use serde::{Deserialize, Serialize};

#[derive(Args, Debug)]
pub struct MintArgs {
    /// Recipient identity (hex).
    #[arg(long)]
    pub to: Identity,

    /// Stage the authorization was signed for.
    #[arg(long)]
    pub stage: u8,

    /// Issuer signature (hex), as printed by `lumi sign-mint`.
    #[arg(long)]
    pub signature: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = super::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
struct MintRequest<'a> {
    to: Identity,
    stage: u8,
    signature: &'a str,
}

#[derive(Deserialize)]
struct MintResponse {
    id: u64,
}

pub async fn run(args: &MintArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/credentials/mint", args.endpoint);
    let body = MintRequest {
        to: args.to,
        stage: args.stage,
        signature: &args.signature,
    };

    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("could not reach node at {}: {}", args.endpoint, e))?;
    let data: MintResponse = super::decode(resp, "mint").await?;

    println!("Credential minted!");
    println!("  ID:     {}", data.id);
    println!("  Owner:  {}", args.to);
    println!("  Stage:  {}", args.stage);
    Ok(())
}
