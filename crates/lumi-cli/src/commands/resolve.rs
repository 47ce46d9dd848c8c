//! `lumi resolve`: Resolve the metadata locator of a credential.

use clap::Args;
use serde::Deserialize;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Credential id.
    pub id: u64,

    /// API endpoint of the node.
    #[arg(short, long, default_value = super::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct UriResponse {
    uri: String,
}

pub async fn run(args: &ResolveArgs) -> anyhow::Result<()> {
    let url = format!("{}/api/v1/credentials/{}/uri", args.endpoint, args.id);
    let resp = reqwest::get(&url)
        .await
        .map_err(|e| anyhow::anyhow!("could not reach node at {}: {}", args.endpoint, e))?;
    let data: UriResponse = super::decode(resp, "resolve").await?;

    println!("{}", data.uri);
    Ok(())
}
