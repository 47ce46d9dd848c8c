//! `lumi status`: Query the status of a running Lumi node.

use clap::Args;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = super::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let status = match super::fetch_status(&args.endpoint).await {
        Ok(status) => status,
        Err(e) => {
            println!("{}", e);
            println!();
            println!("Is the node running? Start it with: lumi-node");
            return Ok(());
        }
    };

    println!("Registry Status:");
    println!("  Name:         {} ({})", status.name, status.symbol);
    println!("  Version:      {}", status.version);
    println!("  Context:      {}", status.context_id);
    println!("  Registry ID:  {}", status.registry_id);
    println!("  Initialized:  {}", status.initialized);
    println!("  Owner:        {}", status.owner.as_deref().unwrap_or("(none)"));
    println!("  Issuer:       {}", status.issuer.as_deref().unwrap_or("(none)"));
    println!("  Supply:       {}", status.total_supply);
    Ok(())
}
