//! `lumi sign-mint`: Produce an issuer authorization for a mint.

use clap::Args;
use lumi_core::{Domain, Identity, RegistryConfig, RegistryId};
use lumi_crypto::sign_mint;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SignMintArgs {
    /// Issuer key file.
    #[arg(short, long)]
    pub key: PathBuf,

    /// Recipient identity (hex).
    #[arg(long)]
    pub to: Identity,

    /// Stage to authorize (1, 2 or 3).
    #[arg(long)]
    pub stage: u8,

    /// Sign offline for this registry id instead of asking the node.
    /// The remaining domain fields default to the node's `[registry]`
    /// defaults and must match the node's configuration.
    #[arg(long)]
    pub registry_id: Option<RegistryId>,

    /// Registry name used with --registry-id.
    #[arg(long, requires = "registry_id")]
    pub name: Option<String>,

    /// Authorization scheme version used with --registry-id.
    #[arg(long, requires = "registry_id")]
    pub domain_version: Option<String>,

    /// Context id used with --registry-id.
    #[arg(long, requires = "registry_id")]
    pub context_id: Option<u64>,

    /// API endpoint of the node.
    #[arg(short, long, default_value = super::DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

impl SignMintArgs {
    /// The signing domain given on the command line, if signing offline.
    fn offline_domain(&self) -> Option<Domain> {
        let registry_id = self.registry_id?;
        let mut config = RegistryConfig::default();
        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        if let Some(version) = &self.domain_version {
            config.version = version.clone();
        }
        if let Some(context_id) = self.context_id {
            config.context_id = context_id;
        }
        Some(config.domain(registry_id))
    }
}

pub async fn run(args: &SignMintArgs) -> anyhow::Result<()> {
    let issuer = super::load_key(&args.key)?;

    let domain = match args.offline_domain() {
        Some(domain) => {
            tracing::info!(
                name = %domain.name,
                version = %domain.version,
                context_id = domain.context_id,
                "signing offline; domain must match the node's [registry] section"
            );
            domain
        }
        None => super::fetch_status(&args.endpoint).await?.domain()?,
    };

    let signature = sign_mint(&domain, &args.to, args.stage, &issuer);
    tracing::debug!(to = %args.to, stage = args.stage, registry = %domain.registry, "signed mint");

    println!("Mint authorization:");
    println!("  To:         {}", args.to);
    println!("  Stage:      {}", args.stage);
    println!("  Registry:   {}", domain.registry);
    println!("  Domain:     {} v{} ({})", domain.name, domain.version, domain.context_id);
    println!("  Signer:     {}", issuer.identity());
    println!("  Signature:  {}", signature.to_hex());
    Ok(())
}
