//! `lumi keygen`: Generate an Ed25519 key pair.

use clap::Args;
use lumi_crypto::KeyPair;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// File to write the hex-encoded secret key to.
    #[arg(short, long)]
    pub out: PathBuf,

    /// Overwrite an existing key file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &KeygenArgs) -> anyhow::Result<()> {
    if args.out.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.out.display()
        );
    }

    let keypair = KeyPair::generate();
    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&args.out, keypair.secret_hex())?;

    println!("Key written to {}", args.out.display());
    println!("  Identity: {}", keypair.identity());
    Ok(())
}
