//! Lumi CLI: Command-line interface for the Lumi credential registry.
//!
//! Subcommands: keygen, sign-mint, mint, show, resolve, admin, status.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Lumi: soulbound staged credentials.
#[derive(Parser, Debug)]
#[command(name = "lumi", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a key pair.
    Keygen(commands::keygen::KeygenArgs),
    /// Sign a mint authorization as the issuer.
    SignMint(commands::sign_mint::SignMintArgs),
    /// Mint a credential with an issuer authorization.
    Mint(commands::mint::MintArgs),
    /// Show a credential.
    Show(commands::show::ShowArgs),
    /// Resolve a credential's metadata locator.
    Resolve(commands::resolve::ResolveArgs),
    /// Owner-signed administration.
    Admin(commands::admin::AdminArgs),
    /// Query the status of a running node.
    Status(commands::status::StatusArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Keygen(args) => commands::keygen::run(args),
        Commands::SignMint(args) => commands::sign_mint::run(args).await,
        Commands::Mint(args) => commands::mint::run(args).await,
        Commands::Show(args) => commands::show::run(args).await,
        Commands::Resolve(args) => commands::resolve::run(args).await,
        Commands::Admin(args) => commands::admin::run(args).await,
        Commands::Status(args) => commands::status::run(args).await,
    }
}
