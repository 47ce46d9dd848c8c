//! Lumi Core: Fundamental types, errors, and configuration for the
//! Lumi soulbound credential registry.

pub mod config;
pub mod error;
pub mod stage;
pub mod types;

pub use config::RegistryConfig;
pub use error::CoreError;
pub use stage::{Stage, StageContent, StageDescriptor};
pub use types::{Credential, CredentialId, Domain, Identity, RegistryId};
