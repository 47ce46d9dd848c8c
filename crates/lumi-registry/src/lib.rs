//! Lumi Registry. Soulbound staged credentials: signature-gated minting,
//! stage tracking, per-stage metadata and owner administration.

pub mod admin;
pub mod authority;
pub mod error;
pub mod events;
pub mod guard;
pub mod init;
pub mod metadata;
pub mod registry;
pub mod snapshot;

#[cfg(test)]
mod testing;

pub use admin::{AdminAction, AdminEnvelope};
pub use authority::SignatureAuthority;
pub use error::RegistryError;
pub use events::{EventJournal, EventKind, RegistryEvent};
pub use guard::{OwnershipChange, TransferGuard};
pub use init::InitializationGate;
pub use metadata::{render_content, StageMetadataStore, INLINE_JSON_PREFIX};
pub use registry::CredentialRegistry;
pub use snapshot::{RegistryChanges, RegistrySnapshot};
