use lumi_core::{CredentialId, Identity};

use crate::error::RegistryError;

/// An attempted change of credential ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipChange {
    /// A new credential comes into existence for `to`.
    Mint { to: Identity },
    /// Direct or operator-initiated transfer.
    Transfer {
        caller: Identity,
        from: Identity,
        to: Identity,
        id: CredentialId,
    },
    /// Destruction, i.e. transfer to nobody.
    Burn { caller: Identity, id: CredentialId },
}

/// Soulbound policy: the only ownership change ever admitted is a mint.
///
/// Every entry point that could move or destroy a credential goes through
/// [`TransferGuard::check`] before touching any state.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferGuard;

impl TransferGuard {
    pub fn check(&self, change: &OwnershipChange) -> Result<(), RegistryError> {
        match change {
            OwnershipChange::Mint { .. } => Ok(()),
            OwnershipChange::Transfer {
                caller,
                from,
                to,
                id,
            } => {
                tracing::warn!(%caller, %from, %to, %id, "transfer rejected: soulbound credential");
                Err(RegistryError::TransferDisallowed)
            }
            OwnershipChange::Burn { caller, id } => {
                tracing::warn!(%caller, %id, "burn rejected: soulbound credential");
                Err(RegistryError::TransferDisallowed)
            }
        }
    }
}
