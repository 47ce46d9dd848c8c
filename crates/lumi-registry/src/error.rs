use lumi_core::{Identity, Stage};

/// Registry errors. Every error is terminal for its call and leaves the
/// registry unchanged.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("identity {0} already holds a credential")]
    DuplicateIdentity(Identity),

    #[error("invalid stage {0:#04x}: expected 0x01, 0x02 or 0x03")]
    InvalidStage(u8),

    #[error("invalid signer")]
    InvalidSigner,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("soulbound: credentials cannot be transferred or burned")]
    TransferDisallowed,

    #[error("registry already initialized")]
    AlreadyInitialized,

    #[error("caller {0} is not the registry owner")]
    Unauthorized(Identity),

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

impl RegistryError {
    /// Stable machine-readable kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateIdentity(_) => "DuplicateIdentity",
            Self::InvalidStage(_) => "InvalidStage",
            Self::InvalidSigner => "InvalidSigner",
            Self::NotFound(_) => "NotFound",
            Self::TransferDisallowed => "TransferDisallowed",
            Self::AlreadyInitialized => "AlreadyInitialized",
            Self::Unauthorized(_) => "Unauthorized",
            Self::CorruptSnapshot(_) => "CorruptSnapshot",
        }
    }
}

/// Validate a raw stage byte supplied by a caller.
pub(crate) fn parse_stage(raw: u8) -> Result<Stage, RegistryError> {
    Stage::try_from(raw).map_err(|_| RegistryError::InvalidStage(raw))
}
