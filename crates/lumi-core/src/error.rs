/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid stage {0:#04x}: expected 0x01, 0x02 or 0x03")]
    InvalidStage(u8),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),
}
