use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Progression marker carried by every credential.
///
/// Only three stages exist. Raw bytes coming from callers are validated
/// through [`Stage::try_from`], so a `Stage` value is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Stage {
    One = 0x01,
    Two = 0x02,
    Three = 0x03,
}

impl Stage {
    /// All stages in ascending order.
    pub const ALL: [Stage; 3] = [Stage::One, Stage::Two, Stage::Three];

    /// The wire byte for this stage.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Zero-based slot index, used for fixed three-entry tables.
    pub fn index(self) -> usize {
        self.as_u8() as usize - 1
    }
}

impl TryFrom<u8> for Stage {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::One),
            0x02 => Ok(Self::Two),
            0x03 => Ok(Self::Three),
            other => Err(CoreError::InvalidStage(other)),
        }
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> u8 {
        stage.as_u8()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Metadata payload of a stage descriptor.
///
/// `Uri` is an external locator returned verbatim on resolution. `Inline`
/// is an opaque JSON document embedded as a base64 data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageContent {
    Uri(String),
    Inline(String),
}

impl StageContent {
    /// Raw content string, regardless of form.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Uri(s) | Self::Inline(s) => s,
        }
    }
}

/// Metadata template shared by every credential at `stage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDescriptor {
    pub stage: Stage,
    pub content: StageContent,
}

impl StageDescriptor {
    pub fn new(stage: Stage, content: StageContent) -> Self {
        Self { stage, content }
    }
}
