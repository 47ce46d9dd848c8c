use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lumi_core::{Stage, StageContent, StageDescriptor};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Prefix of rendered inline metadata documents.
pub const INLINE_JSON_PREFIX: &str = "data:application/json;base64,";

/// One descriptor slot per stage, shared by every credential at that stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMetadataStore {
    slots: [Option<StageContent>; 3],
}

impl StageMetadataStore {
    /// Store populated with the three descriptors, stage 1 first.
    pub fn with_contents(contents: [StageContent; 3]) -> Self {
        Self {
            slots: contents.map(Some),
        }
    }

    /// Replace the descriptor for `stage`.
    pub fn set(&mut self, stage: Stage, content: StageContent) {
        self.slots[stage.index()] = Some(content);
    }

    pub fn get(&self, stage: Stage) -> Option<&StageContent> {
        self.slots[stage.index()].as_ref()
    }

    /// Descriptor for `stage` in its full form.
    pub fn descriptor(&self, stage: Stage) -> Option<StageDescriptor> {
        self.get(stage)
            .map(|content| StageDescriptor::new(stage, content.clone()))
    }

    /// Whether every stage has a descriptor.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Render the descriptor for `stage` to a resolvable string.
    pub fn render(&self, stage: Stage) -> Result<String, RegistryError> {
        let content = self
            .get(stage)
            .ok_or_else(|| RegistryError::NotFound(format!("descriptor for stage {}", stage)))?;
        Ok(render_content(content))
    }
}

/// Render a descriptor: locators verbatim, inline documents as a base64
/// JSON data URI (standard alphabet, padded).
pub fn render_content(content: &StageContent) -> String {
    match content {
        StageContent::Uri(uri) => uri.clone(),
        StageContent::Inline(document) => {
            format!("{}{}", INLINE_JSON_PREFIX, STANDARD.encode(document.as_bytes()))
        }
    }
}
