//! Story/image generation collaborator abstraction
//!
//! Generation providers may fail or time out; this core never retries
//! them. The entry pipeline sequences credit deduction after a
//! successful generation, so a provider failure leaves the ledger
//! untouched.

use async_trait::async_trait;

use quillia_types::OutputKind;

use crate::memory::StoryPrompt;

/// Error from the generation collaborator
#[derive(Debug, Clone, thiserror::Error)]
#[error("generation error: {0}")]
pub struct GenerationError(pub String);

/// Output of one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedOutput {
    /// A reimagined narrative chapter
    Text(String),
    /// A generated scene image
    Image {
        /// Where the provider stored the image
        url: String,
    },
}

/// Story/image generation collaborator
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Generate a chapter or scene from an assembled prompt
    async fn generate(
        &self,
        prompt: &StoryPrompt,
        kind: OutputKind,
    ) -> Result<GeneratedOutput, GenerationError>;
}
