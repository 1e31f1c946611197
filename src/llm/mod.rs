//! Upstream content generation
//!
//! The producer only needs one operation from a generator: open a single
//! streaming call for a prompt and iterate the fragments it yields.

pub mod gemini;
pub mod prompts;
pub mod scripted;
pub mod sse;
pub mod streaming;

use async_trait::async_trait;

pub use gemini::GeminiClient;
pub use prompts::build_story_prompt;
pub use scripted::ScriptedGenerator;
pub use streaming::FragmentStream;
pub use streaming::StreamingResponse;

use crate::Result;

/// Validated input for one generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub message: String,
    pub animal: String,
    /// `message` with the narrative instructions appended
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(message: impl Into<String>, animal: impl Into<String>) -> Self {
        let message = message.into();
        let animal = animal.into();
        let prompt = build_story_prompt(&message, &animal);
        Self {
            message,
            animal,
            prompt,
        }
    }
}

/// Opaque producer of mixed text/image fragments
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Opens exactly one upstream stream.
    ///
    /// An `Err` here means nothing was produced (`Setup`); failures after the
    /// stream is returned arrive as an `Err` item inside it (`Stream`).
    async fn open_stream(&self, request: &GenerationRequest) -> Result<StreamingResponse>;
}
