//! # SchemaEval API
//!
//! Where generated schemas come from. A [`Generator`] turns a prompt into raw
//! model output; the evaluator never sees anything but the resulting text or
//! an error message.
//!
//! - [`ChatCompletionsClient`] - OpenAI-compatible endpoint with timeout and retry
//! - [`CachedGenerator`] - Replays outputs saved by an earlier run

pub mod cached;
pub mod client;
pub mod error;
pub mod extract;

use async_trait::async_trait;
use schemaeval_core::{GeneratedPayload, PromptRecord};

pub use cached::CachedGenerator;
pub use client::{ChatCompletionsClient, GeneratorConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL, SYSTEM_PROMPT};
pub use error::GenerationError;
pub use extract::{extract_content, strip_code_fences};

/// Source of raw generated schema text for a prompt
#[async_trait]
pub trait Generator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &PromptRecord) -> Result<String, GenerationError>;
}

/// Generate and translate failures into a payload the evaluator records as an error
pub async fn generate_payload(generator: &dyn Generator, prompt: &PromptRecord) -> GeneratedPayload {
    match generator.generate(prompt).await {
        Ok(text) => GeneratedPayload::Text(text),
        Err(e) => GeneratedPayload::Unavailable(e.to_string()),
    }
}
