//! Completion provider trait.
//!
//! The language model is an external collaborator: it receives a fully
//! assembled prompt and returns the text of its first response message.
//! Concrete providers live in the `pocket-rag` app crate.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for chat/completion backends.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"llama-3.1-8b-instant"`).
    fn model_name(&self) -> &str;
    /// Send `prompt` as a single user message and return the primary
    /// response content verbatim.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
