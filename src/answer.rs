//! Retrieval and answering pipeline.
//!
//! question → embed → top-k search → grounding context → prompt → completion.
//!
//! The empty-store check runs before any upstream call, so asking a question
//! of an empty index costs nothing and fails with [`RagError::EmptyStore`].

use std::sync::Arc;
use std::time::Instant;

use pocket_rag_core::completion::CompletionProvider;
use pocket_rag_core::embedding::EmbeddingProvider;
use pocket_rag_core::store::{ScoredRecord, Store};
use pocket_rag_core::RagError;

use crate::config::RetrievalConfig;

#[derive(Debug, Clone, Copy)]
pub struct RetrievalSettings {
    pub top_k: usize,
}

impl From<&RetrievalConfig> for RetrievalSettings {
    fn from(c: &RetrievalConfig) -> Self {
        Self { top_k: c.top_k }
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self::from(&RetrievalConfig::default())
    }
}

pub struct Answerer {
    store: Arc<dyn Store>,
    embedder: Arc<dyn EmbeddingProvider>,
    completer: Arc<dyn CompletionProvider>,
    settings: RetrievalSettings,
}

impl Answerer {
    pub fn new(
        store: Arc<dyn Store>,
        embedder: Arc<dyn EmbeddingProvider>,
        completer: Arc<dyn CompletionProvider>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            store,
            embedder,
            completer,
            settings,
        }
    }

    /// Embed `question` and return the `top_k` most similar chunks, best
    /// first.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredRecord>, RagError> {
        if self.store.is_empty() {
            return Err(RagError::EmptyStore);
        }

        let started = Instant::now();
        let query = self
            .embedder
            .embed(question)
            .await
            .map_err(RagError::embedding)?;
        let hits = self.store.search(&query, self.settings.top_k)?;

        tracing::debug!(
            hits = hits.len(),
            top_score = hits.first().map(|h| h.score),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "retrieved context"
        );
        Ok(hits)
    }

    /// Answer `question` using only the retrieved chunks as context.
    ///
    /// The completion text is returned verbatim.
    pub async fn answer(&self, question: &str) -> Result<String, RagError> {
        let hits = self.retrieve(question).await?;
        let prompt = build_prompt(&build_context(&hits), question);

        let started = Instant::now();
        let answer = self
            .completer
            .complete(&prompt)
            .await
            .map_err(RagError::completion)?;

        tracing::info!(
            model = self.completer.model_name(),
            context_chunks = hits.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "answered question"
        );
        Ok(answer)
    }
}

/// Join chunk texts in the given (score-descending) order, one per line.
pub fn build_context(hits: &[ScoredRecord]) -> String {
    hits.iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Using ONLY the following documents, answer the question.\n\n\
         Context:\n{context}\n\n\
         Question:\n{question}\n\n\
         Answer concisely and accurately."
    )
}
