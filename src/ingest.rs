//! Ingestion pipeline orchestration.
//!
//! load → chunk → truncate → embed → store. Each document is all or
//! nothing: chunks are embedded in order, and the records are appended with
//! one atomic [`Store::extend`] only after every embedding has succeeded.
//!
//! Truncation to `max_chunks_per_document` is lossy. Text past the cutoff
//! is never indexed; the number of dropped chunks is reported in
//! [`IngestReport`] and logged as a warning.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use pocket_rag_core::chunk::Chunker;
use pocket_rag_core::embedding::EmbeddingProvider;
use pocket_rag_core::store::{IndexRecord, Store};
use pocket_rag_core::RagError;

use crate::config::ChunkingConfig;
use crate::extract;

/// Chunking and truncation policy for one [`Ingestor`].
#[derive(Debug, Clone, Copy)]
pub struct IngestSettings {
    pub chunker: Chunker,
    pub max_chunks_per_document: usize,
}

impl From<&ChunkingConfig> for IngestSettings {
    fn from(c: &ChunkingConfig) -> Self {
        Self {
            chunker: Chunker::new(c.window_chars, c.overlap_chars),
            max_chunks_per_document: c.max_chunks_per_document,
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self::from(&ChunkingConfig::default())
    }
}

/// Outcome of ingesting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub source: String,
    /// Chunks the chunker produced.
    pub chunks_total: usize,
    /// Records appended to the store.
    pub chunks_indexed: usize,
    /// Chunks discarded by the per-document cap.
    pub chunks_dropped: usize,
}

pub struct Ingestor {
    store: Arc<dyn Store>,
    embedder: Arc<dyn EmbeddingProvider>,
    settings: IngestSettings,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn Store>,
        embedder: Arc<dyn EmbeddingProvider>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            store,
            embedder,
            settings,
        }
    }

    /// Load a document from disk and index it.
    pub async fn ingest(&self, path: &Path) -> Result<IngestReport, RagError> {
        let text = extract::load_document(path)?;
        self.ingest_text(&path.display().to_string(), &text).await
    }

    /// Index already-extracted text under the provenance label `source`.
    pub async fn ingest_text(&self, source: &str, text: &str) -> Result<IngestReport, RagError> {
        let started = Instant::now();
        let max = self.settings.max_chunks_per_document;

        let mut chunks_total = 0usize;
        let mut surviving = Vec::with_capacity(max);
        for window in self.settings.chunker.windows(text) {
            if surviving.len() < max {
                surviving.push(window);
            }
            chunks_total += 1;
        }
        let chunks_dropped = chunks_total - surviving.len();

        if chunks_dropped > 0 {
            tracing::warn!(
                source,
                chunks_total,
                chunks_dropped,
                max_chunks_per_document = max,
                "document truncated; trailing chunks will not be indexed"
            );
        }

        let mut records = Vec::with_capacity(surviving.len());
        for (index, window) in surviving.into_iter().enumerate() {
            tracing::debug!(source, index, chars = window.chars().count(), "embedding chunk");
            let embedding = self
                .embedder
                .embed(window)
                .await
                .map_err(RagError::embedding)?;
            records.push(IndexRecord::new(source, window, embedding));
        }

        let chunks_indexed = records.len();
        self.store.extend(records)?;

        tracing::info!(
            source,
            chunks_indexed,
            chunks_dropped,
            store_size = self.store.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "document ingested"
        );

        Ok(IngestReport {
            source: source.to_string(),
            chunks_total,
            chunks_indexed,
            chunks_dropped,
        })
    }
}
