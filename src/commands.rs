//! CLI command implementations.
//!
//! The store is in-memory and per-process, so every query command ingests
//! its `--doc` inputs first. Results go to stdout; progress and diagnostics
//! go through `tracing` to stderr.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use pocket_rag_core::store::memory::InMemoryStore;
use pocket_rag_core::store::Store;

use crate::answer::{Answerer, RetrievalSettings};
use crate::completion::create_completer;
use crate::config::Config;
use crate::embedding::{create_embedder, EmbeddingProvider};
use crate::extract;
use crate::ingest::{IngestReport, IngestSettings, Ingestor};

/// Print the chunks a document would produce, marking those past the
/// truncation cutoff. Makes no network calls.
pub fn run_chunks(config: &Config, path: &Path) -> Result<()> {
    let settings = IngestSettings::from(&config.chunking);
    let text = extract::load_document(path)?;
    let chunks = settings.chunker.chunk(&text);
    let max = settings.max_chunks_per_document;

    for chunk in &chunks {
        let marker = if chunk.index >= max { " (dropped)" } else { "" };
        println!(
            "--- chunk {} ({} chars){} ---",
            chunk.index,
            chunk.text.chars().count(),
            marker
        );
        println!("{}", chunk.text);
    }

    let dropped = chunks.len().saturating_sub(max);
    println!(
        "{}: {} chunks, {} indexed, {} dropped",
        path.display(),
        chunks.len(),
        chunks.len() - dropped,
        dropped
    );
    Ok(())
}

/// Print the top-k chunks for `question` with their scores.
pub async fn run_search(config: &Config, question: &str, docs: &[PathBuf]) -> Result<()> {
    let answerer = build_pipeline(config, docs).await?;
    let hits = answerer.retrieve(question).await?;

    for (rank, hit) in hits.iter().enumerate() {
        println!("{}. [{:.4}] {}", rank + 1, hit.score, hit.source);
        println!("   {}", preview(&hit.text, 200));
    }
    Ok(())
}

pub async fn run_ask(config: &Config, question: &str, docs: &[PathBuf]) -> Result<()> {
    let answerer = build_pipeline(config, docs).await?;
    let answer = answerer.answer(question).await?;
    println!("{}", answer);
    Ok(())
}

/// Answer one question per stdin line until EOF.
pub async fn run_chat(config: &Config, docs: &[PathBuf]) -> Result<()> {
    let answerer = build_pipeline(config, docs).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        match answerer.answer(question).await {
            Ok(answer) => println!("{}", answer),
            Err(e) => eprintln!("Error: {}", e),
        }
    }
    Ok(())
}

/// Create providers, ingest `docs` into a fresh store, and return an
/// [`Answerer`] over it.
async fn build_pipeline(config: &Config, docs: &[PathBuf]) -> Result<Answerer> {
    let embedder = create_embedder(&config.embedding)?;
    let completer = create_completer(&config.completion)?;
    let store = store_for(embedder.as_ref());

    let ingestor = Ingestor::new(
        Arc::clone(&store),
        Arc::clone(&embedder),
        IngestSettings::from(&config.chunking),
    );
    let reports = ingest_all(&ingestor, docs).await?;
    let indexed: usize = reports.iter().map(|r| r.chunks_indexed).sum();
    tracing::info!(
        documents = reports.len(),
        chunks = indexed,
        embedding_model = embedder.model_name(),
        "index ready"
    );

    Ok(Answerer::new(
        store,
        embedder,
        completer,
        RetrievalSettings::from(&config.retrieval),
    ))
}

/// A fresh store that only accepts vectors of the embedder's declared
/// dimensionality. An embedder reporting 0 dims leaves it to the first record.
pub fn store_for(embedder: &dyn EmbeddingProvider) -> Arc<dyn Store> {
    match embedder.dims() {
        0 => Arc::new(InMemoryStore::new()),
        dims => Arc::new(InMemoryStore::with_dims(dims)),
    }
}

/// Ingest every document named by `docs`, expanding directories.
pub async fn ingest_all(ingestor: &Ingestor, docs: &[PathBuf]) -> Result<Vec<IngestReport>> {
    let paths: Vec<PathBuf> = docs
        .iter()
        .flat_map(|d| extract::collect_documents(d))
        .collect();
    if paths.is_empty() {
        bail!("No documents to ingest; pass at least one --doc");
    }

    let mut reports = Vec::with_capacity(paths.len());
    for path in &paths {
        tracing::info!(path = %path.display(), "ingesting");
        let report = ingestor
            .ingest(path)
            .await
            .with_context(|| format!("Failed to ingest {}", path.display()))?;
        reports.push(report);
    }
    Ok(reports)
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &flat[..idx]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_flattens_and_truncates() {
        assert_eq!(preview("a\n  b\tc", 10), "a b c");
        assert_eq!(preview("héllo world", 5), "héllo...");
    }

    struct FixedDims(usize);

    #[async_trait::async_trait]
    impl EmbeddingProvider for FixedDims {
        fn model_name(&self) -> &str {
            "fixed"
        }
        fn dims(&self) -> usize {
            self.0
        }
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0; self.0])
        }
    }

    #[test]
    fn store_enforces_embedder_dims_from_first_record() {
        let store = store_for(&FixedDims(3));
        assert_eq!(store.dims(), Some(3));

        let err = store
            .append(pocket_rag_core::store::IndexRecord::new("doc", "text", vec![1.0, 0.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            pocket_rag_core::RagError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn zero_dims_embedder_leaves_store_unfixed() {
        assert_eq!(store_for(&FixedDims(0)).dims(), None);
    }

    #[test]
    fn chunks_of_missing_file_fail() {
        assert!(run_chunks(&Config::default(), Path::new("/definitely/not/here.txt")).is_err());
    }
}
