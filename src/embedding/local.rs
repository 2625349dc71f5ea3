//! In-process embeddings via fastembed.
//!
//! The model is downloaded from Hugging Face on first use and cached; after
//! that no network calls are made. Inference runs on the blocking pool.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use pocket_rag_core::embedding::EmbeddingProvider;

use super::{check_dims, local_model_dims, DEFAULT_LOCAL_MODEL};
use crate::config::EmbeddingConfig;

pub struct LocalProvider {
    model_name: String,
    dims: usize,
    model: Arc<Mutex<fastembed::TextEmbedding>>,
}

impl LocalProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model_name = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_LOCAL_MODEL.to_string());
        let dims = local_model_dims(&model_name, config.dims)?;
        let fastembed_model = resolve_model(&model_name)?;

        tracing::info!(model = %model_name, "initializing local embedding model");
        let model = fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(fastembed_model).with_show_download_progress(true),
        )
        .map_err(|e| anyhow!("Failed to initialize local embedding model: {}", e))?;

        Ok(Self {
            model_name,
            dims,
            model: Arc::new(Mutex::new(model)),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalProvider {
    fn model_name(&self) -> &str {
        &self.model_name
    }
    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = Arc::clone(&self.model);
        let text = text.to_string();

        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = model.lock().unwrap_or_else(PoisonError::into_inner);
            model
                .embed(vec![text], None)
                .map_err(|e| anyhow!("Local embedding failed: {}", e))
        })
        .await??;

        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Empty embedding response"))?;
        check_dims(vector, self.dims)
    }
}

fn resolve_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    use fastembed::EmbeddingModel::*;
    Ok(match name {
        "all-minilm-l6-v2" => AllMiniLML6V2,
        "bge-small-en-v1.5" => BGESmallENV15,
        "bge-base-en-v1.5" => BGEBaseENV15,
        "bge-large-en-v1.5" => BGELargeENV15,
        "nomic-embed-text-v1.5" => NomicEmbedTextV15,
        "multilingual-e5-small" => MultilingualE5Small,
        other => bail!("Unknown local embedding model: '{}'", other),
    })
}
