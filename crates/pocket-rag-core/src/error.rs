//! Error taxonomy shared by every pipeline stage.
//!
//! Each stage fails fast and hands the error to its caller unchanged.
//! Nothing in the core retries or reports partial success.

use std::path::PathBuf;

/// Errors produced by the ingestion and retrieval pipelines.
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    /// The source document could not be read or parsed. Fatal to that
    /// ingestion call only.
    #[error("cannot load document {}: {reason}", path.display())]
    Input { path: PathBuf, reason: String },

    /// An embedding did not match the store's dimensionality. This is a
    /// programming or data error, not a user-correctable condition.
    #[error("embedding dimension mismatch: store holds {expected}-d vectors, got {actual}-d")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A query was attempted before anything was ingested.
    #[error("nothing has been ingested yet")]
    EmptyStore,

    /// The embedding or completion service failed.
    #[error("{service} service failed: {source:#}")]
    Upstream {
        service: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl RagError {
    pub fn input(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        RagError::Input {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn embedding(source: anyhow::Error) -> Self {
        RagError::Upstream {
            service: "embedding",
            source,
        }
    }

    pub fn completion(source: anyhow::Error) -> Self {
        RagError::Upstream {
            service: "completion",
            source,
        }
    }
}
