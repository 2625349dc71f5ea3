//! Vector store abstraction.
//!
//! The [`Store`] trait is the contract the ingestion and answering
//! pipelines depend on. [`memory::InMemoryStore`] is the only backend: an
//! exact linear scan suited to a few thousand records. A future indexed
//! backend (e.g. approximate nearest-neighbour) can replace it behind the
//! same trait without touching the pipelines.
//!
//! Implementations must be `Send + Sync` so one store can be shared between
//! concurrent ingestion and query tasks.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`append`](Store::append) | Add one record |
//! | [`extend`](Store::extend) | Add a batch of records atomically |
//! | [`search`](Store::search) | Top-k cosine similarity search |
//! | [`len`](Store::len) | Number of records |
//! | [`dims`](Store::dims) | Dimensionality fixed by the store, if any |

pub mod memory;

use crate::error::RagError;

/// A chunk of text paired with its embedding. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    /// Provenance label (document path or name). Not used for scoring.
    pub source: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

impl IndexRecord {
    pub fn new(source: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
            embedding,
        }
    }
}

/// A record's text with its similarity to a query. Exists only while a
/// single query is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub source: String,
    pub text: String,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub score: f32,
}

/// Append-only vector store.
pub trait Store: Send + Sync {
    /// Append one record. Duplicate texts are legal and produce a second
    /// record.
    ///
    /// Fails with [`RagError::DimensionMismatch`] when the embedding length
    /// differs from the store's dimensionality.
    fn append(&self, record: IndexRecord) -> Result<(), RagError>;

    /// Append a batch of records in order, all or nothing.
    ///
    /// Every record is validated before any is inserted, and a concurrent
    /// search sees either none of the batch or all of it.
    fn extend(&self, records: Vec<IndexRecord>) -> Result<(), RagError>;

    /// Return the `min(k, len)` records most similar to `query`, sorted by
    /// score descending. Records with equal scores keep insertion order.
    ///
    /// Fails with [`RagError::EmptyStore`] when nothing has been stored and
    /// with [`RagError::DimensionMismatch`] when `query` has the wrong length.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredRecord>, RagError>;

    /// Number of records stored.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality every record must have, once known.
    fn dims(&self) -> Option<usize>;
}
