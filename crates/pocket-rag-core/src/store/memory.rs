//! In-memory [`Store`] implementation.
//!
//! Records live in a `Vec` behind a `std::sync::RwLock`: ingestion takes the
//! write lock once per batch, queries share the read lock. Search is a
//! brute-force cosine scan over every stored vector.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::embedding::cosine_similarity;
use crate::error::RagError;

use super::{IndexRecord, ScoredRecord, Store};

#[derive(Default)]
struct Inner {
    dims: Option<usize>,
    records: Vec<IndexRecord>,
}

impl Inner {
    fn check(&self, actual: usize) -> Result<(), RagError> {
        match self.dims {
            Some(expected) if expected != actual => {
                Err(RagError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

/// Process-lifetime vector store. Nothing is persisted.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    /// An empty store whose dimensionality is fixed by the first record.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store that only accepts `dims`-length vectors.
    pub fn with_dims(dims: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                dims: Some(dims),
                records: Vec::new(),
            }),
        }
    }

    /// Snapshot of the stored records in insertion order.
    pub fn records(&self) -> Vec<IndexRecord> {
        self.read().records.clone()
    }

    // A panic while holding the lock cannot leave `Inner` half-updated:
    // every mutation is validated first and then applied with one push or
    // extend. Recovering the guard is therefore safe.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for InMemoryStore {
    fn append(&self, record: IndexRecord) -> Result<(), RagError> {
        let mut inner = self.write();
        inner.check(record.embedding.len())?;
        inner.dims.get_or_insert(record.embedding.len());
        inner.records.push(record);
        Ok(())
    }

    fn extend(&self, records: Vec<IndexRecord>) -> Result<(), RagError> {
        let Some(first) = records.first() else {
            return Ok(());
        };
        let mut inner = self.write();
        let dims = inner.dims.unwrap_or(first.embedding.len());
        for r in &records {
            if r.embedding.len() != dims {
                return Err(RagError::DimensionMismatch {
                    expected: dims,
                    actual: r.embedding.len(),
                });
            }
        }
        inner.dims = Some(dims);
        inner.records.extend(records);
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredRecord>, RagError> {
        let inner = self.read();
        if inner.records.is_empty() {
            return Err(RagError::EmptyStore);
        }
        inner.check(query.len())?;

        let mut scored: Vec<(usize, f32)> = inner
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, cosine_similarity(query, &r.embedding)))
            .collect();

        // `sort_by` is stable, so equal scores keep insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        tracing::trace!(records = inner.records.len(), k, "vector scan complete");

        Ok(scored
            .into_iter()
            .map(|(i, score)| {
                let r = &inner.records[i];
                ScoredRecord {
                    source: r.source.clone(),
                    text: r.text.clone(),
                    score,
                }
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.read().records.len()
    }

    fn dims(&self) -> Option<usize> {
        self.read().dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str, embedding: &[f32]) -> IndexRecord {
        IndexRecord::new("test", text, embedding.to_vec())
    }

    #[test]
    fn search_on_empty_store_fails() {
        let store = InMemoryStore::new();
        let err = store.search(&[1.0, 0.0], 3).unwrap_err();
        assert!(matches!(err, RagError::EmptyStore));
    }

    #[test]
    fn first_record_fixes_dims() {
        let store = InMemoryStore::new();
        assert_eq!(store.dims(), None);
        store.append(record("a", &[1.0, 0.0, 0.0])).unwrap();
        assert_eq!(store.dims(), Some(3));

        let err = store.append(record("b", &[1.0, 0.0])).unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn with_dims_rejects_first_mismatch() {
        let store = InMemoryStore::with_dims(4);
        assert!(store.append(record("a", &[1.0, 0.0])).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn query_dimension_mismatch_fails() {
        let store = InMemoryStore::new();
        store.append(record("a", &[1.0, 0.0])).unwrap();
        let err = store.search(&[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { .. }));
    }

    #[test]
    fn duplicates_are_kept() {
        let store = InMemoryStore::new();
        store.append(record("same", &[1.0, 1.0])).unwrap();
        store.append(record("same", &[1.0, 1.0])).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn results_sorted_descending() {
        let store = InMemoryStore::new();
        store.append(record("far", &[-1.0, 0.0])).unwrap();
        store.append(record("near", &[1.0, 0.1])).unwrap();
        store.append(record("middle", &[0.0, 1.0])).unwrap();

        let results = store.search(&[1.0, 0.0], 3).unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["near", "middle", "far"]);
        for pair in results.windows(2) {
            assert!(pair[0].score > pair[1].score);
        }
    }

    #[test]
    fn k_limits_results() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store.append(record(&format!("r{}", i), &[1.0, i as f32])).unwrap();
        }
        assert_eq!(store.search(&[1.0, 0.0], 3).unwrap().len(), 3);
        assert_eq!(store.search(&[1.0, 0.0], 10).unwrap().len(), 5);
        assert_eq!(store.search(&[1.0, 0.0], 0).unwrap().len(), 0);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let store = InMemoryStore::new();
        store.append(record("first", &[2.0, 0.0])).unwrap();
        store.append(record("second", &[5.0, 0.0])).unwrap();
        store.append(record("third", &[0.5, 0.0])).unwrap();

        let results = store.search(&[1.0, 0.0], 3).unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn extend_is_all_or_nothing() {
        let store = InMemoryStore::new();
        store.append(record("seed", &[1.0, 0.0])).unwrap();

        let err = store
            .extend(vec![record("ok", &[0.0, 1.0]), record("bad", &[1.0, 2.0, 3.0])])
            .unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { .. }));
        assert_eq!(store.len(), 1);

        store
            .extend(vec![record("x", &[0.0, 1.0]), record("y", &[1.0, 1.0])])
            .unwrap();
        let texts: Vec<String> = store.records().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["seed", "x", "y"]);
    }

    #[test]
    fn extend_into_empty_store_checks_batch_consistency() {
        let store = InMemoryStore::new();
        let err = store
            .extend(vec![record("a", &[1.0]), record("b", &[1.0, 2.0])])
            .unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 1, actual: 2 }));
        assert_eq!(store.dims(), None);
    }

    #[test]
    fn tiny_magnitude_vectors_still_rank_by_direction() {
        let store = InMemoryStore::new();
        store.append(record("opposite", &[-1e-4, 0.0])).unwrap();
        store.append(record("same", &[1e-4, 0.0])).unwrap();

        let results = store.search(&[1e-4, 0.0], 2).unwrap();
        assert_eq!(results[0].text, "same");
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[1].text, "opposite");
        assert_eq!(results[1].score, -1.0);
    }

    #[test]
    fn huge_magnitude_vectors_score_finite() {
        let store = InMemoryStore::new();
        store.append(record("other", &[0.0, 1e20])).unwrap();
        store.append(record("big", &[1e20, 0.0])).unwrap();

        let results = store.search(&[1e20, 0.0], 2).unwrap();
        assert_eq!(results[0].text, "big");
        assert_eq!(results[0].score, 1.0);
        assert!(results.iter().all(|r| r.score.is_finite()));
    }

    #[test]
    fn self_similarity_is_one() {
        let store = InMemoryStore::new();
        store.append(record("v", &[0.2, -0.7, 1.3])).unwrap();
        let results = store.search(&[0.2, -0.7, 1.3], 1).unwrap();
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }
}
