//! Embedding provider trait and vector similarity.
//!
//! Defines the [`EmbeddingProvider`] trait that every embedding backend
//! implements, plus [`cosine_similarity`], the scoring function used by the
//! vector store.
//!
//! Concrete providers (OpenAI, Ollama, fastembed) live in the `pocket-rag`
//! app crate.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for embedding providers.
///
/// Implementations turn a text into a fixed-length vector. The length must
/// be the same for every call within a process; the vector store rejects
/// anything else.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `1536`).
    fn dims(&self) -> usize;
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns `0.0` for empty vectors, vectors of different lengths, or a
/// zero-norm operand. Sums are accumulated in `f64`, so tiny or very large
/// components neither underflow to zero nor overflow to infinity, and the
/// result is clamped so rounding never pushes it outside the unit interval.
///
/// # Formula
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let cos = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !cos.is_finite() {
        // NaN or infinite components.
        return 0.0;
    }
    cos.clamp(-1.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        let sim = cosine_similarity(&a, &b);
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_scale_invariant() {
        let a = vec![0.3, -1.2, 4.0];
        let b: Vec<f32> = a.iter().map(|x| x * 250.0).collect();
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_bounded() {
        let vectors = [
            vec![0.1f32, 0.2, 0.3],
            vec![-5.0, 3.0, 1e-3],
            vec![1e6, -1e6, 7.0],
            vec![0.0, 0.0, 1.0],
        ];
        for a in &vectors {
            for b in &vectors {
                let sim = cosine_similarity(a, b);
                assert!((-1.0..=1.0).contains(&sim), "out of range: {}", sim);
            }
        }
    }

    #[test]
    fn test_cosine_tiny_vectors_keep_direction() {
        let v = [1e-4f32, 0.0];
        assert_eq!(cosine_similarity(&v, &v), 1.0);
        assert_eq!(cosine_similarity(&v, &[-1e-4, 0.0]), -1.0);
        assert_eq!(cosine_similarity(&[1e-30, 1e-30], &[1e-30, 1e-30]), 1.0);
    }

    #[test]
    fn test_cosine_huge_vectors_do_not_overflow() {
        let v = [1e20f32, 0.0];
        assert_eq!(cosine_similarity(&v, &v), 1.0);
        let w = [3e38f32, -3e38];
        assert!((cosine_similarity(&w, &w) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_non_finite_input_scores_zero() {
        assert_eq!(cosine_similarity(&[f32::NAN, 1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[f32::INFINITY, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_empty() {
        let sim = cosine_similarity(&[], &[]);
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_different_lengths() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0];
        let sim = cosine_similarity(&a, &b);
        assert_eq!(sim, 0.0);
    }
}
