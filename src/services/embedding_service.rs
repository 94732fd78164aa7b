//! Embedding service for retrieval.
//!
//! Wraps an [`EmbeddingProvider`] with a content-addressed memo, L2
//! normalization and batching. Texts seen before never reach the provider.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::text::sha1_hex;
use crate::domain::ports::embedding::{EmbeddingInput, EmbeddingProvider};
use crate::services::content_cache::ContentCache;

/// Default number of memoized text vectors.
pub const DEFAULT_EMBEDDING_CACHE_CAPACITY: u64 = 4096;

/// Row-major matrix of unit-length embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    dimension: usize,
    rows: Vec<Vec<f32>>,
}

impl EmbeddingMatrix {
    pub fn empty(dimension: usize) -> Self {
        Self {
            dimension,
            rows: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale `vector` to unit length. Zero vectors are left untouched.
pub fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

/// Embedding service that memoizes and normalizes provider output.
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    memo: ContentCache<String, Vec<f32>>,
}

impl EmbeddingService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, cache_capacity: u64) -> Self {
        Self {
            provider,
            memo: ContentCache::new(cache_capacity),
        }
    }

    pub fn with_defaults(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::new(provider, DEFAULT_EMBEDDING_CACHE_CAPACITY)
    }

    /// Embed one text as a unit-length vector.
    pub async fn embed_one(&self, text: &str) -> DomainResult<Vec<f32>> {
        let matrix = self.embed_texts(&[text.to_string()]).await?;
        matrix
            .row(0)
            .map(<[f32]>::to_vec)
            .ok_or_else(|| DomainError::ExecutionFailed("Empty embedding response".to_string()))
    }

    /// Embed `texts`, one unit-length row per input in input order.
    pub async fn embed_texts(&self, texts: &[String]) -> DomainResult<EmbeddingMatrix> {
        let dimension = self.provider.dimension();
        if texts.is_empty() {
            return Ok(EmbeddingMatrix::empty(dimension));
        }

        let keys: Vec<String> = texts.iter().map(|t| sha1_hex(t)).collect();
        let mut rows: Vec<Option<Vec<f32>>> = keys
            .iter()
            .map(|k| self.memo.get(k).map(|v| v.as_ref().clone()))
            .collect();

        // Unique misses only; the same text twice in one call costs one embedding
        let mut misses: Vec<EmbeddingInput> = Vec::new();
        for (index, row) in rows.iter().enumerate() {
            if row.is_none() && !misses.iter().any(|m| m.id == keys[index]) {
                misses.push(EmbeddingInput {
                    id: keys[index].clone(),
                    text: texts[index].clone(),
                });
            }
        }

        if !misses.is_empty() {
            debug!(
                provider = self.provider.name(),
                requested = texts.len(),
                misses = misses.len(),
                "embedding cache misses"
            );
            let fetched = self.fetch(&misses, dimension).await?;
            for (index, row) in rows.iter_mut().enumerate() {
                if row.is_none() {
                    *row = fetched.get(&keys[index]).cloned();
                }
            }
        }

        let rows = rows
            .into_iter()
            .map(|row| {
                row.ok_or_else(|| {
                    DomainError::ExecutionFailed("Provider returned too few embeddings".to_string())
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(EmbeddingMatrix { dimension, rows })
    }

    async fn fetch(
        &self,
        misses: &[EmbeddingInput],
        dimension: usize,
    ) -> DomainResult<HashMap<String, Vec<f32>>> {
        let batch_size = self.provider.max_batch_size().max(1);
        let mut fetched = HashMap::with_capacity(misses.len());

        for batch in misses.chunks(batch_size) {
            let outputs = self.provider.embed_batch(batch).await?;
            if outputs.len() != batch.len() {
                return Err(DomainError::ExecutionFailed(format!(
                    "Provider returned {} embeddings for {} inputs",
                    outputs.len(),
                    batch.len()
                )));
            }

            for output in outputs {
                if output.vector.len() != dimension {
                    return Err(DomainError::DimensionMismatch {
                        expected: dimension,
                        actual: output.vector.len(),
                    });
                }
                let vector = l2_normalize(output.vector);
                self.memo.insert(output.id.clone(), vector.clone());
                fetched.insert(output.id, vector);
            }
        }

        Ok(fetched)
    }
}
