//! Semantic top-K chunk retrieval.

use std::sync::Arc;
use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::text::sha1_hex;
use crate::domain::models::Chunk;
use crate::services::content_cache::ContentCache;
use crate::services::embedding_service::{dot, EmbeddingService};

/// Memo key of one ranking.
///
/// The signature identifies the ordered chunk-id sequence, so a cached
/// ranking of indices is valid for any chunk list with the same signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetrievalKey {
    signature: String,
    query: String,
    k: usize,
}

impl RetrievalKey {
    pub fn new(chunks: &[Chunk], query: &str, k: usize) -> Self {
        Self {
            signature: chunk_signature(chunks),
            query: normalize_query(query),
            k,
        }
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

/// SHA-1 hex over the `|`-joined chunk ids, in order.
pub fn chunk_signature(chunks: &[Chunk]) -> String {
    let joined = chunks
        .iter()
        .map(|c| c.chunk_id.as_str())
        .collect::<Vec<_>>()
        .join("|");
    sha1_hex(&joined)
}

fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Clamp `k` to `[1, len]`; zero when there is nothing to rank.
pub fn bound_k(k: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        k.clamp(1, len)
    }
}

/// Ranks chunks against a query by embedding similarity.
pub struct Retriever {
    embeddings: Arc<EmbeddingService>,
    rankings: ContentCache<RetrievalKey, Vec<usize>>,
}

impl Retriever {
    pub fn new(
        embeddings: Arc<EmbeddingService>,
        rankings: ContentCache<RetrievalKey, Vec<usize>>,
    ) -> Self {
        Self {
            embeddings,
            rankings,
        }
    }

    /// The `k` chunks most similar to `query`, most similar first.
    ///
    /// Equal scores keep their input order.
    pub async fn retrieve_top_k(
        &self,
        chunks: &[Chunk],
        query: &str,
        k: usize,
    ) -> DomainResult<Vec<Chunk>> {
        let k = bound_k(k, chunks.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let key = RetrievalKey::new(chunks, query, k);
        if let Some(ranked) = self.rankings.get(&key) {
            debug!(signature = %key.signature(), k, "retrieval cache hit");
            return Ok(ranked.iter().map(|&i| chunks[i].clone()).collect());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let matrix = self.embeddings.embed_texts(&texts).await?;
        let query_vector = self.embeddings.embed_one(key.query()).await?;

        let scores: Vec<f32> = matrix.rows().map(|row| dot(row, &query_vector)).collect();
        let mut order: Vec<usize> = (0..chunks.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        order.truncate(k);

        let ranked = self.rankings.insert(key, order);
        Ok(ranked.iter().map(|&i| chunks[i].clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::embedding::{EmbeddingInput, EmbeddingOutput, EmbeddingProvider};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Two-axis embedder: "billing" words on x, everything else on y.
    struct AxisProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for AxisProvider {
        fn name(&self) -> &'static str {
            "axis"
        }

        fn dimension(&self) -> usize {
            2
        }

        async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.to_lowercase().contains("billing") {
                Ok(vec![1.0, 0.0])
            } else {
                Ok(vec![0.0, 1.0])
            }
        }

        async fn embed_batch(
            &self,
            inputs: &[EmbeddingInput],
        ) -> DomainResult<Vec<EmbeddingOutput>> {
            let mut outputs = Vec::new();
            for input in inputs {
                outputs.push(EmbeddingOutput {
                    id: input.id.clone(),
                    vector: self.embed(&input.text).await?,
                });
            }
            Ok(outputs)
        }

        fn max_batch_size(&self) -> usize {
            16
        }
    }

    fn retriever() -> (Retriever, Arc<AxisProvider>) {
        let provider = Arc::new(AxisProvider {
            calls: AtomicUsize::new(0),
        });
        let service = Arc::new(EmbeddingService::with_defaults(provider.clone()));
        (Retriever::new(service, ContentCache::new(16)), provider)
    }

    fn chunks() -> Vec<Chunk> {
        vec![
            Chunk::from_text("users sign up"),
            Chunk::from_text("billing sends invoices"),
            Chunk::from_text("reports export"),
            Chunk::from_text("billing refunds"),
        ]
    }

    #[tokio::test]
    async fn test_empty_chunks() {
        let (retriever, _) = retriever();
        assert!(retriever.retrieve_top_k(&[], "anything", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_k_is_bounded() {
        let (retriever, _) = retriever();
        let chunks = chunks();

        assert_eq!(retriever.retrieve_top_k(&chunks, "q", 0).await.unwrap().len(), 1);
        assert_eq!(retriever.retrieve_top_k(&chunks, "q", 99).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_ranking_with_stable_ties() {
        let (retriever, _) = retriever();
        let chunks = chunks();

        let top = retriever.retrieve_top_k(&chunks, "Billing", 4).await.unwrap();
        let texts: Vec<_> = top.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "billing sends invoices",
                "billing refunds",
                "users sign up",
                "reports export"
            ]
        );
    }

    #[tokio::test]
    async fn test_cache_hit_skips_embedding() {
        let (retriever, provider) = retriever();
        let chunks = chunks();

        retriever.retrieve_top_k(&chunks, "billing", 2).await.unwrap();
        let calls = provider.calls.load(Ordering::SeqCst);
        assert!(retriever.rankings.contains(&RetrievalKey::new(&chunks, "billing", 2)));

        // Same signature, same normalized query, same bounded k
        let again = retriever.retrieve_top_k(&chunks, "  BILLING ", 2).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), calls);
        assert_eq!(again[0].text, "billing sends invoices");
    }

    #[test]
    fn test_signature_depends_on_order() {
        let forward = chunks();
        let mut reversed = chunks();
        reversed.reverse();

        assert_ne!(chunk_signature(&forward), chunk_signature(&reversed));
        assert_eq!(chunk_signature(&forward), chunk_signature(&chunks()));
        assert_eq!(
            RetrievalKey::new(&forward, " Capabilities ", 3),
            RetrievalKey::new(&forward, "capabilities", 3)
        );
    }
}
