//! Single-slot session index store.
//!
//! The store owns the embedding client and a slot holding at most one
//! immutable [`SessionIndex`]. `replace` is the only way a session comes into
//! existence and always tears down the previous one first; `clear` is the
//! only way a session goes away. Searches clone the current `Arc` and then
//! run lock-free, so an in-flight search against the old index completes
//! safely while a new one is being built.

use crate::embedding::EmbeddingClient;
use crate::index::similarity::{maximal_marginal_relevance, top_k_indices};
use crate::index::types::{IndexError, Passage, SearchStrategy};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Fixed logical collection name reused across sessions.
pub const SESSION_COLLECTION: &str = "tutor_session";

/// Relevance/diversity tradeoff used for diversity-aware search.
const MMR_LAMBDA: f32 = 0.5;
/// Minimum candidate pool considered by diversity-aware search.
const MMR_MIN_FETCH: usize = 20;

/// Immutable snapshot of an indexed document session.
struct SessionIndex {
    collection_id: &'static str,
    passages: Vec<Passage>,
    embeddings: Vec<Vec<f32>>,
}

/// Owns the one active session index and mediates all access to it.
pub struct SessionIndexStore {
    embedding_client: Arc<dyn EmbeddingClient + Send + Sync>,
    active: RwLock<Option<Arc<SessionIndex>>>,
}

impl SessionIndexStore {
    /// Build a store around the supplied embedding client.
    pub fn new(embedding_client: Arc<dyn EmbeddingClient + Send + Sync>) -> Self {
        Self {
            embedding_client,
            active: RwLock::new(None),
        }
    }

    /// Replace the active session with a fresh index built from `passages`.
    ///
    /// Any existing session is torn down before the new index is built, so a
    /// failure partway through leaves the store empty rather than holding a
    /// partially built session. An empty passage list is a warning-level
    /// no-op that leaves no active session.
    pub async fn replace(&self, passages: Vec<Passage>) -> Result<usize, IndexError> {
        {
            let mut slot = self.active.write().await;
            if slot.take().is_some() {
                tracing::info!(collection = SESSION_COLLECTION, "Tore down previous session");
            }
        }

        if passages.is_empty() {
            tracing::warn!("No passages provided; leaving session index empty");
            return Ok(0);
        }

        let texts: Vec<String> = passages
            .iter()
            .map(|passage| passage.content.clone())
            .collect();
        let embeddings = self.embedding_client.embed(&texts).await?;
        debug_assert_eq!(passages.len(), embeddings.len());

        let count = passages.len();
        let index = Arc::new(SessionIndex {
            collection_id: SESSION_COLLECTION,
            passages,
            embeddings,
        });

        let mut slot = self.active.write().await;
        tracing::info!(
            collection = index.collection_id,
            passages = count,
            "Session index created"
        );
        *slot = Some(index);
        Ok(count)
    }

    /// Remove the active session, if any. Idempotent.
    pub async fn clear(&self) {
        let mut slot = self.active.write().await;
        match slot.take() {
            Some(_) => tracing::info!(collection = SESSION_COLLECTION, "Session index cleared"),
            None => tracing::debug!("Session index already empty"),
        }
    }

    /// Number of passages in the active session, or 0 when none is active.
    pub async fn count(&self) -> usize {
        self.active
            .read()
            .await
            .as_ref()
            .map(|index| index.passages.len())
            .unwrap_or(0)
    }

    /// Return the top-`k` passages for `query` under the given strategy.
    ///
    /// `k` is clamped to the number of indexed passages; requesting more than
    /// exist is not an error. Fails with [`IndexError::Unavailable`] when no
    /// session is active.
    pub async fn search(
        &self,
        query: &str,
        k: usize,
        strategy: SearchStrategy,
    ) -> Result<Vec<Passage>, IndexError> {
        let index = {
            let slot = self.active.read().await;
            slot.as_ref().cloned().ok_or(IndexError::Unavailable)?
        };

        let available = index.passages.len();
        let effective_k = k.min(available);
        if effective_k < k {
            tracing::warn!(
                requested = k,
                available,
                "Requested more passages than indexed; clamping"
            );
        }
        if effective_k == 0 {
            return Ok(Vec::new());
        }

        let query_vectors = self.embedding_client.embed(&[query.to_string()]).await?;
        let query_vector = query_vectors.into_iter().next().ok_or_else(|| {
            IndexError::Embedding(crate::embedding::EmbeddingError::InvalidResponse(
                "provider returned no vector for the query".into(),
            ))
        })?;

        let selected = match strategy {
            SearchStrategy::Similarity => {
                top_k_indices(&query_vector, &index.embeddings, effective_k)
            }
            SearchStrategy::Diversity => {
                // Rank a wider candidate pool by relevance first, then pick a
                // diverse subset out of it.
                let fetch_k = (effective_k * 4).max(MMR_MIN_FETCH).min(available);
                let pool = top_k_indices(&query_vector, &index.embeddings, fetch_k);
                let pool_embeddings: Vec<Vec<f32>> = pool
                    .iter()
                    .map(|&idx| index.embeddings[idx].clone())
                    .collect();
                maximal_marginal_relevance(&query_vector, &pool_embeddings, effective_k, MMR_LAMBDA)
                    .into_iter()
                    .map(|pool_idx| pool[pool_idx])
                    .collect()
            }
        };

        tracing::debug!(
            collection = index.collection_id,
            k = effective_k,
            strategy = ?strategy,
            "Session index searched"
        );

        Ok(selected
            .into_iter()
            .map(|idx| index.passages[idx].clone())
            .collect())
    }
}
