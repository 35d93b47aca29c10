//! Shared types and error definitions for the session index.

use crate::embedding::EmbeddingError;
use serde::Serialize;
use thiserror::Error;

/// A semantically coherent span of document text, the atomic unit of
/// indexing and retrieval.
///
/// Passages are immutable once created; ordering by `sequence_index` matches
/// the order the text appeared in the source document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passage {
    /// Text content of the passage.
    pub content: String,
    /// Zero-based position of the passage within the source document.
    pub sequence_index: usize,
    /// Identifier of the source document (typically the file path).
    pub source: String,
}

/// Search strategy used when ranking passages against a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Return the passages closest to the query, ignoring redundancy.
    Similarity,
    /// Balance relevance against redundancy (maximal marginal relevance).
    Diversity,
}

/// Errors emitted by the session index store.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Retrieval was attempted while no session is active.
    #[error("No document is indexed. Upload a document first.")]
    Unavailable,
    /// Embedding collaborator failed while building or querying the index.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingError),
}
