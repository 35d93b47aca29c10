//! Core data types and error definitions for the tutoring pipeline.

use crate::embedding::EmbeddingError;
use crate::extract::ExtractError;
use crate::index::IndexError;
use crate::tutor::normalize::EmptyDocumentError;
use thiserror::Error;

/// Errors emitted by the tutoring pipeline.
#[derive(Debug, Error)]
pub enum TutorError {
    /// Page extraction failed before any text reached the pipeline.
    #[error("Failed to extract document text: {0}")]
    Extraction(#[from] ExtractError),
    /// The document produced no usable text after cleaning.
    #[error("No readable text found in the document")]
    EmptyDocument,
    /// A request needing an indexed document arrived with no session active.
    #[error("No document is loaded. Please upload a document first.")]
    NoActiveSession,
    /// Embedding the document or a query failed.
    #[error("Failed to generate embeddings: {0}")]
    Retrieval(#[from] EmbeddingError),
}

impl From<EmptyDocumentError> for TutorError {
    fn from(_: EmptyDocumentError) -> Self {
        Self::EmptyDocument
    }
}

impl From<IndexError> for TutorError {
    fn from(error: IndexError) -> Self {
        match error {
            IndexError::Unavailable => Self::NoActiveSession,
            IndexError::Embedding(inner) => Self::Retrieval(inner),
        }
    }
}

/// Summary of a completed ingestion produced by
/// [`crate::tutor::TutorService::ingest`].
#[derive(Debug, Clone, Copy)]
pub struct IngestOutcome {
    /// Number of passages indexed for the document.
    pub passage_count: usize,
}
