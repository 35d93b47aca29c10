//! Page-level text extraction from source documents.
//!
//! Extraction is treated as a narrow collaborator: the pipeline only needs an
//! ordered sequence of raw page texts, and everything downstream (cleaning,
//! chunking, indexing) is format-agnostic.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors raised while pulling text out of a source document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file could not be found or opened.
    #[error("Failed to read document at '{path}': {source}")]
    Io {
        /// Path supplied by the caller.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// The file was readable but its contents could not be parsed.
    #[error("Failed to extract text from '{path}': {message}")]
    Parse {
        /// Path supplied by the caller.
        path: String,
        /// Diagnostic string from the extraction backend.
        message: String,
    },
}

/// Interface implemented by document extraction backends.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    /// Return the raw text of each page in document order.
    async fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractError>;
}

/// PDF extraction backed by the `pdf-extract` crate.
pub struct PdfExtractor;

impl PdfExtractor {
    /// Construct a new PDF extractor.
    pub const fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageExtractor for PdfExtractor {
    async fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
        let display_path = path.display().to_string();
        let bytes = tokio::fs::read(path).await.map_err(|source| ExtractError::Io {
            path: display_path.clone(),
            source,
        })?;

        // pdf-extract is CPU-bound and synchronous; keep it off the runtime threads.
        let pages = tokio::task::spawn_blocking({
            let display_path = display_path.clone();
            move || {
                pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|error| {
                    ExtractError::Parse {
                        path: display_path,
                        message: error.to_string(),
                    }
                })
            }
        })
        .await
        .map_err(|join_error| ExtractError::Parse {
            path: display_path.clone(),
            message: format!("extraction task failed: {join_error}"),
        })??;

        tracing::debug!(path = %display_path, pages = pages.len(), "Extracted document pages");
        Ok(pages)
    }
}
