//! Embedding client abstraction and the Ollama-backed adapter.
//!
//! Embeddings are a blocking, network-bound collaborator. The adapter issues
//! HTTP requests directly to the runtime with an explicit timeout and retries
//! transient failures a bounded number of times before giving up.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF_MS: u64 = 250;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Provider could not be reached after exhausting retries.
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed or did not match the input.
    #[error("Malformed embedding response: {0}")]
    InvalidResponse(String),
    /// Returned embedding dimension does not match configuration.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected embedding dimension configured on the server.
        expected: usize,
        /// Actual embedding dimension produced by the provider.
        actual: usize,
    },
}

/// Interface implemented by embedding backends.
///
/// Implementations must return one vector per input text, in input order.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Build an embedding client suitable for the current configuration.
pub fn get_embedding_client() -> Arc<dyn EmbeddingClient + Send + Sync> {
    let config = get_config();
    Arc::new(OllamaEmbeddingClient::new(
        config.ollama_url.clone(),
        config.embedding_model.clone(),
        config.embedding_dimension,
        Duration::from_secs(config.request_timeout_secs),
    ))
}

/// Embedding adapter for a local Ollama runtime.
pub struct OllamaEmbeddingClient {
    http: Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbeddingClient {
    /// Construct a client targeting the given Ollama base URL and model.
    pub fn new(base_url: String, model: String, dimension: usize, timeout: Duration) -> Self {
        let http = Client::builder()
            .user_agent("doc-tutor/embed")
            .timeout(timeout)
            .build()
            .expect("Failed to construct reqwest::Client for embeddings");
        Self {
            http,
            base_url,
            model,
            dimension,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embed", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let payload = json!({
            "model": self.model,
            "input": texts,
        });

        let mut last_transport_error = String::new();
        for attempt in 1..=MAX_ATTEMPTS {
            let response = match self.http.post(self.endpoint()).json(&payload).send().await {
                Ok(response) => response,
                Err(error) => {
                    last_transport_error =
                        format!("failed to reach Ollama at {}: {error}", self.base_url);
                    tracing::warn!(
                        attempt,
                        error = %error,
                        "Embedding request failed; retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64))
                        .await;
                    continue;
                }
            };

            if response.status().is_server_error() && attempt < MAX_ATTEMPTS {
                let status = response.status();
                tracing::warn!(attempt, %status, "Embedding provider error; retrying");
                tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64)).await;
                continue;
            }

            if response.status() == StatusCode::NOT_FOUND {
                return Err(EmbeddingError::ProviderUnavailable(format!(
                    "Ollama endpoint {} returned 404",
                    self.endpoint()
                )));
            }

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(EmbeddingError::GenerationFailed(format!(
                    "Ollama returned {status}: {body}"
                )));
            }

            let body: OllamaEmbedResponse = response.json().await.map_err(|error| {
                EmbeddingError::InvalidResponse(format!(
                    "failed to decode Ollama embed response: {error}"
                ))
            })?;

            if body.embeddings.len() != texts.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    body.embeddings.len()
                )));
            }

            for vector in &body.embeddings {
                if vector.len() != self.dimension {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: self.dimension,
                        actual: vector.len(),
                    });
                }
            }

            return Ok(body.embeddings);
        }

        Err(EmbeddingError::ProviderUnavailable(last_transport_error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client_for(server: &MockServer, dimension: usize) -> OllamaEmbeddingClient {
        OllamaEmbeddingClient::new(
            server.base_url(),
            "embed-model".into(),
            dimension,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn embed_returns_vectors_in_order() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embed");
                then.status(200).json_body(json!({
                    "embeddings": [[1.0, 0.0], [0.0, 1.0]]
                }));
            })
            .await;

        let client = client_for(&server, 2);
        let vectors = client
            .embed(&["alpha".into(), "beta".into()])
            .await
            .expect("embeddings");

        mock.assert();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn embed_rejects_dimension_mismatch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embed");
                then.status(200).json_body(json!({
                    "embeddings": [[1.0, 0.0, 0.0]]
                }));
            })
            .await;

        let client = client_for(&server, 2);
        let error = client
            .embed(&["alpha".into()])
            .await
            .expect_err("dimension mismatch");

        assert!(matches!(
            error,
            EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn embed_rejects_count_mismatch() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embed");
                then.status(200).json_body(json!({
                    "embeddings": [[1.0, 0.0]]
                }));
            })
            .await;

        let client = client_for(&server, 2);
        let error = client
            .embed(&["alpha".into(), "beta".into()])
            .await
            .expect_err("count mismatch");

        assert!(matches!(error, EmbeddingError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn embed_surfaces_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embed");
                then.status(400).body("bad request");
            })
            .await;

        let client = client_for(&server, 2);
        let error = client.embed(&["alpha".into()]).await.expect_err("error");
        assert!(matches!(error, EmbeddingError::GenerationFailed(_)));
    }

    #[tokio::test]
    async fn embed_retries_transient_server_errors() {
        let server = MockServer::start_async().await;
        let failing = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embed");
                then.status(500).body("overloaded");
            })
            .await;

        let client = client_for(&server, 2);
        let error = client.embed(&["alpha".into()]).await.expect_err("error");

        // The final attempt surfaces the 500 as a generation failure.
        assert!(matches!(error, EmbeddingError::GenerationFailed(_)));
        assert_eq!(failing.hits_async().await, MAX_ATTEMPTS as usize);
    }

    #[tokio::test]
    async fn embed_skips_request_for_empty_input() {
        let server = MockServer::start_async().await;
        let client = client_for(&server, 2);
        let vectors = client.embed(&[]).await.expect("empty input");
        assert!(vectors.is_empty());
    }
}
