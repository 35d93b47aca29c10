//! Text-generation client abstraction and the Ollama-backed adapter.
//!
//! The adapter mirrors the embedding client: a single blocking HTTP call per
//! prompt, bounded by an explicit timeout, with transient failures retried a
//! fixed number of times. Streaming is deliberately not used; each request
//! runs to completion or failure.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF_MS: u64 = 250;

/// Errors surfaced while attempting text generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Provider could not be reached after exhausting retries.
    #[error("Generation provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate text: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Prompt and sampling parameters passed to the generation provider.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Prompt assembled by the orchestration layer.
    pub prompt: String,
    /// Sampling temperature; lower values favor factual output.
    pub temperature: f32,
}

/// Interface implemented by text-generation providers.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate a completion for the supplied prompt.
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

/// Build a generation client based on configuration.
pub fn get_generation_client() -> Box<dyn GenerationClient + Send + Sync> {
    let config = get_config();
    Box::new(OllamaGenerationClient::new(
        config.ollama_url.clone(),
        config.generation_model.clone(),
        Duration::from_secs(config.request_timeout_secs),
    ))
}

/// Generation adapter for a local Ollama runtime.
pub struct OllamaGenerationClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerationClient {
    /// Construct a client targeting the given Ollama base URL and model.
    pub fn new(base_url: String, model: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .user_agent("doc-tutor/generate")
            .timeout(timeout)
            .build()
            .expect("Failed to construct reqwest::Client for generation");
        Self {
            http,
            base_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl GenerationClient for OllamaGenerationClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let payload = json!({
            "model": self.model,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "temperature": request.temperature,
            }
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
                        "Generation request failed; retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64))
                        .await;
                    continue;
                }
            };

            if response.status().is_server_error() && attempt < MAX_ATTEMPTS {
                let status = response.status();
                tracing::warn!(attempt, %status, "Generation provider error; retrying");
                tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64)).await;
                continue;
            }

            if response.status() == StatusCode::NOT_FOUND {
                return Err(GenerationError::ProviderUnavailable(format!(
                    "Ollama endpoint {} returned 404",
                    self.endpoint()
                )));
            }

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(GenerationError::GenerationFailed(format!(
                    "Ollama returned {status}: {body}"
                )));
            }

            let body: OllamaGenerateResponse = response.json().await.map_err(|error| {
                GenerationError::InvalidResponse(format!(
                    "failed to decode Ollama response: {error}"
                ))
            })?;

            if !body.done {
                return Err(GenerationError::InvalidResponse(
                    "Ollama response incomplete (streaming not supported)".into(),
                ));
            }

            return Ok(body.response.trim().to_string());
        }

        Err(GenerationError::ProviderUnavailable(last_transport_error))
    }
}
