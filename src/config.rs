use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the doc-tutor server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the Ollama runtime serving embeddings and generation.
    pub ollama_url: String,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors.
    pub embedding_dimension: usize,
    /// Generation model identifier used for summaries, explanations, and quizzes.
    pub generation_model: String,
    /// Percentile of the neighbor-distance distribution used as the chunk
    /// breakpoint threshold. Higher values produce fewer, larger passages.
    pub chunk_breakpoint_percentile: f64,
    /// Timeout applied to each collaborator HTTP request, in seconds.
    pub request_timeout_secs: u64,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_BREAKPOINT_PERCENTILE: f64 = 80.0;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let chunk_breakpoint_percentile = load_env_optional("CHUNK_BREAKPOINT_PERCENTILE")
            .map(|value| {
                value.parse::<f64>().map_err(|_| {
                    ConfigError::InvalidValue("CHUNK_BREAKPOINT_PERCENTILE".to_string())
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_BREAKPOINT_PERCENTILE);
        if !(0.0..=100.0).contains(&chunk_breakpoint_percentile) {
            return Err(ConfigError::InvalidValue(
                "CHUNK_BREAKPOINT_PERCENTILE".to_string(),
            ));
        }

        Ok(Self {
            ollama_url: load_env_optional("OLLAMA_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            embedding_model: load_env("EMBEDDING_MODEL")?,
            embedding_dimension: load_env("EMBEDDING_DIMENSION")?
                .parse()
                .map_err(|_| ConfigError::InvalidValue("EMBEDDING_DIMENSION".to_string()))?,
            generation_model: load_env("GENERATION_MODEL")?,
            chunk_breakpoint_percentile,
            request_timeout_secs: load_env_optional("REQUEST_TIMEOUT_SECS")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".into()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        ollama_url = %config.ollama_url,
        embedding_model = %config.embedding_model,
        generation_model = %config.generation_model,
        breakpoint_percentile = config.chunk_breakpoint_percentile,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
