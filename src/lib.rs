#![deny(missing_docs)]

//! Core library for the doc-tutor session tutoring server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and the Ollama adapter.
pub mod embedding;
/// Document page extraction.
pub mod extract;
/// Text generation client abstraction and the Ollama adapter.
pub mod generation;
/// Session-scoped in-memory vector index.
pub mod index;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// Tutoring pipeline: chunking, retrieval policy, and orchestration.
pub mod tutor;
