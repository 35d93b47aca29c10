//! HTTP surface for the document tutor.
//!
//! This module exposes a compact Axum router over the tutoring pipeline:
//!
//! - `POST /ingest` – Extract, chunk, and index a document from a filesystem
//!   path, replacing any previously loaded session. Returns
//!   `{ "passages_indexed": number }`.
//! - `GET /summary` – Generate a whole-document summary from the active session.
//! - `POST /explain` – Answer a question from the active session's content.
//! - `POST /quiz` – Generate a validated multiple-choice quiz. An empty `quiz`
//!   array signals a generation failure, never a zero-question document.
//! - `GET /metrics` – Observe ingestion counters.

use crate::tutor::{TutorApi, TutorError};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Default quiz size when the caller does not specify one.
const DEFAULT_QUIZ_QUESTIONS: usize = 5;
/// Default quiz difficulty when the caller does not specify one.
const DEFAULT_QUIZ_DIFFICULTY: &str = "medium";

/// Build the HTTP router exposing the tutoring API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: TutorApi + 'static,
{
    Router::new()
        .route("/ingest", post(ingest_document::<S>))
        .route("/summary", get(get_summary::<S>))
        .route("/explain", post(explain::<S>))
        .route("/quiz", post(generate_quiz::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .with_state(service)
}

/// Request body for the `POST /ingest` endpoint.
#[derive(Deserialize)]
struct IngestRequest {
    /// Filesystem path of the document to load.
    path: PathBuf,
}

/// Success response for the `POST /ingest` endpoint.
#[derive(Serialize)]
struct IngestResponse {
    /// Number of passages indexed for the document.
    passages_indexed: usize,
}

/// Load a document into the session index.
///
/// Any previously loaded document is discarded first; the session always
/// reflects at most the single most recent ingestion.
async fn ingest_document<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, AppError>
where
    S: TutorApi,
{
    let outcome = service.ingest(&request.path).await?;
    tracing::info!(
        path = %request.path.display(),
        passages = outcome.passage_count,
        "Ingest request completed"
    );
    Ok(Json(IngestResponse {
        passages_indexed: outcome.passage_count,
    }))
}

/// Response body for `GET /summary`.
#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
}

/// Summarize the active session's document.
async fn get_summary<S>(State(service): State<Arc<S>>) -> Result<Json<SummaryResponse>, AppError>
where
    S: TutorApi,
{
    let summary = service.summarize().await?;
    Ok(Json(SummaryResponse { summary }))
}

/// Request body for the `POST /explain` endpoint.
#[derive(Deserialize)]
struct ExplainRequest {
    /// Question to answer from the document.
    query: String,
}

/// Response body for `POST /explain`.
#[derive(Serialize)]
struct ExplainResponse {
    answer: String,
}

/// Answer a question from the active session's document.
async fn explain<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, AppError>
where
    S: TutorApi,
{
    let answer = service.explain(&request.query).await?;
    Ok(Json(ExplainResponse { answer }))
}

/// Request body for the `POST /quiz` endpoint.
#[derive(Deserialize)]
struct QuizRequest {
    /// Number of questions to generate (defaults to 5).
    #[serde(default)]
    num_questions: Option<usize>,
    /// Difficulty label passed to the generator (defaults to `"medium"`).
    #[serde(default)]
    difficulty: Option<String>,
}

/// Response body for `POST /quiz`.
#[derive(Serialize)]
struct QuizResponse {
    quiz: Vec<crate::tutor::QuizItem>,
}

/// Generate a multiple-choice quiz from the active session's document.
async fn generate_quiz<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<QuizRequest>,
) -> Result<Json<QuizResponse>, AppError>
where
    S: TutorApi,
{
    let num_questions = request
        .num_questions
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_QUIZ_QUESTIONS);
    let difficulty = request
        .difficulty
        .filter(|label| !label.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_QUIZ_DIFFICULTY.to_string());

    let quiz = service.generate_quiz(num_questions, &difficulty).await?;
    tracing::info!(
        requested = num_questions,
        produced = quiz.len(),
        %difficulty,
        "Quiz request completed"
    );
    Ok(Json(QuizResponse { quiz }))
}

/// Return ingestion counters for observability.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: TutorApi,
{
    Json(service.metrics_snapshot())
}

struct AppError(TutorError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TutorError::Extraction(_) | TutorError::EmptyDocument => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TutorError::NoActiveSession => StatusCode::CONFLICT,
            TutorError::Retrieval(_) => StatusCode::BAD_GATEWAY,
        };
        (status, self.0.to_string()).into_response()
    }
}

impl From<TutorError> for AppError {
    fn from(inner: TutorError) -> Self {
        Self(inner)
    }
}
