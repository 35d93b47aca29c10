//! Tutoring service coordinating extraction, chunking, indexing, retrieval,
//! and generation.

use crate::{
    config::get_config,
    embedding::{EmbeddingClient, get_embedding_client},
    extract::{PageExtractor, PdfExtractor},
    generation::{GenerationClient, GenerationRequest, get_generation_client},
    index::SessionIndexStore,
    metrics::{IngestMetrics, MetricsSnapshot},
    tutor::{
        chunker::SemanticChunker,
        normalize::normalize_pages,
        policy::{RequestMode, compute_plan},
        prompts::{
            GENERATION_FAILURE_MESSAGE, NO_SESSION_MESSAGE, QUIZ_QUERY, SUMMARY_QUERY,
            build_explanation_prompt, build_quiz_prompt, build_summary_prompt, format_context,
        },
        quiz::{QuizItem, parse_quiz},
        types::{IngestOutcome, TutorError},
    },
};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Sampling temperature for summaries.
const SUMMARY_TEMPERATURE: f32 = 0.3;
/// Sampling temperature for concept explanations.
const EXPLANATION_TEMPERATURE: f32 = 0.2;
/// Sampling temperature for quiz generation.
const QUIZ_TEMPERATURE: f32 = 0.7;

/// Coordinates the full tutoring pipeline: page extraction, normalization,
/// semantic chunking, session indexing, adaptive retrieval, and generation.
///
/// The service owns long-lived handles to its collaborators so that every
/// HTTP handler reuses the same components. Construct it once near process
/// start and share it through an `Arc`.
pub struct TutorService {
    extractor: Box<dyn PageExtractor>,
    embedding_client: Arc<dyn EmbeddingClient + Send + Sync>,
    generation_client: Box<dyn GenerationClient + Send + Sync>,
    store: SessionIndexStore,
    metrics: Arc<IngestMetrics>,
    breakpoint_percentile: f64,
}

/// Abstraction over the tutoring pipeline used by the HTTP surface.
#[async_trait]
pub trait TutorApi: Send + Sync {
    /// Extract, chunk, and index the document at `path`, replacing any
    /// previously indexed session.
    async fn ingest(&self, path: &Path) -> Result<IngestOutcome, TutorError>;

    /// Produce a whole-document summary from the active session.
    async fn summarize(&self) -> Result<String, TutorError>;

    /// Answer a user question from the active session's content.
    async fn explain(&self, question: &str) -> Result<String, TutorError>;

    /// Generate a validated multiple-choice quiz from the active session.
    ///
    /// An empty result means generation or validation failed, not that the
    /// document supports zero questions.
    async fn generate_quiz(
        &self,
        num_questions: usize,
        difficulty: &str,
    ) -> Result<Vec<QuizItem>, TutorError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl TutorService {
    /// Build a service wired to the configured collaborators.
    pub fn new() -> Self {
        let config = get_config();
        tracing::info!("Initializing tutoring collaborators");
        Self::with_components(
            Box::new(PdfExtractor::new()),
            get_embedding_client(),
            get_generation_client(),
            config.chunk_breakpoint_percentile,
        )
    }

    /// Build a service from explicit collaborators.
    pub fn with_components(
        extractor: Box<dyn PageExtractor>,
        embedding_client: Arc<dyn EmbeddingClient + Send + Sync>,
        generation_client: Box<dyn GenerationClient + Send + Sync>,
        breakpoint_percentile: f64,
    ) -> Self {
        let store = SessionIndexStore::new(Arc::clone(&embedding_client));
        Self {
            extractor,
            embedding_client,
            generation_client,
            store,
            metrics: Arc::new(IngestMetrics::new()),
            breakpoint_percentile,
        }
    }

    /// Retrieve passages for `mode`, assemble `build` into a prompt, and
    /// generate a reply. Soft-fails: no session and generation errors both
    /// turn into user-facing messages rather than HTTP errors.
    async fn answer(
        &self,
        mode: RequestMode,
        query: &str,
        temperature: f32,
        build: impl Fn(&str) -> String,
    ) -> Result<String, TutorError> {
        let corpus_size = self.store.count().await;
        let Some(plan) = compute_plan(mode, corpus_size) else {
            return Ok(NO_SESSION_MESSAGE.to_string());
        };

        let passages = match self.store.search(query, plan.k, plan.strategy).await {
            Ok(passages) => passages,
            // The session can be cleared between the count and the search.
            Err(crate::index::IndexError::Unavailable) => {
                return Ok(NO_SESSION_MESSAGE.to_string());
            }
            Err(error) => return Err(error.into()),
        };

        let prompt = build(&format_context(&passages));
        match self
            .generation_client
            .generate(GenerationRequest {
                prompt,
                temperature,
            })
            .await
        {
            Ok(reply) => Ok(reply),
            Err(error) => {
                tracing::warn!(error = %error, mode = ?mode, "Generation failed");
                Ok(GENERATION_FAILURE_MESSAGE.to_string())
            }
        }
    }
}

impl Default for TutorService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TutorApi for TutorService {
    async fn ingest(&self, path: &Path) -> Result<IngestOutcome, TutorError> {
        tracing::info!(path = %path.display(), "Ingesting document");
        let pages = self.extractor.extract_pages(path).await?;
        let text = normalize_pages(&pages)?;

        let chunker =
            SemanticChunker::new(self.embedding_client.as_ref(), self.breakpoint_percentile);
        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let passages = chunker.chunk(&text, &source).await?;

        let passage_count = self.store.replace(passages).await?;
        self.metrics.record_document(passage_count as u64);
        tracing::info!(%source, passages = passage_count, "Document ingested");
        Ok(IngestOutcome { passage_count })
    }

    async fn summarize(&self) -> Result<String, TutorError> {
        self.answer(
            RequestMode::Summary,
            SUMMARY_QUERY,
            SUMMARY_TEMPERATURE,
            build_summary_prompt,
        )
        .await
    }

    async fn explain(&self, question: &str) -> Result<String, TutorError> {
        self.answer(
            RequestMode::Explanation,
            question,
            EXPLANATION_TEMPERATURE,
            |context| build_explanation_prompt(context, question),
        )
        .await
    }

    async fn generate_quiz(
        &self,
        num_questions: usize,
        difficulty: &str,
    ) -> Result<Vec<QuizItem>, TutorError> {
        let corpus_size = self.store.count().await;
        let plan = compute_plan(RequestMode::Quiz { num_questions }, corpus_size)
            .ok_or(TutorError::NoActiveSession)?;

        let passages = self.store.search(QUIZ_QUERY, plan.k, plan.strategy).await?;
        let prompt = build_quiz_prompt(&format_context(&passages), difficulty, num_questions);

        let raw = match self
            .generation_client
            .generate(GenerationRequest {
                prompt,
                temperature: QUIZ_TEMPERATURE,
            })
            .await
        {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(error = %error, "Quiz generation failed");
                return Ok(Vec::new());
            }
        };

        let items = parse_quiz(&raw);
        if !items.is_empty() && items.len() != num_questions {
            tracing::warn!(
                requested = num_questions,
                produced = items.len(),
                "Quiz question count differs from request"
            );
        }
        Ok(items)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingError;
    use crate::extract::ExtractError;
    use crate::generation::GenerationError;
    use crate::tutor::prompts::REFUSAL_SENTENCE;
    use serde_json::json;
    use tokio::sync::Mutex;

    const DIMENSION: usize = 4;

    /// Deterministic embeddings: hash text bytes into vector slots so equal
    /// texts embed equally and distinct texts diverge.
    struct StubEmbeddings;

    #[async_trait]
    impl EmbeddingClient for StubEmbeddings {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|text| {
                    let mut embedding = vec![0.1_f32; DIMENSION];
                    for (idx, byte) in text.bytes().enumerate() {
                        embedding[idx % DIMENSION] += f32::from(byte) / 255.0;
                    }
                    embedding
                })
                .collect())
        }
    }

    struct StubExtractor {
        pages: Vec<String>,
    }

    #[async_trait]
    impl PageExtractor for StubExtractor {
        async fn extract_pages(&self, _path: &Path) -> Result<Vec<String>, ExtractError> {
            Ok(self.pages.clone())
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl PageExtractor for FailingExtractor {
        async fn extract_pages(&self, path: &Path) -> Result<Vec<String>, ExtractError> {
            Err(ExtractError::Parse {
                path: path.display().to_string(),
                message: "not a PDF".into(),
            })
        }
    }

    /// Records prompts and replies with a fixed response.
    struct StubGeneration {
        reply: Result<String, GenerationError>,
        prompts: Mutex<Vec<GenerationRequest>>,
    }

    impl StubGeneration {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(GenerationError::ProviderUnavailable("down".into())),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationClient for StubGeneration {
        async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
            self.prompts.lock().await.push(request);
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(GenerationError::ProviderUnavailable(message)) => {
                    Err(GenerationError::ProviderUnavailable(message.clone()))
                }
                Err(_) => Err(GenerationError::GenerationFailed("stub".into())),
            }
        }
    }

    fn service_with(
        extractor: Box<dyn PageExtractor>,
        generation: Box<dyn GenerationClient + Send + Sync>,
    ) -> TutorService {
        TutorService::with_components(extractor, Arc::new(StubEmbeddings), generation, 80.0)
    }

    fn pages(text: &str) -> Box<StubExtractor> {
        Box::new(StubExtractor {
            pages: vec![text.to_string()],
        })
    }

    const DOC: &str = "The ocean is deep. The ocean has waves. Compilers parse code. \
                       Compilers emit errors. Tea is brewed hot. Tea has caffeine.";

    #[tokio::test]
    async fn ingest_indexes_passages_and_records_metrics() {
        let service = service_with(pages(DOC), Box::new(StubGeneration::replying("unused")));
        let outcome = service.ingest(Path::new("notes.pdf")).await.expect("ingest");

        assert!(outcome.passage_count >= 1);
        let snapshot = service.metrics_snapshot();
        assert_eq!(snapshot.documents_ingested, 1);
        assert_eq!(snapshot.last_passage_count, outcome.passage_count as u64);
    }

    #[tokio::test]
    async fn ingest_replaces_previous_session() {
        let service = service_with(pages(DOC), Box::new(StubGeneration::replying("unused")));
        service.ingest(Path::new("first.pdf")).await.expect("first");
        service.ingest(Path::new("second.pdf")).await.expect("second");

        assert_eq!(service.metrics_snapshot().documents_ingested, 2);
    }

    #[tokio::test]
    async fn ingest_propagates_extraction_failure() {
        let service = service_with(
            Box::new(FailingExtractor),
            Box::new(StubGeneration::replying("unused")),
        );
        let error = service
            .ingest(Path::new("broken.pdf"))
            .await
            .expect_err("extraction failure");
        assert!(matches!(error, TutorError::Extraction(_)));
    }

    #[tokio::test]
    async fn ingest_rejects_blank_document() {
        let service = service_with(pages("   \n  "), Box::new(StubGeneration::replying("unused")));
        let error = service
            .ingest(Path::new("blank.pdf"))
            .await
            .expect_err("empty document");
        assert!(matches!(error, TutorError::EmptyDocument));
    }

    #[tokio::test]
    async fn summarize_without_session_returns_guidance() {
        let service = service_with(pages(DOC), Box::new(StubGeneration::replying("unused")));
        let reply = service.summarize().await.expect("summarize");
        assert_eq!(reply, NO_SESSION_MESSAGE);
    }

    #[tokio::test]
    async fn summarize_feeds_retrieved_context_to_generation() {
        let generation = Box::new(StubGeneration::replying("A fine summary."));
        let service = TutorService::with_components(
            pages(DOC),
            Arc::new(StubEmbeddings),
            generation,
            80.0,
        );
        service.ingest(Path::new("notes.pdf")).await.expect("ingest");

        let reply = service.summarize().await.expect("summarize");
        assert_eq!(reply, "A fine summary.");
    }

    #[tokio::test]
    async fn summarize_soft_fails_on_generation_error() {
        let service = service_with(pages(DOC), Box::new(StubGeneration::failing()));
        service.ingest(Path::new("notes.pdf")).await.expect("ingest");

        let reply = service.summarize().await.expect("summarize");
        assert_eq!(reply, GENERATION_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn explain_without_session_returns_guidance() {
        let service = service_with(pages(DOC), Box::new(StubGeneration::replying("unused")));
        let reply = service.explain("what is an ocean?").await.expect("explain");
        assert_eq!(reply, NO_SESSION_MESSAGE);
    }

    #[tokio::test]
    async fn explain_embeds_question_and_refusal_contract() {
        let prompts = Arc::new(Mutex::new(Vec::new()));

        struct Capture {
            prompts: Arc<Mutex<Vec<GenerationRequest>>>,
        }

        #[async_trait]
        impl GenerationClient for Capture {
            async fn generate(
                &self,
                request: GenerationRequest,
            ) -> Result<String, GenerationError> {
                self.prompts.lock().await.push(request);
                Ok("answer".into())
            }
        }

        let service = TutorService::with_components(
            pages(DOC),
            Arc::new(StubEmbeddings),
            Box::new(Capture {
                prompts: Arc::clone(&prompts),
            }),
            80.0,
        );
        service.ingest(Path::new("notes.pdf")).await.expect("ingest");
        service.explain("what is an ocean?").await.expect("explain");

        let recorded = prompts.lock().await;
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].prompt.contains("what is an ocean?"));
        assert!(recorded[0].prompt.contains(REFUSAL_SENTENCE));
        assert!((recorded[0].temperature - EXPLANATION_TEMPERATURE).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn quiz_without_session_is_an_error() {
        let service = service_with(pages(DOC), Box::new(StubGeneration::replying("unused")));
        let error = service
            .generate_quiz(3, "medium")
            .await
            .expect_err("no session");
        assert!(matches!(error, TutorError::NoActiveSession));
    }

    #[tokio::test]
    async fn quiz_returns_validated_items() {
        let payload = json!({
            "quiz": [{
                "question": "What parses code?",
                "options": ["Compilers", "Oceans", "Tea", "Waves"],
                "answer": "Compilers"
            }]
        })
        .to_string();
        let service = service_with(pages(DOC), Box::new(StubGeneration::replying(&payload)));
        service.ingest(Path::new("notes.pdf")).await.expect("ingest");

        let items = service.generate_quiz(1, "easy").await.expect("quiz");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].answer, "Compilers");
    }

    #[tokio::test]
    async fn quiz_soft_fails_to_empty_on_generation_error() {
        let service = service_with(pages(DOC), Box::new(StubGeneration::failing()));
        service.ingest(Path::new("notes.pdf")).await.expect("ingest");

        let items = service.generate_quiz(3, "medium").await.expect("quiz");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn quiz_soft_fails_to_empty_on_malformed_output() {
        let service = service_with(
            pages(DOC),
            Box::new(StubGeneration::replying("sorry, no quiz today")),
        );
        service.ingest(Path::new("notes.pdf")).await.expect("ingest");

        let items = service.generate_quiz(2, "hard").await.expect("quiz");
        assert!(items.is_empty());
    }
}
