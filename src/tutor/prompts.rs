//! Mode-specific prompt templates and context formatting.
//!
//! The templates are the only place the generator's behavioral contract is
//! expressed: context-only answers, the fixed refusal sentence for
//! explanations, and the exact JSON shape for quizzes. The core does not
//! verify groundedness; it instructs the generator and validates structure
//! where structure exists (quiz mode).

use crate::index::types::Passage;

/// Separator placed between retrieved passages in the prompt context.
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Generic retrieval query used for whole-document summaries.
pub const SUMMARY_QUERY: &str = "a comprehensive overview of the entire document";

/// Generic retrieval query used for quiz generation.
pub const QUIZ_QUERY: &str = "key concepts, definitions, and important details";

/// User-facing reply when no document has been ingested yet.
pub const NO_SESSION_MESSAGE: &str =
    "No document is loaded. Please upload a document first.";

/// User-facing reply when the generation collaborator fails.
pub const GENERATION_FAILURE_MESSAGE: &str =
    "An error occurred while processing your request. Please try again.";

/// Fixed sentence the generator must emit when the context is insufficient.
pub const REFUSAL_SENTENCE: &str =
    "Based on the provided document, I cannot answer this question.";

/// Join retrieved passage contents into a single context block.
pub fn format_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|passage| passage.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Prompt for whole-document summaries.
pub fn build_summary_prompt(context: &str) -> String {
    format!(
        "You are an expert AI tutor. Write a clear, well-structured summary of the document \
         excerpts below. Cover the main themes and key points in the order they appear. Base the \
         summary only on the provided excerpts and do not add outside information.\n\n\
         CONTEXT:\n{context}\n\nSUMMARY:"
    )
}

/// Prompt for explaining a concept in response to a user question.
pub fn build_explanation_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an expert AI tutor. Your task is to answer the user's question based *only* on \
         the provided document context.\n\n\
         Provide a detailed, clear, and helpful answer. If the information to answer the question \
         is not present in the context, you MUST state: \"{REFUSAL_SENTENCE}\" \
         Do not add any information that is not from the context.\n\n\
         CONTEXT:\n{context}\n\nQUESTION:\n{question}\n\nANSWER:"
    )
}

/// Prompt for structured quiz generation.
pub fn build_quiz_prompt(context: &str, difficulty: &str, num_questions: usize) -> String {
    format!(
        "You are an expert AI tutor creating a quiz. Using *only* the document context below, \
         write exactly {num_questions} multiple-choice questions at {difficulty} difficulty. \
         Every question must have exactly 4 options, exactly one of which is correct, and the \
         correct option must be copied verbatim into the answer field.\n\n\
         Respond with a single JSON object and nothing else, in this exact shape:\n\
         {{\"quiz\": [{{\"question\": \"...\", \"options\": [\"...\", \"...\", \"...\", \"...\"], \
         \"answer\": \"...\"}}]}}\n\n\
         CONTEXT:\n{context}\n\nQUIZ:"
    )
}
