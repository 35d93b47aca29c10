//! Structured quiz output parsing and validation.
//!
//! Generation output is untrusted text. This module extracts the JSON object
//! from it, checks the shape (four options per question, answer present among
//! the options), and fails soft: any violation yields an empty list, which
//! callers must read as "generation failed", never as "zero questions".

use serde::{Deserialize, Serialize};

/// A single validated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizItem {
    /// Question text.
    pub question: String,
    /// Exactly four candidate answers.
    pub options: Vec<String>,
    /// The correct answer; always one of `options`.
    pub answer: String,
}

#[derive(Debug, Deserialize)]
struct QuizPayload {
    quiz: Vec<QuizItem>,
}

/// Number of options every quiz item must carry.
const OPTIONS_PER_QUESTION: usize = 4;

/// Parse raw generation output into validated quiz items.
///
/// Tolerates markdown code fences and prose around the JSON object. Returns
/// an empty vector on any parse or shape failure, logging the reason.
pub fn parse_quiz(raw: &str) -> Vec<QuizItem> {
    let Some(json_slice) = extract_json_object(raw) else {
        tracing::warn!("Quiz output contained no JSON object");
        return Vec::new();
    };

    let payload: QuizPayload = match serde_json::from_str(json_slice) {
        Ok(payload) => payload,
        Err(error) => {
            tracing::warn!(error = %error, "Failed to parse quiz output");
            return Vec::new();
        }
    };

    for (idx, item) in payload.quiz.iter().enumerate() {
        if item.options.len() != OPTIONS_PER_QUESTION {
            tracing::warn!(
                question = idx,
                options = item.options.len(),
                "Quiz item does not have exactly 4 options"
            );
            return Vec::new();
        }
        if !item.options.contains(&item.answer) {
            tracing::warn!(question = idx, "Quiz answer is not among the options");
            return Vec::new();
        }
        if item.question.trim().is_empty() {
            tracing::warn!(question = idx, "Quiz item has an empty question");
            return Vec::new();
        }
    }

    if payload.quiz.is_empty() {
        tracing::warn!("Quiz output parsed to zero questions");
    }
    payload.quiz
}

/// Slice out the outermost JSON object, skipping code fences and prose.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}
