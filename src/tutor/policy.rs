//! Retrieval policy: adaptive passage counts and search strategies per
//! request mode.

use crate::index::types::SearchStrategy;

/// Fraction of the corpus retrieved for summaries.
const SUMMARY_COVERAGE: f64 = 0.25;
/// Bounds on the summary retrieval count.
const SUMMARY_MIN_K: usize = 7;
const SUMMARY_MAX_K: usize = 25;
/// Fixed retrieval count for concept explanations.
const EXPLANATION_K: usize = 5;
/// Passages retrieved per quiz question.
const QUIZ_PASSAGES_PER_QUESTION: usize = 2;
/// Bounds on the quiz retrieval count.
const QUIZ_MIN_K: usize = 4;
const QUIZ_MAX_K: usize = 20;

/// Request mode driving retrieval sizing and strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Whole-document summary.
    Summary,
    /// Targeted explanation of a user query.
    Explanation,
    /// Quiz generation for the given question count.
    Quiz {
        /// Number of questions the caller asked for.
        num_questions: usize,
    },
}

/// Resolved retrieval parameters for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalPlan {
    /// Number of passages to fetch.
    pub k: usize,
    /// Search strategy to fetch them with.
    pub strategy: SearchStrategy,
}

/// Compute how many passages to retrieve and with which strategy.
///
/// Summaries scale with corpus size and use diversity-aware search to cover
/// the whole document; explanations and quizzes use pure relevance. Returns
/// `None` when the corpus is empty, since no retrieval is possible. The
/// result is already clamped against `corpus_size`; the index clamps again
/// defensively at query time.
pub fn compute_plan(mode: RequestMode, corpus_size: usize) -> Option<RetrievalPlan> {
    if corpus_size == 0 {
        return None;
    }

    let plan = match mode {
        RequestMode::Summary => {
            let proportional = (corpus_size as f64 * SUMMARY_COVERAGE).floor() as usize;
            RetrievalPlan {
                k: proportional.clamp(SUMMARY_MIN_K, SUMMARY_MAX_K),
                strategy: SearchStrategy::Diversity,
            }
        }
        RequestMode::Explanation => RetrievalPlan {
            k: EXPLANATION_K,
            strategy: SearchStrategy::Similarity,
        },
        RequestMode::Quiz { num_questions } => {
            let proportional = num_questions.saturating_mul(QUIZ_PASSAGES_PER_QUESTION);
            RetrievalPlan {
                k: proportional.clamp(QUIZ_MIN_K, QUIZ_MAX_K),
                strategy: SearchStrategy::Similarity,
            }
        }
    };

    Some(RetrievalPlan {
        k: plan.k.min(corpus_size),
        strategy: plan.strategy,
    })
}
