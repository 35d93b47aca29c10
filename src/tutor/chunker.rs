//! Semantic chunking: split normalized text into passages at topic shifts.
//!
//! The algorithm embeds each sentence, measures the cosine distance between
//! neighbors, and cuts a passage boundary wherever the distance exceeds a
//! percentile of the observed distribution. Boundaries therefore track the
//! document's own topical rhythm instead of a fixed character count.

use crate::embedding::{EmbeddingClient, EmbeddingError};
use crate::index::similarity::cosine_similarity;
use crate::index::types::Passage;

/// Splits normalized text into ordered, semantically coherent passages.
pub struct SemanticChunker<'a> {
    embedding_client: &'a dyn EmbeddingClient,
    breakpoint_percentile: f64,
}

impl<'a> SemanticChunker<'a> {
    /// Build a chunker using the given embedding collaborator and breakpoint
    /// percentile (0–100).
    pub fn new(embedding_client: &'a dyn EmbeddingClient, breakpoint_percentile: f64) -> Self {
        Self {
            embedding_client,
            breakpoint_percentile,
        }
    }

    /// Chunk `text` into passages stamped with `source` and sequential indices.
    ///
    /// Empty text yields an empty vector; a single sentence yields exactly one
    /// passage. Passages are emitted in original document order, and their
    /// concatenation reproduces the input text.
    pub async fn chunk(&self, text: &str, source: &str) -> Result<Vec<Passage>, EmbeddingError> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            tracing::warn!(source, "No sentences found in normalized text");
            return Ok(Vec::new());
        }
        if sentences.len() == 1 {
            return Ok(vec![Passage {
                content: sentences.into_iter().next().expect("one sentence"),
                sequence_index: 0,
                source: source.to_string(),
            }]);
        }

        let embeddings = self.embedding_client.embed(&sentences).await?;

        let distances: Vec<f32> = embeddings
            .windows(2)
            .map(|pair| 1.0 - cosine_similarity(&pair[0], &pair[1]))
            .collect();
        let threshold = percentile(&distances, self.breakpoint_percentile);

        let mut passages = Vec::new();
        let mut current: Vec<&str> = vec![&sentences[0]];
        for (idx, sentence) in sentences.iter().enumerate().skip(1) {
            if distances[idx - 1] > threshold {
                passages.push(current.join(" "));
                current = Vec::new();
            }
            current.push(sentence);
        }
        passages.push(current.join(" "));

        tracing::info!(
            source,
            sentences = sentences.len(),
            passages = passages.len(),
            threshold,
            percentile = self.breakpoint_percentile,
            "Semantic chunking complete"
        );

        Ok(passages
            .into_iter()
            .enumerate()
            .map(|(sequence_index, content)| Passage {
                content,
                sequence_index,
                source: source.to_string(),
            })
            .collect())
    }
}

/// Split text into sentence-level units.
///
/// A sentence ends at `.`, `!`, or `?` (plus any trailing closing quotes or
/// brackets) followed by whitespace. Abbreviations split conservatively,
/// which is acceptable: units only seed the distance distribution, and
/// over-segmentation merges back at the passage level.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let mut end = idx + ch.len_utf8();
        while let Some(&(next_idx, next_ch)) = chars.peek() {
            if matches!(next_ch, '"' | '\'' | ')' | ']' | '”' | '’') {
                chars.next();
                end = next_idx + next_ch.len_utf8();
            } else {
                break;
            }
        }
        if let Some(&(_, next_ch)) = chars.peek() {
            if next_ch.is_whitespace() {
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() {
                        chars.next();
                    } else {
                        break;
                    }
                }
                start = chars.peek().map(|&(i, _)| i).unwrap_or(text.len());
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Percentile of `values` with linear interpolation between ranks.
///
/// Returns 0.0 for an empty slice.
pub fn percentile(values: &[f32], p: f64) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let fraction = (rank - lower as f64) as f32;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
