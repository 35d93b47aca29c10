//! Vector similarity primitives: cosine similarity, top-k ranking, and
//! maximal marginal relevance selection.

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero magnitude, so degenerate
/// embeddings rank last instead of poisoning the ordering with NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Indices of the `k` candidates most similar to the query, best first.
pub fn top_k_indices(query: &[f32], candidates: &[Vec<f32>], k: usize) -> Vec<usize> {
    let mut scored: Vec<(usize, f32)> = candidates
        .iter()
        .enumerate()
        .map(|(idx, vector)| (idx, cosine_similarity(query, vector)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored.into_iter().map(|(idx, _)| idx).collect()
}

/// Select up to `k` candidate indices by maximal marginal relevance.
///
/// Greedy selection: start from the most query-similar candidate, then
/// repeatedly add the candidate maximizing
/// `lambda * sim(query, c) - (1 - lambda) * max(sim(c, selected))`.
/// `lambda` of 1.0 degenerates to pure similarity ranking; 0.0 to pure
/// diversity.
pub fn maximal_marginal_relevance(
    query: &[f32],
    candidates: &[Vec<f32>],
    k: usize,
    lambda: f32,
) -> Vec<usize> {
    let effective_k = k.min(candidates.len());
    if effective_k == 0 {
        return Vec::new();
    }

    let similarities: Vec<f32> = candidates
        .iter()
        .map(|vector| cosine_similarity(query, vector))
        .collect();

    let mut best_idx = 0;
    let mut best_similarity = similarities[0];
    for (idx, &sim) in similarities.iter().enumerate().skip(1) {
        if sim > best_similarity {
            best_similarity = sim;
            best_idx = idx;
        }
    }

    let mut selected = vec![best_idx];

    while selected.len() < effective_k {
        let mut best_score = f32::NEG_INFINITY;
        let mut idx_to_add = usize::MAX;

        for (candidate, &query_score) in similarities.iter().enumerate() {
            if selected.contains(&candidate) {
                continue;
            }
            let redundancy = selected
                .iter()
                .map(|&chosen| cosine_similarity(&candidates[candidate], &candidates[chosen]))
                .fold(f32::NEG_INFINITY, f32::max);
            let score = lambda * query_score - (1.0 - lambda) * redundancy;
            if score > best_score {
                best_score = score;
                idx_to_add = candidate;
            }
        }

        if idx_to_add == usize::MAX {
            break;
        }
        selected.push(idx_to_add);
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_matches_known_values() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn top_k_orders_by_similarity() {
        let query = vec![1.0, 0.0];
        let candidates = vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.7, 0.7],
        ];
        assert_eq!(top_k_indices(&query, &candidates, 2), vec![1, 2]);
    }

    #[test]
    fn top_k_clamps_to_candidate_count() {
        let query = vec![1.0, 0.0];
        let candidates = vec![vec![1.0, 0.0]];
        assert_eq!(top_k_indices(&query, &candidates, 5), vec![0]);
    }

    #[test]
    fn mmr_prefers_diverse_candidates() {
        let query = vec![1.0, 0.0, 0.0];
        // All candidates are equally relevant (cosine 0.8 to the query); the
        // second is a duplicate of the first, the third points away from it.
        let candidates = vec![
            vec![0.8, 0.6, 0.0],
            vec![0.8, 0.6, 0.0],
            vec![0.8, -0.6, 0.0],
        ];
        let selected = maximal_marginal_relevance(&query, &candidates, 2, 0.5);
        assert_eq!(selected, vec![0, 2]);
    }

    #[test]
    fn mmr_with_full_lambda_matches_similarity_ranking() {
        let query = vec![1.0, 0.0];
        let candidates = vec![
            vec![0.5, 0.5],
            vec![1.0, 0.0],
            vec![0.9, 0.1],
        ];
        let selected = maximal_marginal_relevance(&query, &candidates, 3, 1.0);
        assert_eq!(selected, vec![1, 2, 0]);
    }

    #[test]
    fn mmr_handles_empty_candidates() {
        let selected = maximal_marginal_relevance(&[1.0, 0.0], &[], 3, 0.5);
        assert!(selected.is_empty());
    }
}
