//! ABOUTME: Per-source normalization, chunk-id merge and final ranking
//! ABOUTME: (spec.md §4.3 stages C, D, G).

use meridian_core::types::{MergedCandidate, ScoredChunk};
use std::collections::HashMap;

/// Stage C: max-normalize one backend's raw scores. `max_score ≤ 0` maps
/// every item to 0; otherwise each score divides by the list's max. Kept as
/// max-normalization per spec.md's Open Question (not redesigned here; see
/// DESIGN.md for the richer-fusion alternative this forgoes).
#[must_use]
pub fn normalize(scores: &[f64]) -> Vec<f64> {
    let max_score = scores.iter().copied().fold(0.0_f64, f64::max);
    if max_score <= 0.0 {
        return vec![0.0; scores.len()];
    }
    scores.iter().map(|&s| s / max_score).collect()
}

/// Stage D: merge lexical and semantic hits into one map keyed by
/// `chunk_id`. A `chunk_id` present in only one source carries 0 for the
/// other source's raw and normalized score.
#[must_use]
pub fn merge(
    lexical: Vec<ScoredChunk>,
    semantic: Vec<ScoredChunk>,
) -> HashMap<String, MergedCandidate> {
    let lexical_raw: Vec<f64> = lexical.iter().map(|c| c.lexical_score.unwrap_or(0.0)).collect();
    let semantic_raw: Vec<f64> = semantic.iter().map(|c| c.semantic_score.unwrap_or(0.0)).collect();
    let lexical_norm = normalize(&lexical_raw);
    let semantic_norm = normalize(&semantic_raw);

    let mut candidates: HashMap<String, MergedCandidate> = HashMap::new();

    for (chunk, norm) in lexical.into_iter().zip(lexical_norm) {
        let entry = candidates
            .entry(chunk.chunk_id.clone())
            .or_insert_with(|| MergedCandidate::new(chunk.chunk_id.clone()));
        entry.document_id = chunk.document_id;
        entry.artefact_id = chunk.artefact_id;
        entry.content = chunk.content;
        entry.lexical_score = chunk.lexical_score.unwrap_or(0.0);
        entry.lexical_norm = norm;
    }

    for (chunk, norm) in semantic.into_iter().zip(semantic_norm) {
        let entry = candidates
            .entry(chunk.chunk_id.clone())
            .or_insert_with(|| MergedCandidate::new(chunk.chunk_id.clone()));
        entry.document_id = entry.document_id.take().or(chunk.document_id);
        entry.artefact_id = entry.artefact_id.take().or(chunk.artefact_id);
        entry.content = entry.content.take().or(chunk.content);
        entry.semantic_score = chunk.semantic_score.unwrap_or(0.0);
        entry.semantic_norm = norm;
    }

    candidates
}

/// Stage G: `final_score = lexical_weight * lexical_norm + semantic_weight
/// * semantic_norm`. Sort descending by `final_score`, ties broken by
/// `chunk_id` ascending for determinism.
pub fn rank(candidates: &mut [MergedCandidate], lexical_weight: f64, semantic_weight: f64) {
    for candidate in candidates.iter_mut() {
        candidate.final_score =
            lexical_weight * candidate.lexical_norm + semantic_weight * candidate.semantic_norm;
    }
    candidates.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
}
