//! Pre-merge and merged candidate types shared between backends and the
//! hybrid search orchestrator.

use serde::{Deserialize, Serialize};

/// A single scored hit returned by either backend, before merging. Identity
/// is `chunk_id`; exactly one of `lexical_score`/`semantic_score` is
/// populated (and positive) by any given backend call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub document_id: Option<String>,
    pub artefact_id: Option<String>,
    pub content: Option<String>,
    pub lexical_score: Option<f64>,
    pub semantic_score: Option<f64>,
}

impl ScoredChunk {
    #[must_use]
    pub fn lexical(
        chunk_id: impl Into<String>,
        document_id: impl Into<String>,
        artefact_id: Option<String>,
        content: Option<String>,
        score: f64,
    ) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            document_id: Some(document_id.into()),
            artefact_id,
            content,
            lexical_score: Some(score),
            semantic_score: None,
        }
    }

    #[must_use]
    pub fn semantic(
        chunk_id: impl Into<String>,
        document_id: Option<String>,
        artefact_id: Option<String>,
        score: f64,
    ) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            document_id,
            artefact_id,
            content: None,
            lexical_score: None,
            semantic_score: Some(score),
        }
    }
}

/// A candidate owned by the orchestrator for the lifetime of one query,
/// after merging lexical and semantic hits by `chunk_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedCandidate {
    pub chunk_id: String,
    pub document_id: Option<String>,
    pub artefact_id: Option<String>,
    pub content: Option<String>,
    pub lexical_score: f64,
    pub semantic_score: f64,
    pub lexical_norm: f64,
    pub semantic_norm: f64,
    pub final_score: f64,
}

impl MergedCandidate {
    #[must_use]
    pub fn new(chunk_id: impl Into<String>) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            document_id: None,
            artefact_id: None,
            content: None,
            lexical_score: 0.0,
            semantic_score: 0.0,
            lexical_norm: 0.0,
            semantic_norm: 0.0,
            final_score: 0.0,
        }
    }

    /// Invariant from spec.md §3: at least one raw score is positive.
    #[must_use]
    pub fn has_positive_signal(&self) -> bool {
        self.lexical_score > 0.0 || self.semantic_score > 0.0
    }
}
