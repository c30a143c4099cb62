//! ABOUTME: Adapter contracts for the two search indexes and the embedding
//! ABOUTME: function (spec.md §4.5). No implementation lives in this crate.

use async_trait::async_trait;
use meridian_core::error::BackendError;
use meridian_core::types::ScoredChunk;

/// Full-text search over the lexical index.
#[async_trait]
pub trait LexicalBackend: Send + Sync {
    /// `allowed_docs`, when given, is a hard filter on `document_id`. A
    /// backend that cannot filter server-side may ignore it; the
    /// orchestrator's own authority filter still enforces it downstream.
    async fn lexical_search(
        &self,
        query: &str,
        top_k: usize,
        allowed_docs: Option<&[String]>,
    ) -> Result<Vec<ScoredChunk>, BackendError>;
}

/// Nearest-neighbor search over the vector index, cosine distance on
/// unit-normalized vectors.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    async fn vector_search(
        &self,
        embedding: &[f32],
        top_k: usize,
        allowed_docs: Option<&[String]>,
    ) -> Result<Vec<ScoredChunk>, BackendError>;
}

/// Converts free text to a unit-norm dense vector. Deterministic for a
/// fixed model version; the model identifier lives in `CoreConfig` and is
/// surfaced as `model_version` in audit events where relevant.
#[async_trait]
pub trait EmbeddingFunction: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError>;
}
