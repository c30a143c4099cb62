//! ABOUTME: In-memory fakes for the four external collaborators, shared as
//! ABOUTME: dev-dependencies across the workspace (mirrors the teacher's
//! ABOUTME: dedicated testing crate).

use async_trait::async_trait;
use meridian_core::error::BackendError;
use meridian_core::types::ScoredChunk;
use meridian_retrieval::{EmbeddingFunction, LexicalBackend, VectorBackend};
use parking_lot::RwLock;

pub use meridian_audit::{FailingAuditSink, RecordingAuditSink};
pub use meridian_metadata::InMemoryMetadataGateway;

/// Fixed-response lexical backend: returns a preset list, filtered by
/// `allowed_docs` when given and truncated to `top_k`. Ignores `query`
/// text entirely — scenario tests set up the result they want directly.
#[derive(Debug, Default)]
pub struct FixedLexicalBackend {
    hits: RwLock<Vec<ScoredChunk>>,
}

impl FixedLexicalBackend {
    #[must_use]
    pub fn new(hits: Vec<ScoredChunk>) -> Self {
        Self {
            hits: RwLock::new(hits),
        }
    }
}

#[async_trait]
impl LexicalBackend for FixedLexicalBackend {
    async fn lexical_search(
        &self,
        _query: &str,
        top_k: usize,
        allowed_docs: Option<&[String]>,
    ) -> Result<Vec<ScoredChunk>, BackendError> {
        Ok(filtered(&self.hits.read(), allowed_docs, top_k))
    }
}

/// Fixed-response vector backend, the semantic counterpart of
/// [`FixedLexicalBackend`]. Ignores the embedding vector entirely.
#[derive(Debug, Default)]
pub struct FixedVectorBackend {
    hits: RwLock<Vec<ScoredChunk>>,
}

impl FixedVectorBackend {
    #[must_use]
    pub fn new(hits: Vec<ScoredChunk>) -> Self {
        Self {
            hits: RwLock::new(hits),
        }
    }
}

#[async_trait]
impl VectorBackend for FixedVectorBackend {
    async fn vector_search(
        &self,
        _embedding: &[f32],
        top_k: usize,
        allowed_docs: Option<&[String]>,
    ) -> Result<Vec<ScoredChunk>, BackendError> {
        Ok(filtered(&self.hits.read(), allowed_docs, top_k))
    }
}

fn filtered(hits: &[ScoredChunk], allowed_docs: Option<&[String]>, top_k: usize) -> Vec<ScoredChunk> {
    hits.iter()
        .filter(|hit| match (allowed_docs, &hit.document_id) {
            (Some(allowed), Some(doc_id)) => allowed.contains(doc_id),
            (Some(_), None) => false,
            (None, _) => true,
        })
        .take(top_k)
        .cloned()
        .collect()
}

/// Deterministic stand-in for a real embedding model: derives a small
/// unit-norm vector from the byte length of the input text. Good enough for
/// orchestrator tests, which only assert on the *scores* a fixed
/// [`FixedVectorBackend`] returns, not on embedding quality.
#[derive(Debug, Default)]
pub struct DeterministicEmbeddingFunction;

#[async_trait]
impl EmbeddingFunction for DeterministicEmbeddingFunction {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        #[allow(clippy::cast_precision_loss)]
        let magnitude = (text.len() as f32).max(1.0);
        Ok(vec![1.0 / magnitude, magnitude.recip()])
    }
}

/// A backend that always fails, for exercising the fatal-on-backend-error
/// path (spec.md §5, "any failure surfaces as a fatal error").
#[derive(Debug, Default)]
pub struct FailingLexicalBackend;

#[async_trait]
impl LexicalBackend for FailingLexicalBackend {
    async fn lexical_search(
        &self,
        _query: &str,
        _top_k: usize,
        _allowed_docs: Option<&[String]>,
    ) -> Result<Vec<ScoredChunk>, BackendError> {
        Err(BackendError::Lexical {
            message: "lexical index unavailable".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_lexical_backend_filters_by_allowed_docs() {
        let backend = FixedLexicalBackend::new(vec![
            ScoredChunk::lexical("C1", "D1", None, Some("a".into()), 1.0),
            ScoredChunk::lexical("C2", "D2", None, Some("b".into()), 2.0),
        ]);
        let hits = backend
            .lexical_search("q", 10, Some(&["D1".to_string()]))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk_id, "C1");
    }

    #[tokio::test]
    async fn deterministic_embedding_is_stable_for_same_text() {
        let embedder = DeterministicEmbeddingFunction;
        let a = embedder.embed("hello").await.unwrap();
        let b = embedder.embed("hello").await.unwrap();
        assert_eq!(a, b);
    }
}
