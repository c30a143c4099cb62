//! ABOUTME: `hybrid_search` — the full query pipeline from spec.md §4.3,
//! ABOUTME: stages A through J.

use crate::backends::{EmbeddingFunction, LexicalBackend, VectorBackend};
use crate::{explain, scoring};
use chrono::Utc;
use meridian_audit::AuditLogger;
use meridian_authority::AuthorityEngine;
use meridian_core::error::{BackendError, CoreError};
use meridian_core::types::{
    AccessDecision, Authority as AuthorityWire, AuthorityContext, MergedCandidate, Response,
    ResultItem, Scores, ScoredChunk,
};
use meridian_core::CoreConfig;
use meridian_metadata::MetadataGateway;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Owns the collaborators for one query pipeline. Client pools (`lexical`,
/// `vector`, `embedder`, `metadata`) are shared `Arc`s reused across calls;
/// each call to `hybrid_search` constructs its own `AuthorityEngine`, so the
/// decision cache never leaks across queries (spec.md §5).
pub struct HybridSearchOrchestrator {
    lexical: Arc<dyn LexicalBackend>,
    vector: Arc<dyn VectorBackend>,
    embedder: Arc<dyn EmbeddingFunction>,
    metadata: Arc<dyn MetadataGateway>,
    audit: Arc<AuditLogger>,
    config: CoreConfig,
}

impl HybridSearchOrchestrator {
    #[must_use]
    pub fn new(
        lexical: Arc<dyn LexicalBackend>,
        vector: Arc<dyn VectorBackend>,
        embedder: Arc<dyn EmbeddingFunction>,
        metadata: Arc<dyn MetadataGateway>,
        audit: Arc<AuditLogger>,
        config: CoreConfig,
    ) -> Self {
        Self {
            lexical,
            vector,
            embedder,
            metadata,
            audit,
            config,
        }
    }

    pub async fn hybrid_search(
        &self,
        query: &str,
        context: &AuthorityContext,
        top_k: Option<usize>,
        query_id: Option<String>,
    ) -> Result<Response, CoreError> {
        let query_id = query_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let timestamp = Utc::now().to_rfc3339();
        let top_k = top_k.unwrap_or(self.config.default_top_k);
        info!(query_id = %query_id, top_k, "hybrid_search started");

        // Stage A.
        self.audit.query_received(context, &query_id, query).await?;
        self.audit.search_query(context, &query_id, query).await?;

        // Stage B.
        let (lexical_hits, semantic_hits) = self.retrieve(query, top_k).await?;
        debug!(
            query_id = %query_id,
            lexical_count = lexical_hits.len(),
            semantic_count = semantic_hits.len(),
            "backend retrieval complete"
        );
        self.audit
            .search_executed(context, &query_id, lexical_hits.len(), semantic_hits.len())
            .await?;

        // Stages C, D.
        let merged = scoring::merge(lexical_hits, semantic_hits);
        let candidates: Vec<MergedCandidate> = merged.into_values().collect();
        let input_count = candidates.len();

        // Stage E.
        let authority = AuthorityEngine::new(self.metadata.clone(), self.audit.clone());
        let mut survivors: Vec<MergedCandidate> = Vec::with_capacity(candidates.len());
        let mut decisions: HashMap<String, AccessDecision> = HashMap::with_capacity(candidates.len());
        let mut allowed_count = 0_usize;
        let mut denied_count = 0_usize;

        for mut candidate in candidates {
            if candidate.document_id.is_none() {
                self.hydrate(&mut candidate).await?;
            }
            let Some(document_id) = candidate.document_id.clone() else {
                return Err(CoreError::contract(format!(
                    "chunk {} has no resolvable document_id",
                    candidate.chunk_id
                )));
            };

            let decision = authority
                .evaluate_document_access(context, &document_id, &query_id)
                .await?;

            if decision.allowed {
                allowed_count += 1;
                decisions.insert(candidate.chunk_id.clone(), decision);
                survivors.push(candidate);
            } else {
                denied_count += 1;
            }
        }

        self.audit
            .authority_evaluated(context, &query_id, input_count, allowed_count, denied_count)
            .await?;
        self.audit
            .results_filtered(context, &query_id, input_count, survivors.len())
            .await?;
        debug!(
            query_id = %query_id,
            allowed = allowed_count,
            denied = denied_count,
            "authority filter complete"
        );

        // Stage F.
        for candidate in &mut survivors {
            if candidate.content.is_none() || candidate.artefact_id.is_none() {
                self.hydrate(candidate).await?;
            }
            let has_content = candidate.content.as_deref().is_some_and(|c| !c.is_empty());
            if !has_content || candidate.document_id.is_none() {
                return Err(CoreError::contract(format!(
                    "chunk {} missing content or document_id after hydration",
                    candidate.chunk_id
                )));
            }
        }

        // Stage G.
        scoring::rank(
            &mut survivors,
            self.config.rank_weights.lexical,
            self.config.rank_weights.semantic,
        );

        // Stages H, I.
        let mut results = Vec::with_capacity(survivors.len());
        for candidate in &survivors {
            let Some(decision) = decisions.get(&candidate.chunk_id) else {
                return Err(CoreError::contract(format!(
                    "chunk {} has no recorded access decision after ranking",
                    candidate.chunk_id
                )));
            };
            let explanation = explain::build(
                candidate,
                decision,
                self.config.rank_weights.lexical,
                self.config.rank_weights.semantic,
            )?;
            let snippet = truncate_snippet(
                candidate.content.as_deref().unwrap_or_default(),
                self.config.snippet_length,
            );
            results.push(ResultItem {
                document_id: candidate.document_id.clone().unwrap_or_default(),
                chunk_id: candidate.chunk_id.clone(),
                snippet,
                scores: Scores {
                    lexical: candidate.lexical_score,
                    semantic: candidate.semantic_score,
                    final_score: candidate.final_score,
                },
                authority: AuthorityWire {
                    decision: "ALLOW".to_string(),
                    matched_rule_ids: decision.matched_rule_ids.clone(),
                },
                explanation,
            });
        }

        // Stage J.
        let document_ids: Vec<String> = results.iter().map(|r| r.document_id.clone()).collect();
        self.audit
            .search_results_returned(context, &query_id, &document_ids)
            .await?;
        self.audit
            .response_returned(context, &query_id, results.len())
            .await?;
        info!(query_id = %query_id, result_count = results.len(), "hybrid_search complete");

        Ok(Response {
            query_id,
            timestamp,
            query: query.to_string(),
            results,
        })
    }

    /// Stage B: lexical search and embed-then-vector-search run concurrently,
    /// joined before merge. Each leg carries its own timeout; a timeout or a
    /// backend error in either leg is fatal to the query (spec.md §5).
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<(Vec<ScoredChunk>, Vec<ScoredChunk>), CoreError> {
        let lexical_fut = async {
            tokio::time::timeout(
                self.config.backend_timeout,
                self.lexical.lexical_search(query, top_k, None),
            )
            .await
            .map_err(|_| BackendError::Timeout(self.config.backend_timeout))?
        };

        let semantic_fut = async {
            let embedding = tokio::time::timeout(self.config.backend_timeout, self.embedder.embed(query))
                .await
                .map_err(|_| BackendError::Timeout(self.config.backend_timeout))??;
            tokio::time::timeout(
                self.config.backend_timeout,
                self.vector.vector_search(&embedding, top_k, None),
            )
            .await
            .map_err(|_| BackendError::Timeout(self.config.backend_timeout))?
        };

        let (lexical_result, semantic_result): (
            Result<Vec<ScoredChunk>, BackendError>,
            Result<Vec<ScoredChunk>, BackendError>,
        ) = tokio::join!(lexical_fut, semantic_fut);

        Ok((lexical_result?, semantic_result?))
    }

    /// Stage F / stage E's forward hydration: fills whichever of
    /// `document_id`, `artefact_id`, `content` is still missing via the
    /// chunk-lineage query. A chunk absent from the catalog is left
    /// untouched; the caller turns that into a contract error.
    async fn hydrate(&self, candidate: &mut MergedCandidate) -> Result<(), CoreError> {
        if let Some(record) = self
            .metadata
            .get_chunk_with_document(&candidate.chunk_id)
            .await?
        {
            if candidate.document_id.is_none() {
                candidate.document_id = Some(record.document_id);
            }
            if candidate.artefact_id.is_none() {
                candidate.artefact_id = Some(record.artefact_id);
            }
            if candidate.content.is_none() {
                candidate.content = Some(record.content);
            }
        }
        Ok(())
    }
}

/// Stage I: first `max_len` characters of `content`, counted in `char`s so
/// multi-byte UTF-8 content never splits mid-codepoint.
fn truncate_snippet(content: &str, max_len: usize) -> String {
    content.chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_snippet_respects_char_boundaries() {
        let snippet = truncate_snippet("héllo world", 3);
        assert_eq!(snippet.chars().count(), 3);
    }
}
