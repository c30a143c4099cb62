//! ABOUTME: `AuditLogger` — builds well-formed `AuditEvent`s and inserts
//! ABOUTME: them synchronously through an `AuditSink`, fail-closed.

use crate::sink::AuditSink;
use chrono::Utc;
use meridian_core::error::CoreError;
use meridian_core::types::{AccessDecision, AuditAction, AuditEvent, AuthorityContext};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// Every public method requires `query_id` explicitly; an empty `query_id`
/// is itself a contract violation, checked up front (spec.md §4.4).
pub struct AuditLogger {
    sink: Arc<dyn AuditSink>,
    default_actor: String,
}

impl AuditLogger {
    #[must_use]
    pub fn new(sink: Arc<dyn AuditSink>, default_actor: impl Into<String>) -> Self {
        Self {
            sink,
            default_actor: default_actor.into(),
        }
    }

    fn actor_for(&self, context: &AuthorityContext) -> String {
        if context.user.is_empty() {
            self.default_actor.clone()
        } else {
            context.user.clone()
        }
    }

    fn context_snapshot(context: &AuthorityContext) -> Value {
        json!({
            "user": context.user,
            "roles": context.roles.iter().cloned().collect::<Vec<_>>(),
            "project_codes": context.project_codes.iter().cloned().collect::<Vec<_>>(),
            "discipline": context.discipline,
            "classification": context.classification,
            "commercial_sensitivity": context.commercial_sensitivity,
        })
    }

    async fn insert(&self, event: AuditEvent) -> Result<(), CoreError> {
        debug!(action = event.action.as_str(), actor = %event.actor, "audit event");
        self.sink
            .record(event)
            .await
            .map_err(|message| CoreError::audit(message))
    }

    fn require_query_id(query_id: &str) -> Result<(), CoreError> {
        if query_id.is_empty() {
            return Err(CoreError::audit("missing query_id"));
        }
        Ok(())
    }

    /// `QUERY_RECEIVED` — emitted once, at the top of `hybrid_search`.
    pub async fn query_received(
        &self,
        context: &AuthorityContext,
        query_id: &str,
        query: &str,
    ) -> Result<(), CoreError> {
        Self::require_query_id(query_id)?;
        let event = AuditEvent::new(
            self.actor_for(context),
            AuditAction::QueryReceived,
            json!({
                "query_id": query_id,
                "timestamp": Utc::now().to_rfc3339(),
                "query": query,
                "context": Self::context_snapshot(context),
            }),
        );
        self.insert(event).await
    }

    /// `SEARCH_QUERY` — emitted alongside `QUERY_RECEIVED` (spec.md §4.3 stage A).
    pub async fn search_query(
        &self,
        context: &AuthorityContext,
        query_id: &str,
        query: &str,
    ) -> Result<(), CoreError> {
        Self::require_query_id(query_id)?;
        let event = AuditEvent::new(
            self.actor_for(context),
            AuditAction::SearchQuery,
            json!({
                "query_id": query_id,
                "timestamp": Utc::now().to_rfc3339(),
                "query": query,
                "context": Self::context_snapshot(context),
            }),
        );
        self.insert(event).await
    }

    /// `SEARCH_EXECUTED` — emitted after both backend legs join (stage B).
    pub async fn search_executed(
        &self,
        context: &AuthorityContext,
        query_id: &str,
        lexical_count: usize,
        semantic_count: usize,
    ) -> Result<(), CoreError> {
        Self::require_query_id(query_id)?;
        let event = AuditEvent::new(
            self.actor_for(context),
            AuditAction::SearchExecuted,
            json!({
                "query_id": query_id,
                "timestamp": Utc::now().to_rfc3339(),
                "lexical_count": lexical_count,
                "semantic_count": semantic_count,
            }),
        );
        self.insert(event).await
    }

    /// `AUTHZ_ALLOW` / `AUTHZ_DENY` — one per document evaluated (stage E).
    pub async fn authority_decision(
        &self,
        context: &AuthorityContext,
        query_id: &str,
        decision: &AccessDecision,
    ) -> Result<(), CoreError> {
        Self::require_query_id(query_id)?;
        let action = if decision.allowed {
            AuditAction::AuthzAllow
        } else {
            AuditAction::AuthzDeny
        };
        let event = AuditEvent::new(
            self.actor_for(context),
            action,
            json!({
                "query_id": query_id,
                "timestamp": Utc::now().to_rfc3339(),
                "context": Self::context_snapshot(context),
                "decision": {
                    "decision": if decision.allowed { "ALLOW" } else { "DENY" },
                    "reasons": decision.reasons,
                    "matched_rule_ids": decision.matched_rule_ids,
                },
            }),
        )
        .with_document_id(decision.document_id.clone());
        self.insert(event).await
    }

    /// `AUTHORITY_EVALUATED` — summary counts after the filter pass (stage E/J).
    pub async fn authority_evaluated(
        &self,
        context: &AuthorityContext,
        query_id: &str,
        evaluated: usize,
        allowed: usize,
        denied: usize,
    ) -> Result<(), CoreError> {
        Self::require_query_id(query_id)?;
        let event = AuditEvent::new(
            self.actor_for(context),
            AuditAction::AuthorityEvaluated,
            json!({
                "query_id": query_id,
                "timestamp": Utc::now().to_rfc3339(),
                "evaluated": evaluated,
                "allowed": allowed,
                "denied": denied,
            }),
        );
        self.insert(event).await
    }

    /// `RESULTS_FILTERED` — input/returned counts after dropping denies.
    pub async fn results_filtered(
        &self,
        context: &AuthorityContext,
        query_id: &str,
        input_count: usize,
        returned_count: usize,
    ) -> Result<(), CoreError> {
        Self::require_query_id(query_id)?;
        let event = AuditEvent::new(
            self.actor_for(context),
            AuditAction::ResultsFiltered,
            json!({
                "query_id": query_id,
                "timestamp": Utc::now().to_rfc3339(),
                "input_count": input_count,
                "returned_count": returned_count,
            }),
        );
        self.insert(event).await
    }

    /// `SEARCH_RESULTS_RETURNED` — final candidate set (stage J).
    pub async fn search_results_returned(
        &self,
        context: &AuthorityContext,
        query_id: &str,
        document_ids: &[String],
    ) -> Result<(), CoreError> {
        Self::require_query_id(query_id)?;
        let event = AuditEvent::new(
            self.actor_for(context),
            AuditAction::SearchResultsReturned,
            json!({
                "query_id": query_id,
                "timestamp": Utc::now().to_rfc3339(),
                "count": document_ids.len(),
                "document_ids": document_ids,
            }),
        );
        self.insert(event).await
    }

    /// `RESPONSE_RETURNED` — the last event emitted before `hybrid_search` returns.
    pub async fn response_returned(
        &self,
        context: &AuthorityContext,
        query_id: &str,
        result_count: usize,
    ) -> Result<(), CoreError> {
        Self::require_query_id(query_id)?;
        let event = AuditEvent::new(
            self.actor_for(context),
            AuditAction::ResponseReturned,
            json!({
                "query_id": query_id,
                "timestamp": Utc::now().to_rfc3339(),
                "count": result_count,
            }),
        );
        self.insert(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{FailingAuditSink, RecordingAuditSink};

    fn context() -> AuthorityContext {
        AuthorityContext::new("alice", "structural").with_roles(["viewer"])
    }

    #[tokio::test]
    async fn missing_query_id_is_rejected() {
        let logger = AuditLogger::new(Arc::new(RecordingAuditSink::new()), "system");
        let err = logger.query_received(&context(), "", "q").await.unwrap_err();
        assert!(matches!(err, CoreError::Audit { .. }));
    }

    #[tokio::test]
    async fn events_carry_query_id_and_timestamp() {
        let sink = Arc::new(RecordingAuditSink::new());
        let logger = AuditLogger::new(sink.clone(), "system");
        logger
            .query_received(&context(), "q-1", "hello")
            .await
            .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].has_required_details());
        assert_eq!(events[0].query_id(), Some("q-1"));
    }

    #[tokio::test]
    async fn sink_failure_surfaces_as_audit_error() {
        let logger = AuditLogger::new(Arc::new(FailingAuditSink::new("disk full")), "system");
        let err = logger
            .query_received(&context(), "q-1", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Audit { message } if message == "disk full"));
    }
}
