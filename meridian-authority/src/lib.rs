//! ABOUTME: Authority Engine (spec.md §4.2): groups catalog rows by
//! ABOUTME: document, applies the authority-level gate then OR-over-rules.

use meridian_audit::AuditLogger;
use meridian_core::error::CoreError;
use meridian_core::types::{AccessDecision, AccessRule, AuthorityContext, AuthorityLevel, Document};
use meridian_metadata::MetadataGateway;
use meridian_policy::RuleOutcome;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Evaluates document access for a single query. Constructed fresh per
/// query: the decision cache is never shared across queries (spec.md §5).
pub struct AuthorityEngine {
    gateway: Arc<dyn MetadataGateway>,
    audit: Arc<AuditLogger>,
    cache: Mutex<HashMap<String, AccessDecision>>,
}

impl AuthorityEngine {
    #[must_use]
    pub fn new(gateway: Arc<dyn MetadataGateway>, audit: Arc<AuditLogger>) -> Self {
        Self {
            gateway,
            audit,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// `evaluate_document_access(context, document_id, query_id) → AccessDecision`
    /// (spec.md §4.2). Memoized within this engine's lifetime.
    pub async fn evaluate_document_access(
        &self,
        context: &AuthorityContext,
        document_id: &str,
        query_id: &str,
    ) -> Result<AccessDecision, CoreError> {
        if let Some(cached) = self.cache.lock().get(document_id) {
            return Ok(cached.clone());
        }

        let mut documents = self
            .gateway
            .fetch_documents_with_rules(Some(std::slice::from_ref(&document_id.to_string())))
            .await?;
        let document = documents
            .iter()
            .position(|d| d.document_id == document_id)
            .map(|i| documents.swap_remove(i));

        let decision = Self::evaluate_one(document_id, document, context);
        self.audit
            .authority_decision(context, query_id, &decision)
            .await?;
        self.cache
            .lock()
            .insert(document_id.to_string(), decision.clone());
        Ok(decision)
    }

    /// `get_allowed_document_ids(context, query_id) → set<document_id>`
    /// (spec.md §4.2). Batch evaluation: one catalog fetch, O(D · R).
    pub async fn get_allowed_document_ids(
        &self,
        context: &AuthorityContext,
        query_id: &str,
    ) -> Result<HashSet<String>, CoreError> {
        let documents = self.gateway.fetch_documents_with_rules(None).await?;

        let mut allowed = HashSet::new();
        for document in documents {
            let document_id = document.document_id.clone();
            let decision = Self::evaluate_one(&document_id, Some(document), context);
            self.audit
                .authority_decision(context, query_id, &decision)
                .await?;
            self.cache
                .lock()
                .insert(document_id.clone(), decision.clone());
            if decision.allowed {
                allowed.insert(document_id);
            }
        }
        Ok(allowed)
    }

    /// Pure per-document algorithm, spec.md §4.2 steps 1–5. Split out so it
    /// never needs to await, and so `get_allowed_document_ids` can reuse it
    /// without a second catalog round-trip per document.
    fn evaluate_one(
        document_id: &str,
        document: Option<Document>,
        context: &AuthorityContext,
    ) -> AccessDecision {
        let Some(document) = document else {
            return AccessDecision::deny(document_id, vec!["document_not_found".to_string()]);
        };

        if AuthorityLevel::parse(&document.authority_level).is_none() {
            return AccessDecision::deny(document_id, vec!["unknown_authority".to_string()]);
        }

        if document.rules.is_empty() {
            return AccessDecision::deny(document_id, vec!["no_access_rules".to_string()]);
        }

        let mut rules = document.rules;
        rules.sort_by_key(AccessRule::ordering_key);

        let mut failure_reasons = Vec::with_capacity(rules.len());
        for rule in &rules {
            match meridian_policy::evaluate(rule, context) {
                RuleOutcome::Matched => {
                    debug!(document_id, rule_id = rule.reported_id(), "rule matched");
                    return AccessDecision::allow(document_id, rule.reported_id());
                }
                RuleOutcome::Mismatch(reason) => {
                    failure_reasons.push(format!("rule_{}:{reason}", rule.reported_id()));
                }
            }
        }

        let reasons = if failure_reasons.is_empty() {
            vec!["no_rule_match".to_string()]
        } else {
            failure_reasons
        };
        AccessDecision::deny(document_id, reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_audit::RecordingAuditSink;
    use meridian_metadata::InMemoryMetadataGateway;

    fn viewer_context() -> AuthorityContext {
        AuthorityContext::new("alice", "structural").with_roles(["viewer"])
    }

    fn engine_with(gateway: InMemoryMetadataGateway) -> (AuthorityEngine, Arc<RecordingAuditSink>) {
        let sink = Arc::new(RecordingAuditSink::new());
        let audit = Arc::new(AuditLogger::new(sink.clone(), "system"));
        (AuthorityEngine::new(Arc::new(gateway), audit), sink)
    }

    #[tokio::test]
    async fn no_rules_denies_with_reason() {
        let gateway = InMemoryMetadataGateway::new();
        gateway.insert_document(Document {
            document_id: "D3".to_string(),
            authority_level: "AUTHORITATIVE".to_string(),
            rules: vec![],
        });
        let (engine, _sink) = engine_with(gateway);

        let decision = engine
            .evaluate_document_access(&viewer_context(), "D3", "q-1")
            .await
            .unwrap();
        assert!(!decision.allowed);
        assert!(decision.reasons.contains(&"no_access_rules".to_string()));
        assert!(decision.matched_rule_ids.is_empty());
    }

    #[tokio::test]
    async fn unknown_authority_level_denies() {
        let gateway = InMemoryMetadataGateway::new();
        gateway.insert_document(Document {
            document_id: "D4".to_string(),
            authority_level: "NOT_A_LEVEL".to_string(),
            rules: vec![AccessRule {
                rule_id: Some(1),
                project_code: None,
                discipline: None,
                classification: None,
                commercial_sensitivity: None,
                allowed_roles: vec!["viewer".to_string()],
            }],
        });
        let (engine, _sink) = engine_with(gateway);

        let decision = engine
            .evaluate_document_access(&viewer_context(), "D4", "q-1")
            .await
            .unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.reasons, vec!["unknown_authority".to_string()]);
    }

    #[tokio::test]
    async fn or_over_rules_picks_first_match_in_rule_id_order() {
        let gateway = InMemoryMetadataGateway::new();
        gateway.insert_document(Document {
            document_id: "D2".to_string(),
            authority_level: "AUTHORITATIVE".to_string(),
            rules: vec![
                AccessRule {
                    rule_id: Some(1),
                    project_code: Some("P0".to_string()),
                    discipline: None,
                    classification: None,
                    commercial_sensitivity: None,
                    allowed_roles: vec!["admin".to_string()],
                },
                AccessRule {
                    rule_id: Some(2),
                    project_code: Some("P2".to_string()),
                    discipline: None,
                    classification: None,
                    commercial_sensitivity: None,
                    allowed_roles: vec!["viewer".to_string()],
                },
            ],
        });
        let (engine, _sink) = engine_with(gateway);

        let context = AuthorityContext::new("bob", "general")
            .with_roles(["viewer"])
            .with_project_codes(["P2"]);

        let decision = engine
            .evaluate_document_access(&context, "D2", "q-1")
            .await
            .unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.matched_rule_ids, vec![2]);
    }

    #[tokio::test]
    async fn decisions_are_memoized_within_one_engine() {
        let gateway = InMemoryMetadataGateway::new();
        gateway.insert_document(Document {
            document_id: "D1".to_string(),
            authority_level: "AUTHORITATIVE".to_string(),
            rules: vec![AccessRule {
                rule_id: Some(1),
                project_code: None,
                discipline: None,
                classification: None,
                commercial_sensitivity: None,
                allowed_roles: vec!["viewer".to_string()],
            }],
        });
        let (engine, sink) = engine_with(gateway);

        engine
            .evaluate_document_access(&viewer_context(), "D1", "q-1")
            .await
            .unwrap();
        engine
            .evaluate_document_access(&viewer_context(), "D1", "q-1")
            .await
            .unwrap();

        // Second call is served from cache: only one AUTHZ_* event recorded.
        assert_eq!(sink.events().len(), 1);
    }

    #[tokio::test]
    async fn audit_failure_aborts_evaluation() {
        use meridian_audit::FailingAuditSink;
        let gateway = InMemoryMetadataGateway::new();
        gateway.insert_document(Document {
            document_id: "D1".to_string(),
            authority_level: "AUTHORITATIVE".to_string(),
            rules: vec![],
        });
        let audit = Arc::new(AuditLogger::new(
            Arc::new(FailingAuditSink::new("disk full")),
            "system",
        ));
        let engine = AuthorityEngine::new(Arc::new(gateway), audit);

        let err = engine
            .evaluate_document_access(&viewer_context(), "D1", "q-1")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Audit { .. }));
    }
}
