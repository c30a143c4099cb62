//! Audit event shape. The sink itself lives in `meridian-audit`; this crate
//! only defines the wire/storage shape so every crate can build one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed audit action vocabulary (spec.md §3 `AuditEvent`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    QueryReceived,
    SearchQuery,
    SearchExecuted,
    AuthzAllow,
    AuthzDeny,
    AuthorityEvaluated,
    ResultsFiltered,
    SearchResultsReturned,
    ResponseReturned,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QueryReceived => "QUERY_RECEIVED",
            Self::SearchQuery => "SEARCH_QUERY",
            Self::SearchExecuted => "SEARCH_EXECUTED",
            Self::AuthzAllow => "AUTHZ_ALLOW",
            Self::AuthzDeny => "AUTHZ_DENY",
            Self::AuthorityEvaluated => "AUTHORITY_EVALUATED",
            Self::ResultsFiltered => "RESULTS_FILTERED",
            Self::SearchResultsReturned => "SEARCH_RESULTS_RETURNED",
            Self::ResponseReturned => "RESPONSE_RETURNED",
        }
    }
}

/// An append-only audit event. `details` MUST contain `query_id` and
/// `timestamp` (enforced by `AuditEvent::new` and checked again by the sink).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub actor: String,
    pub action: AuditAction,
    pub document_id: Option<String>,
    pub version_id: Option<String>,
    pub model_version: Option<String>,
    pub index_version: Option<String>,
    pub details: Value,
}

impl AuditEvent {
    /// `details` must already be a JSON object carrying `query_id` and
    /// `timestamp`; callers build it via `serde_json::json!`.
    #[must_use]
    pub fn new(actor: impl Into<String>, action: AuditAction, details: Value) -> Self {
        Self {
            actor: actor.into(),
            action,
            document_id: None,
            version_id: None,
            model_version: None,
            index_version: None,
            details,
        }
    }

    #[must_use]
    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    #[must_use]
    pub fn with_model_version(mut self, model_version: impl Into<String>) -> Self {
        self.model_version = Some(model_version.into());
        self
    }

    #[must_use]
    pub fn with_index_version(mut self, index_version: impl Into<String>) -> Self {
        self.index_version = Some(index_version.into());
        self
    }

    /// `query_id` as read back from `details`, if present and a string.
    #[must_use]
    pub fn query_id(&self) -> Option<&str> {
        self.details.get("query_id").and_then(Value::as_str)
    }

    /// True iff `details` is an object carrying non-empty `query_id` and a
    /// `timestamp` field, per spec.md §3.
    #[must_use]
    pub fn has_required_details(&self) -> bool {
        self.details.is_object()
            && self
                .details
                .get("query_id")
                .and_then(Value::as_str)
                .is_some_and(|q| !q.is_empty())
            && self.details.get("timestamp").is_some()
    }
}
