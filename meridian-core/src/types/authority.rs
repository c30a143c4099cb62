//! Authority context, access rules, and access decisions.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The requester's identity and attributes at query time, captured once at
/// the request boundary and passed by value through the core. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityContext {
    pub user: String,
    pub roles: HashSet<String>,
    pub project_codes: HashSet<String>,
    pub discipline: String,
    pub classification: Option<String>,
    pub commercial_sensitivity: Option<String>,
}

impl AuthorityContext {
    #[must_use]
    pub fn new(user: impl Into<String>, discipline: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            roles: HashSet::new(),
            project_codes: HashSet::new(),
            discipline: discipline.into(),
            classification: None,
            commercial_sensitivity: None,
        }
    }

    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_project_codes(
        mut self,
        codes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.project_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    #[must_use]
    pub fn with_commercial_sensitivity(mut self, sensitivity: impl Into<String>) -> Self {
        self.commercial_sensitivity = Some(sensitivity.into());
        self
    }
}

/// The fixed authority level vocabulary. Any other value is an unknown
/// authority level and is handled by the engine as a deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorityLevel {
    Authoritative,
    Draft,
    Reference,
    External,
}

impl AuthorityLevel {
    /// Parse a catalog `authority_level` string, normalizing case. Returns
    /// `None` for any value outside the fixed vocabulary (spec.md §3).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_uppercase().as_str() {
            "AUTHORITATIVE" => Some(Self::Authoritative),
            "DRAFT" => Some(Self::Draft),
            "REFERENCE" => Some(Self::Reference),
            "EXTERNAL" => Some(Self::External),
            _ => None,
        }
    }
}

/// A single access rule attached to a document. Each non-null match
/// attribute is an equality constraint on the corresponding context field;
/// `allowed_roles` requires non-empty intersection with `context.roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    pub rule_id: Option<i64>,
    pub project_code: Option<String>,
    pub discipline: Option<String>,
    pub classification: Option<String>,
    pub commercial_sensitivity: Option<String>,
    pub allowed_roles: Vec<String>,
}

impl AccessRule {
    /// The rule_id used for ordering and for inclusion in `matched_rule_ids`.
    /// Catalog rows are expected to carry a real id; a rule-less row (no id)
    /// sorts last and reports as `-1` if it somehow matches, since spec.md's
    /// invariant requires a non-empty `matched_rule_ids` on ALLOW regardless.
    #[must_use]
    pub fn ordering_key(&self) -> i64 {
        self.rule_id.unwrap_or(i64::MAX)
    }

    #[must_use]
    pub fn reported_id(&self) -> i64 {
        self.rule_id.unwrap_or(-1)
    }
}

/// A document as seen by the authority engine: its catalog authority level
/// (kept as the raw string so unknown values can be reported rather than
/// panicking) and its ordered access rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub document_id: String,
    pub authority_level: String,
    pub rules: Vec<AccessRule>,
}

/// The engine's verdict for one (context, document) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub document_id: String,
    pub allowed: bool,
    pub reasons: Vec<String>,
    pub matched_rule_ids: Vec<i64>,
}

impl AccessDecision {
    #[must_use]
    pub fn allow(document_id: impl Into<String>, matched_rule_id: i64) -> Self {
        Self {
            document_id: document_id.into(),
            allowed: true,
            reasons: vec!["rule_match".to_string()],
            matched_rule_ids: vec![matched_rule_id],
        }
    }

    #[must_use]
    pub fn deny(document_id: impl Into<String>, reasons: Vec<String>) -> Self {
        Self {
            document_id: document_id.into(),
            allowed: false,
            reasons,
            matched_rule_ids: Vec::new(),
        }
    }

    /// Checks the invariant from spec.md §3: `allowed ⇔ matched_rule_ids non-empty`.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.allowed == !self.matched_rule_ids.is_empty()
            && (self.allowed || !self.reasons.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_level_parses_case_insensitively() {
        assert_eq!(AuthorityLevel::parse("authoritative"), Some(AuthorityLevel::Authoritative));
        assert_eq!(AuthorityLevel::parse("Draft"), Some(AuthorityLevel::Draft));
        assert_eq!(AuthorityLevel::parse("NOT_A_LEVEL"), None);
    }

    #[test]
    fn decision_invariant_holds_for_allow_and_deny() {
        let allow = AccessDecision::allow("d1", 7);
        assert!(allow.is_well_formed());

        let deny = AccessDecision::deny("d1", vec!["no_access_rules".to_string()]);
        assert!(deny.is_well_formed());
    }
}
