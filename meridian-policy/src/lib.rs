//! ABOUTME: Pure predicate deciding whether a single `AccessRule` matches
//! ABOUTME: an `AuthorityContext` (spec.md §4.1). No I/O, no state.

use meridian_core::types::{AccessRule, AuthorityContext};

/// Outcome of matching one rule against one context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Matched,
    Mismatch(MismatchReason),
}

impl RuleOutcome {
    #[must_use]
    pub fn matched(&self) -> bool {
        matches!(self, Self::Matched)
    }
}

/// First-failure mismatch reason codes, in the evaluation order fixed by
/// spec.md §4.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchReason {
    ProjectMismatch,
    DisciplineMismatch,
    ClassificationMismatch,
    CommercialSensitivityMismatch,
    AllowedRolesEmpty,
    RoleMismatch,
}

impl MismatchReason {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ProjectMismatch => "project_mismatch",
            Self::DisciplineMismatch => "discipline_mismatch",
            Self::ClassificationMismatch => "classification_mismatch",
            Self::CommercialSensitivityMismatch => "commercial_sensitivity_mismatch",
            Self::AllowedRolesEmpty => "allowed_roles_empty",
            Self::RoleMismatch => "role_mismatch",
        }
    }
}

impl std::fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Evaluate whether `rule` matches `context`, in the fixed order from
/// spec.md §4.1. Missing (null) rule fields are wildcards; a present rule
/// field with a missing context counterpart is a mismatch (fail-closed) —
/// the only field this applies to here is `classification` and
/// `commercial_sensitivity`, both `Option<String>` on the context.
#[must_use]
pub fn evaluate(rule: &AccessRule, context: &AuthorityContext) -> RuleOutcome {
    if let Some(project_code) = &rule.project_code {
        if !context.project_codes.contains(project_code) {
            return RuleOutcome::Mismatch(MismatchReason::ProjectMismatch);
        }
    }

    if let Some(discipline) = &rule.discipline {
        if discipline != &context.discipline {
            return RuleOutcome::Mismatch(MismatchReason::DisciplineMismatch);
        }
    }

    if let Some(classification) = &rule.classification {
        if Some(classification) != context.classification.as_ref() {
            return RuleOutcome::Mismatch(MismatchReason::ClassificationMismatch);
        }
    }

    if let Some(sensitivity) = &rule.commercial_sensitivity {
        if Some(sensitivity) != context.commercial_sensitivity.as_ref() {
            return RuleOutcome::Mismatch(MismatchReason::CommercialSensitivityMismatch);
        }
    }

    if rule.allowed_roles.is_empty() {
        return RuleOutcome::Mismatch(MismatchReason::AllowedRolesEmpty);
    }

    if !rule.allowed_roles.iter().any(|r| context.roles.contains(r)) {
        return RuleOutcome::Mismatch(MismatchReason::RoleMismatch);
    }

    RuleOutcome::Matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> AuthorityContext {
        AuthorityContext::new("alice", "structural")
            .with_roles(["viewer"])
            .with_project_codes(["P2"])
    }

    fn wildcard_rule(roles: Vec<&str>) -> AccessRule {
        AccessRule {
            rule_id: Some(1),
            project_code: None,
            discipline: None,
            classification: None,
            commercial_sensitivity: None,
            allowed_roles: roles.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn wildcard_fields_match_anything() {
        let rule = wildcard_rule(vec!["viewer"]);
        assert_eq!(evaluate(&rule, &context()), RuleOutcome::Matched);
    }

    #[test]
    fn project_mismatch_is_first_checked() {
        let mut rule = wildcard_rule(vec!["viewer"]);
        rule.project_code = Some("P9".to_string());
        assert_eq!(
            evaluate(&rule, &context()),
            RuleOutcome::Mismatch(MismatchReason::ProjectMismatch)
        );
    }

    #[test]
    fn empty_allowed_roles_denies_by_default() {
        let rule = wildcard_rule(vec![]);
        assert_eq!(
            evaluate(&rule, &context()),
            RuleOutcome::Mismatch(MismatchReason::AllowedRolesEmpty)
        );
    }

    #[test]
    fn role_mismatch_when_no_intersection() {
        let rule = wildcard_rule(vec!["admin"]);
        assert_eq!(
            evaluate(&rule, &context()),
            RuleOutcome::Mismatch(MismatchReason::RoleMismatch)
        );
    }

    #[test]
    fn missing_context_classification_mismatches_present_rule_field() {
        let mut rule = wildcard_rule(vec!["viewer"]);
        rule.classification = Some("secret".to_string());
        assert_eq!(
            evaluate(&rule, &context()),
            RuleOutcome::Mismatch(MismatchReason::ClassificationMismatch)
        );
    }

    proptest::proptest! {
        #[test]
        fn matches_iff_every_present_field_equals_context(
            project in proptest::option::of("[A-Z][0-9]"),
            discipline in proptest::option::of("[a-z]+"),
            roles in proptest::collection::vec("[a-z]+", 0..4),
        ) {
            let ctx = AuthorityContext::new("u", "structural")
                .with_roles(["viewer", "admin"])
                .with_project_codes(["P2"]);

            let rule = AccessRule {
                rule_id: Some(1),
                project_code: project.clone(),
                discipline: discipline.clone(),
                classification: None,
                commercial_sensitivity: None,
                allowed_roles: roles.clone(),
            };

            let outcome = evaluate(&rule, &ctx);

            let expected = project.as_ref().is_none_or(|p| ctx.project_codes.contains(p))
                && discipline.as_ref().is_none_or(|d| d == &ctx.discipline)
                && !roles.is_empty()
                && roles.iter().any(|r| ctx.roles.contains(r));

            prop_assert_eq!(outcome.matched(), expected);
        }
    }
}
