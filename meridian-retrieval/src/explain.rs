//! ABOUTME: Builds the three-sentence explanation triple for a ranked
//! ABOUTME: candidate (spec.md §4.3 stage H).

use meridian_core::error::CoreError;
use meridian_core::types::{AccessDecision, Explanation, MergedCandidate};

/// `why_matched` requires at least one positive raw score; `why_allowed`
/// requires a non-empty `matched_rule_ids`. Both are contract violations,
/// not possible in practice once stages D/E have run correctly, but
/// checked explicitly so a future regression fails loudly (spec.md §7).
pub fn build(
    candidate: &MergedCandidate,
    decision: &AccessDecision,
    lexical_weight: f64,
    semantic_weight: f64,
) -> Result<Explanation, CoreError> {
    if !candidate.has_positive_signal() {
        return Err(CoreError::contract(format!(
            "chunk {} has no positive raw score",
            candidate.chunk_id
        )));
    }
    if decision.matched_rule_ids.is_empty() {
        return Err(CoreError::contract(format!(
            "chunk {} allowed with no matched_rule_ids",
            candidate.chunk_id
        )));
    }

    let mut sources = Vec::new();
    if candidate.lexical_score > 0.0 {
        sources.push(format!("lexical (raw={:.3})", candidate.lexical_score));
    }
    if candidate.semantic_score > 0.0 {
        sources.push(format!("semantic (raw={:.3})", candidate.semantic_score));
    }
    let why_matched = format!("Matched via {}.", sources.join(" and "));

    let rule_ids = candidate_rule_ids(decision);
    let why_allowed = format!(
        "Allowed by rule(s) {} ({}).",
        rule_ids,
        decision.reasons.join(", ")
    );

    let why_ranked = format!(
        "final_score = {lexical_weight:.2} * lexical_norm({:.3}) + {semantic_weight:.2} * semantic_norm({:.3}) = {:.3}.",
        candidate.lexical_norm, candidate.semantic_norm, candidate.final_score
    );

    Ok(Explanation {
        why_matched,
        why_allowed,
        why_ranked,
    })
}

fn candidate_rule_ids(decision: &AccessDecision) -> String {
    decision
        .matched_rule_ids
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_candidate_with_no_positive_signal() {
        let candidate = MergedCandidate::new("C1");
        let decision = AccessDecision::allow("D1", 1);
        assert!(build(&candidate, &decision, 0.5, 0.5).is_err());
    }

    #[test]
    fn rejects_allow_with_no_matched_rule_ids() {
        let candidate = MergedCandidate {
            lexical_score: 1.0,
            ..MergedCandidate::new("C1")
        };
        let decision = AccessDecision {
            document_id: "D1".to_string(),
            allowed: true,
            reasons: vec!["rule_match".to_string()],
            matched_rule_ids: vec![],
        };
        assert!(build(&candidate, &decision, 0.5, 0.5).is_err());
    }

    #[test]
    fn mentions_both_backends_when_both_contribute() {
        let candidate = MergedCandidate {
            lexical_score: 2.0,
            semantic_score: 1.5,
            lexical_norm: 1.0,
            semantic_norm: 1.0,
            final_score: 1.0,
            ..MergedCandidate::new("C5")
        };
        let decision = AccessDecision::allow("D5", 1);
        let explanation = build(&candidate, &decision, 0.5, 0.5).unwrap();
        assert!(explanation.why_matched.contains("lexical"));
        assert!(explanation.why_matched.contains("semantic"));
    }
}
