//! The stable wire contract returned by `hybrid_search` (spec.md §6).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub lexical: f64,
    pub semantic: f64,
    pub final_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authority {
    pub decision: String,
    pub matched_rule_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub why_matched: String,
    pub why_allowed: String,
    pub why_ranked: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub document_id: String,
    pub chunk_id: String,
    pub snippet: String,
    pub scores: Scores,
    pub authority: Authority,
    pub explanation: Explanation,
}

impl ResultItem {
    /// Invariants from spec.md §8.2: no empty document_id/chunk_id, a
    /// non-empty matched_rule_ids, and a snippet within the length cap.
    #[must_use]
    pub fn is_well_formed(&self, max_snippet_len: usize) -> bool {
        !self.document_id.is_empty()
            && !self.chunk_id.is_empty()
            && self.authority.decision == "ALLOW"
            && !self.authority.matched_rule_ids.is_empty()
            && self.snippet.chars().count() <= max_snippet_len
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub query_id: String,
    pub timestamp: String,
    pub query: String,
    pub results: Vec<ResultItem>,
}

impl Response {
    /// Invariant from spec.md §8.1/§8.3: results sorted descending by
    /// final score, every result well-formed.
    #[must_use]
    pub fn is_well_formed(&self, max_snippet_len: usize) -> bool {
        if self.query_id.is_empty() {
            return false;
        }
        if !self
            .results
            .iter()
            .all(|r| r.is_well_formed(max_snippet_len))
        {
            return false;
        }
        self.results
            .windows(2)
            .all(|w| w[0].scores.final_score >= w[1].scores.final_score)
    }
}
