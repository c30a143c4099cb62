pub mod audit;
pub mod authority;
pub mod response;
pub mod retrieval;

pub use audit::{AuditAction, AuditEvent};
pub use authority::{AccessDecision, AccessRule, AuthorityContext, AuthorityLevel, Document};
pub use response::{Authority, Explanation, Response, ResultItem, Scores};
pub use retrieval::{MergedCandidate, ScoredChunk};
