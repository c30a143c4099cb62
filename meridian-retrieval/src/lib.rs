//! ABOUTME: Backend adapter traits, score fusion and the hybrid search
//! ABOUTME: orchestrator (spec.md §4.3, §4.5).

pub mod backends;
pub mod explain;
pub mod orchestrator;
pub mod scoring;

pub use backends::{EmbeddingFunction, LexicalBackend, VectorBackend};
pub use orchestrator::HybridSearchOrchestrator;
