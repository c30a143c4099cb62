//! ABOUTME: Fail-closed, causally-ordered audit logging (spec.md §4.4)
//! ABOUTME: built on the `AuditSink` boundary to the append-only store.

pub mod logger;
pub mod sink;

pub use logger::AuditLogger;
pub use sink::{AuditSink, FailingAuditSink, RecordingAuditSink};
