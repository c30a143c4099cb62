//! The `AuditSink` boundary: an append-only table (spec.md §1). Unlike the
//! teacher's `llmspell-security::AuditLogger` (an `mpsc` channel to a
//! background task — fire and forget), every call here is awaited in-line.
//! A sink failure must abort the enclosing query (spec.md §4.4, §7).

use async_trait::async_trait;
use meridian_core::types::AuditEvent;
use parking_lot::Mutex;

/// Append-only sink for structured audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Insert one event. Fail-closed: an `Err` here is propagated by
    /// `AuditLogger` as `CoreError::Audit`, aborting the query.
    async fn record(&self, event: AuditEvent) -> Result<(), String>;
}

/// Reference sink that records every event in memory, for tests that assert
/// on ordering/content (spec.md §8.7).
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl RecordingAuditSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), String> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// Sink that always fails, for exercising fail-closed behavior (spec.md §8,
/// scenario S6).
#[derive(Debug, Default)]
pub struct FailingAuditSink {
    reason: String,
}

impl FailingAuditSink {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn record(&self, _event: AuditEvent) -> Result<(), String> {
        Err(self.reason.clone())
    }
}
