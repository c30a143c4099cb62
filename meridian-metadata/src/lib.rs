//! ABOUTME: Read-only Metadata Gateway (spec.md §4.6): joined catalog
//! ABOUTME: queries, modeled as typed records rather than raw join rows.

use async_trait::async_trait;
use meridian_core::error::BackendError;
use meridian_core::types::Document;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A hydrated chunk, resolved via chunks ⋈ artefacts ⋈ versions ⋈ documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord {
    pub chunk_id: String,
    pub content: String,
    pub artefact_id: String,
    pub document_id: String,
}

/// Read-only catalog access. The catalog is the authoritative source; search
/// backends are considered derived and may lag (spec.md §4.6). No writes.
#[async_trait]
pub trait MetadataGateway: Send + Sync {
    /// `documents ⋈ access_rules`, left-join semantics: rule-less documents
    /// still appear, with an empty `rules` vec. `doc_ids: None` fetches the
    /// whole catalog (used by `get_allowed_document_ids`).
    async fn fetch_documents_with_rules(
        &self,
        doc_ids: Option<&[String]>,
    ) -> Result<Vec<Document>, BackendError>;

    /// `chunks ⋈ artefacts ⋈ versions ⋈ documents`, keyed by chunk_id.
    async fn get_chunk_with_document(
        &self,
        chunk_id: &str,
    ) -> Result<Option<ChunkRecord>, BackendError>;
}

/// In-memory reference gateway used by tests and by callers who seed the
/// catalog directly (ingestion/bootstrap is out of scope for this core).
#[derive(Debug, Default)]
pub struct InMemoryMetadataGateway {
    documents: RwLock<HashMap<String, Document>>,
    chunks: RwLock<HashMap<String, ChunkRecord>>,
}

impl InMemoryMetadataGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_document(&self, document: Document) {
        self.documents
            .write()
            .insert(document.document_id.clone(), document);
    }

    pub fn insert_chunk(&self, chunk: ChunkRecord) {
        self.chunks.write().insert(chunk.chunk_id.clone(), chunk);
    }
}

#[async_trait]
impl MetadataGateway for InMemoryMetadataGateway {
    async fn fetch_documents_with_rules(
        &self,
        doc_ids: Option<&[String]>,
    ) -> Result<Vec<Document>, BackendError> {
        let documents = self.documents.read();
        let iter = documents.values().cloned();
        Ok(match doc_ids {
            Some(ids) => iter.filter(|d| ids.contains(&d.document_id)).collect(),
            None => iter.collect(),
        })
    }

    async fn get_chunk_with_document(
        &self,
        chunk_id: &str,
    ) -> Result<Option<ChunkRecord>, BackendError> {
        Ok(self.chunks.read().get(chunk_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::types::AccessRule;

    fn doc(id: &str) -> Document {
        Document {
            document_id: id.to_string(),
            authority_level: "AUTHORITATIVE".to_string(),
            rules: vec![AccessRule {
                rule_id: Some(1),
                project_code: None,
                discipline: None,
                classification: None,
                commercial_sensitivity: None,
                allowed_roles: vec!["viewer".to_string()],
            }],
        }
    }

    #[tokio::test]
    async fn fetch_filters_by_doc_ids_when_given() {
        let gateway = InMemoryMetadataGateway::new();
        gateway.insert_document(doc("D1"));
        gateway.insert_document(doc("D2"));

        let filtered = gateway
            .fetch_documents_with_rules(Some(&["D1".to_string()]))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].document_id, "D1");

        let all = gateway.fetch_documents_with_rules(None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn chunk_lookup_returns_none_when_absent() {
        let gateway = InMemoryMetadataGateway::new();
        assert!(gateway
            .get_chunk_with_document("missing")
            .await
            .unwrap()
            .is_none());
    }
}
