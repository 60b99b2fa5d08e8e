//! Persisted snapshots. Each record is stored as one JSON document; partial
//! updates are separate structs so a write only carries the fields it changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{ProjectMetadata, TenderAnalysis};
use crate::compliance::ComplianceReport;
use crate::parser::ParsedDocument;
use crate::pipeline::PipelineStage;
use crate::proposal::Proposal;
use crate::storage::StorageError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderRecord {
    pub tender_id: String,
    pub filename: String,
    pub content_type: String,
    pub s3_key: String,
    pub status: PipelineStage,
    pub metadata: ProjectMetadata,
    pub parsed_data: Option<ParsedDocument>,
    pub analyzed_data: Option<TenderAnalysis>,
    pub uploaded_at: DateTime<Utc>,
    pub analyzed_at: Option<DateTime<Utc>>,
}

/// Written on analysis; leaves upload fields untouched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderAnalysisUpdate<'a> {
    pub status: PipelineStage,
    pub metadata: &'a ProjectMetadata,
    pub analyzed_data: &'a TenderAnalysis,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRecord {
    pub bid_id: String,
    pub tender_id: String,
    pub proposal: Proposal,
    pub compliance: ComplianceReport,
    pub status: PipelineStage,
    pub created_at: DateTime<Utc>,
}

pub fn to_document<T: Serialize>(record: &T) -> Result<Value, StorageError> {
    Ok(serde_json::to_value(record)?)
}

pub fn from_document<T: for<'de> Deserialize<'de>>(document: Value) -> Result<T, StorageError> {
    Ok(serde_json::from_value(document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::DomainRegistry;
    use crate::parser::{self, DocumentFormat};
    use crate::storage::{DocumentStore, MemoryDocumentStore, TENDERS};

    #[tokio::test]
    async fn test_analysis_update_keeps_upload_fields() {
        let text = "Q1: Outline your programme? (300 words)";
        let document = parser::structure_text(text.to_string(), DocumentFormat::Text, text.len());
        let record = TenderRecord {
            tender_id: "t1".to_string(),
            filename: "itt.txt".to_string(),
            content_type: "text/plain".to_string(),
            s3_key: "tenders/t1/itt.txt".to_string(),
            status: PipelineStage::Parsed,
            metadata: ProjectMetadata::default(),
            parsed_data: Some(document.clone()),
            analyzed_data: None,
            uploaded_at: Utc::now(),
            analyzed_at: None,
        };

        let store = MemoryDocumentStore::new();
        store.put(TENDERS, "t1", to_document(&record).unwrap()).await.unwrap();

        let metadata = ProjectMetadata {
            location: "London".to_string(),
            ..Default::default()
        };
        let analysis = crate::analysis::analyze(&document, &metadata, &DomainRegistry::standard());
        let update = TenderAnalysisUpdate {
            status: PipelineStage::Analyzed,
            metadata: &metadata,
            analyzed_data: &analysis,
            analyzed_at: Utc::now(),
        };
        store.put(TENDERS, "t1", to_document(&update).unwrap()).await.unwrap();

        let stored: TenderRecord =
            from_document(store.get(TENDERS, "t1").await.unwrap().unwrap()).unwrap();
        assert_eq!(stored.status, PipelineStage::Analyzed);
        assert_eq!(stored.filename, "itt.txt");
        assert_eq!(stored.parsed_data, Some(document));
        assert_eq!(stored.analyzed_data, Some(analysis));
        assert_eq!(stored.metadata.location, "London");
    }
}
