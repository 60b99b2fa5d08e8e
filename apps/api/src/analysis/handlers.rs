//! Axum route handlers for tender upload and analysis.

use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::{ProjectMetadata, TenderAnalysis};
use crate::errors::AppError;
use crate::models::records::{from_document, to_document, TenderAnalysisUpdate, TenderRecord};
use crate::parser::{DocumentFormat, ParsedDocument};
use crate::pipeline::PipelineStage;
use crate::state::AppState;
use crate::storage::{objects, TENDERS};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub tender_id: String,
    pub parsed: ParsedDocument,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub analysis_id: String,
    /// Overrides the metadata captured at upload.
    pub metadata: Option<ProjectMetadata>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis_id: String,
    pub analysis: TenderAnalysis,
}

struct Upload {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tenders
///
/// Multipart: a required `file` part plus optional `project_type`,
/// `client_type`, `location`, `value` and `deadline` (YYYY-MM-DD) text parts.
/// The returned tender id doubles as the analysis id for later calls.
pub async fn handle_upload_tender(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload: Option<Upload> = None;
    let mut metadata = ProjectMetadata::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("tender").to_string();
                let declared = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file part: {e}")))?;
                upload = Some(Upload {
                    content_type: resolve_content_type(declared.as_deref(), &filename),
                    filename,
                    bytes,
                });
            }
            "project_type" | "client_type" | "location" | "value" | "deadline" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read '{name}': {e}")))?;
                apply_metadata_field(&mut metadata, &name, text.trim())?;
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("A 'file' part is required".to_string()))?;
    if upload.bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    let pipeline = state.pipeline.clone();
    let (bytes, content_type) = (upload.bytes.clone(), upload.content_type.clone());
    let parsed = tokio::task::spawn_blocking(move || pipeline.parse(&bytes, &content_type))
        .await
        .context("Parser task failed")??;

    let tender_id = Uuid::new_v4().to_string();
    let s3_key = objects::tender_object_key(&tender_id, &upload.filename);
    objects::archive_upload(
        &state.s3,
        &state.config.s3_bucket,
        &s3_key,
        upload.bytes,
        &upload.content_type,
    )
    .await?;

    let record = TenderRecord {
        tender_id: tender_id.clone(),
        filename: upload.filename,
        content_type: upload.content_type,
        s3_key,
        status: PipelineStage::Parsed,
        metadata,
        parsed_data: Some(parsed.clone()),
        analyzed_data: None,
        uploaded_at: Utc::now(),
        analyzed_at: None,
    };
    state
        .store
        .put(TENDERS, &tender_id, to_document(&record)?)
        .await?;
    info!("Tender {tender_id} uploaded and parsed");

    Ok(Json(UploadResponse {
        success: true,
        tender_id,
        parsed,
    }))
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let record = load_tender(&state, &request.analysis_id).await?;
    let document = record.parsed_data.ok_or_else(|| {
        AppError::Validation(format!("Tender {} has not been parsed", request.analysis_id))
    })?;
    let metadata = request.metadata.unwrap_or(record.metadata);

    let analysis = state.pipeline.analyze(&document, &metadata);

    let update = TenderAnalysisUpdate {
        status: PipelineStage::Analyzed,
        metadata: &metadata,
        analyzed_data: &analysis,
        analyzed_at: Utc::now(),
    };
    state
        .store
        .put(TENDERS, &request.analysis_id, to_document(&update)?)
        .await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis_id: request.analysis_id,
        analysis,
    }))
}

pub(crate) async fn load_tender(state: &AppState, tender_id: &str) -> Result<TenderRecord, AppError> {
    let document = state
        .store
        .get(TENDERS, tender_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tender {tender_id} not found")))?;
    Ok(from_document(document)?)
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Trusts the declared type unless it is missing or generic, then falls back
/// to the file extension.
fn resolve_content_type(declared: Option<&str>, filename: &str) -> String {
    if let Some(declared) = declared.filter(|d| !d.starts_with("application/octet-stream")) {
        return declared.to_string();
    }
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf".to_string(),
        "docx" => DocumentFormat::DOCX_MIME.to_string(),
        "txt" | "md" => "text/plain".to_string(),
        _ => declared.unwrap_or("application/octet-stream").to_string(),
    }
}

fn apply_metadata_field(meta: &mut ProjectMetadata, name: &str, value: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Ok(());
    }
    match name {
        "project_type" => meta.project_type = value.to_string(),
        "client_type" => meta.client_type = value.to_string(),
        "location" => meta.location = value.to_string(),
        "value" => {
            let parsed = value
                .trim_start_matches('£')
                .replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| AppError::Validation(format!("Invalid contract value '{value}'")))?;
            meta.value = Some(parsed);
        }
        "deadline" => {
            let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                AppError::Validation(format!("Invalid deadline '{value}', expected YYYY-MM-DD"))
            })?;
            meta.deadline = Some(parsed);
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_content_type_wins() {
        assert_eq!(resolve_content_type(Some("application/pdf"), "x.bin"), "application/pdf");
    }

    #[test]
    fn test_octet_stream_falls_back_to_extension() {
        assert_eq!(
            resolve_content_type(Some("application/octet-stream"), "ITT.DOCX"),
            DocumentFormat::DOCX_MIME
        );
        assert_eq!(resolve_content_type(None, "brief.txt"), "text/plain");
        assert_eq!(resolve_content_type(None, "photo.png"), "application/octet-stream");
    }

    #[test]
    fn test_metadata_fields_are_parsed() {
        let mut meta = ProjectMetadata::default();
        apply_metadata_field(&mut meta, "value", "£1,250,000").unwrap();
        apply_metadata_field(&mut meta, "deadline", "2026-03-31").unwrap();
        apply_metadata_field(&mut meta, "location", "Camden, London").unwrap();
        apply_metadata_field(&mut meta, "client_type", "").unwrap();

        assert_eq!(meta.value, Some(1_250_000.0));
        assert_eq!(meta.deadline, NaiveDate::from_ymd_opt(2026, 3, 31));
        assert_eq!(meta.location, "Camden, London");
        assert_eq!(meta.client_type, "");
    }

    #[test]
    fn test_non_finite_contract_value_is_rejected() {
        for raw in ["NaN", "inf", "-infinity", "-5000"] {
            let mut meta = ProjectMetadata::default();
            assert!(
                matches!(
                    apply_metadata_field(&mut meta, "value", raw),
                    Err(AppError::Validation(_))
                ),
                "accepted {raw}"
            );
            assert_eq!(meta.value, None);
        }
    }

    #[test]
    fn test_bad_deadline_is_rejected() {
        let mut meta = ProjectMetadata::default();
        assert!(matches!(
            apply_metadata_field(&mut meta, "deadline", "next friday"),
            Err(AppError::Validation(_))
        ));
    }
}
