//! Axum route handlers for proposal generation and single-question drafting.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::analysis::handlers::load_tender;
use crate::analysis::TenderAnalysis;
use crate::compliance::ComplianceReport;
use crate::content::ProposalSection;
use crate::errors::AppError;
use crate::models::records::{to_document, BidRecord, TenderRecord};
use crate::pipeline::PipelineStage;
use crate::proposal::models::CompanyProfile;
use crate::proposal::{AiAssistance, GenerationRequest, Proposal};
use crate::state::AppState;
use crate::storage::{BIDS, TENDERS};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    pub analysis_id: String,
    #[serde(flatten)]
    pub generation: GenerationRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub success: bool,
    pub bid_id: String,
    pub proposal: Proposal,
    pub compliance: ComplianceReport,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRequest {
    pub analysis_id: String,
    pub question_id: String,
    #[serde(default)]
    pub company: CompanyProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResponse {
    pub success: bool,
    pub section: ProposalSection,
    pub ai_assistance: AiAssistance,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/proposals
///
/// Generates the full proposal for an analyzed tender, validates it and
/// stores both as a new bid.
pub async fn handle_generate_proposal(
    State(state): State<AppState>,
    Json(request): Json<ProposalRequest>,
) -> Result<Json<ProposalResponse>, AppError> {
    let record = load_tender(&state, &request.analysis_id).await?;
    let analysis = analyzed(record, &request.analysis_id)?;

    let proposal = state.pipeline.generate(&analysis, &request.generation).await?;
    let compliance = state.pipeline.validate(&proposal, &analysis)?;

    let bid = BidRecord {
        bid_id: Uuid::new_v4().to_string(),
        tender_id: request.analysis_id.clone(),
        proposal,
        compliance,
        status: PipelineStage::Validated,
        created_at: Utc::now(),
    };
    state
        .store
        .put(BIDS, &bid.bid_id, to_document(&bid)?)
        .await?;
    state
        .store
        .put(
            TENDERS,
            &request.analysis_id,
            json!({ "status": PipelineStage::Validated }),
        )
        .await?;

    info!(
        "Bid {} generated for tender {}: {:?} ({}%)",
        bid.bid_id, bid.tender_id, bid.compliance.overall, bid.compliance.percentage
    );

    Ok(Json(ProposalResponse {
        success: true,
        bid_id: bid.bid_id,
        proposal: bid.proposal,
        compliance: bid.compliance,
    }))
}

/// POST /api/v1/sections
///
/// Drafts the answer to one tender question. The generator call is cancelled
/// if the client disconnects before it completes.
pub async fn handle_draft_section(
    State(state): State<AppState>,
    Json(request): Json<SectionRequest>,
) -> Result<Json<SectionResponse>, AppError> {
    if request.question_id.trim().is_empty() {
        return Err(AppError::Validation("questionId cannot be empty".to_string()));
    }

    let record = load_tender(&state, &request.analysis_id).await?;
    let analysis = analyzed(record, &request.analysis_id)?;

    let cancel = CancellationToken::new();
    // Dropping the handler future (client gone) cancels the token.
    let _guard = cancel.clone().drop_guard();

    let draft = state
        .pipeline
        .draft_section(&analysis, &request.question_id, &request.company, &cancel)
        .await?;

    Ok(Json(SectionResponse {
        success: true,
        section: draft.section,
        ai_assistance: draft.ai_assistance,
    }))
}

fn analyzed(record: TenderRecord, tender_id: &str) -> Result<TenderAnalysis, AppError> {
    record.analyzed_data.ok_or_else(|| {
        AppError::Validation(format!(
            "Tender {tender_id} has not been analyzed; call /api/v1/analyze first"
        ))
    })
}
