use axum::{extract::State, Json};
use serde::Serialize;

use crate::knowledge::{DomainKind, KnowledgeDomain};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSummary {
    pub id: String,
    pub kind: DomainKind,
    pub name: &'static str,
    pub max_score: u32,
    pub element_count: usize,
    pub key_phrase_count: usize,
    pub coverage_flags: Vec<&'static str>,
}

impl From<&KnowledgeDomain> for DomainSummary {
    fn from(domain: &KnowledgeDomain) -> Self {
        Self {
            id: domain.id.to_string(),
            kind: domain.kind,
            name: domain.name,
            max_score: domain.max_score(),
            element_count: domain.required_elements.len(),
            key_phrase_count: domain.key_phrases.len(),
            coverage_flags: domain.coverage_flags.iter().map(|f| f.key).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DomainListResponse {
    pub success: bool,
    pub domains: Vec<DomainSummary>,
}

/// GET /api/v1/knowledge-domains
pub async fn handle_list_domains(State(state): State<AppState>) -> Json<DomainListResponse> {
    Json(DomainListResponse {
        success: true,
        domains: state.pipeline.registry().iter().map(DomainSummary::from).collect(),
    })
}
