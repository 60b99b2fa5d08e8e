pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::knowledge::handlers as knowledge;
use crate::proposal::handlers as proposal;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Intake
        .route("/api/v1/tenders", post(analysis::handle_upload_tender))
        .route("/api/v1/analyze", post(analysis::handle_analyze))
        // Bid assembly
        .route("/api/v1/proposals", post(proposal::handle_generate_proposal))
        .route("/api/v1/sections", post(proposal::handle_draft_section))
        .route(
            "/api/v1/knowledge-domains",
            get(knowledge::handle_list_domains),
        )
        .with_state(state)
}
