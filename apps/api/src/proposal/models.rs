use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{ProposalSection, SectionId};
use crate::knowledge::DomainId;

pub const PROPOSAL_VERSION: &str = "1.0";

// ────────────────────────────────────────────────────────────────────────────
// Caller input
// ────────────────────────────────────────────────────────────────────────────

/// Every field is optional; gaps render as bracketed placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub strengths: Vec<String>,
    pub accreditations: Vec<String>,
    pub experience: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInfo {
    pub name: Option<String>,
    pub client: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signatory {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationRequest {
    pub company: CompanyProfile,
    pub project: ProjectInfo,
    pub signatory: Option<Signatory>,
    pub use_ai: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// Whether prose was delegated to a text generator, and if not, why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AiAssistance {
    NotRequested,
    Skipped { reason: String },
    Applied { model: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalMetadata {
    pub project_name: String,
    pub client_name: String,
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub applicable_domains: Vec<DomainId>,
    pub ai_assistance: AiAssistance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalCompliance {
    pub regulatory_elements: Vec<String>,
    pub key_phrases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub metadata: ProposalMetadata,
    /// Canonical section order.
    pub sections: Vec<ProposalSection>,
    pub compliance: ProposalCompliance,
    pub recommendations: Vec<String>,
}

impl Proposal {
    pub fn section(&self, id: SectionId) -> Option<&ProposalSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Every block of every section, newline-joined, in original case.
    pub fn full_text(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
