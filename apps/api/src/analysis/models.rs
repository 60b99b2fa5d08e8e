use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::knowledge::DomainId;
use crate::parser::{Question, ScoringCriterion, WordLimitSummary};

/// Caller-supplied project facts. Only read, never modified by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectMetadata {
    pub project_type: String,
    pub client_type: String,
    pub location: String,
    pub value: Option<f64>,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredQuestion {
    #[serde(flatten)]
    pub question: Question,
    pub score_weight: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    pub flags: BTreeMap<String, bool>,
    pub coverage_score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialValueScore {
    pub score: u32,
    pub checks: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderAnalysis {
    pub metadata: ProjectMetadata,
    /// Registry order, no duplicates.
    pub applicable_domains: Vec<DomainId>,
    pub questions: Vec<Question>,
    pub scoring_criteria: Vec<ScoringCriterion>,
    pub scored_questions: Vec<ScoredQuestion>,
    pub domain_coverage: Coverage,
    pub social_value: SocialValueScore,
    pub compliance_readiness_score: u32,
    pub recommendations: Vec<String>,
    pub win_themes: Vec<String>,
    pub word_limits: Option<WordLimitSummary>,
    pub document_word_count: usize,
}

impl TenderAnalysis {
    pub fn scored_question(&self, id: &str) -> Option<&ScoredQuestion> {
        self.scored_questions.iter().find(|q| q.question.id == id)
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}
