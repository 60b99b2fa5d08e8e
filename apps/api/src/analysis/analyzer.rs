//! Tender Analyzer: `ParsedDocument` + `ProjectMetadata` → `TenderAnalysis`.
//!
//! Total over well-formed input: an empty document with empty metadata is a
//! legitimate tender with no detected signal, and still gets a readiness score.

use tracing::info;

use crate::analysis::models::{ProjectMetadata, TenderAnalysis};
use crate::analysis::signals::{domain_coverage, pair_positionally, social_value};
use crate::knowledge::{strategies, DomainRegistry};
use crate::parser::ParsedDocument;

const READINESS_BASE: u32 = 50;
const READINESS_PER_ANSWERED_QUESTION: u32 = 5;
const READINESS_QUESTION_CAP: u32 = 30;
const READINESS_COVERAGE_FACTOR: f64 = 0.2;

pub fn analyze(
    doc: &ParsedDocument,
    meta: &ProjectMetadata,
    registry: &DomainRegistry,
) -> TenderAnalysis {
    let text_lower = doc.raw_text.to_lowercase();
    let applicable = registry.applicable(meta);

    let scored_questions = pair_positionally(&doc.questions, &doc.scoring_criteria);
    let domain_coverage = domain_coverage(registry.iter(), &text_lower);
    let social_value = social_value(&text_lower);

    let answered = scored_questions
        .iter()
        .filter(|q| q.score_weight.is_some_and(|w| w > 0))
        .count() as u32;
    let compliance_readiness_score = readiness_score(answered, domain_coverage.coverage_score);

    let mut recommendations: Vec<String> = Vec::new();
    for domain in &applicable {
        for flag in domain.coverage_flags.iter().filter(|f| f.mandatory) {
            let met = domain_coverage.flags.get(flag.key).copied().unwrap_or(false);
            if let (false, Some(rec)) = (met, flag.recommendation) {
                if !recommendations.iter().any(|r| r == rec) {
                    recommendations.push(rec.to_string());
                }
            }
        }
    }
    if let Some(limits) = &doc.metadata.word_limits {
        recommendations.push(format!(
            "Enforce word limits; maximum detected limit: {} words.",
            limits.max
        ));
    }

    let win_themes =
        strategies::win_themes(applicable.iter().flat_map(|d| d.win_themes.iter().copied()));

    let applicable_domains: Vec<_> = applicable.iter().map(|d| d.id.clone()).collect();
    info!(
        "Analysis complete: domains={:?} questions={} readiness={}",
        applicable_domains.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
        doc.questions.len(),
        compliance_readiness_score
    );

    TenderAnalysis {
        metadata: meta.clone(),
        applicable_domains,
        questions: doc.questions.clone(),
        scoring_criteria: doc.scoring_criteria.clone(),
        scored_questions,
        domain_coverage,
        social_value,
        compliance_readiness_score,
        recommendations,
        win_themes,
        word_limits: doc.metadata.word_limits.clone(),
        document_word_count: doc.metadata.word_count,
    }
}

/// `50 + min(30, 5 × answered) + round(0.2 × coverage)`, clamped to 100.
pub fn readiness_score(answered_questions: u32, coverage_score: u32) -> u32 {
    let questions =
        (READINESS_PER_ANSWERED_QUESTION.saturating_mul(answered_questions)).min(READINESS_QUESTION_CAP);
    let coverage = (READINESS_COVERAGE_FACTOR * coverage_score as f64).round() as u32;
    (READINESS_BASE + questions + coverage).min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{self, DocumentFormat};

    fn doc(text: &str) -> ParsedDocument {
        parser::structure_text(text.to_string(), DocumentFormat::Text, text.len())
    }

    fn meta(project_type: &str, client_type: &str, location: &str) -> ProjectMetadata {
        ProjectMetadata {
            project_type: project_type.to_string(),
            client_type: client_type.to_string(),
            location: location.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_construction_nhs_london_activates_three_domains() {
        let registry = DomainRegistry::standard();
        let analysis = analyze(
            &doc("Refurbishment of outpatient wing.\nQ1: Describe your programme?"),
            &meta("Construction", "NHS Trust", "London"),
            &registry,
        );

        let ids: Vec<_> = analysis.applicable_domains.iter().map(|d| d.as_str()).collect();
        assert_eq!(ids, vec!["cdm2015", "nhs", "london"]);
        assert!(analysis
            .recommendations
            .contains(&"Add a Construction Logistics Plan aligned to TfL guidance.".to_string()));
    }

    #[test]
    fn test_empty_document_and_metadata() {
        let registry = DomainRegistry::standard();
        let parsed = doc("");
        let analysis = analyze(&parsed, &ProjectMetadata::default(), &registry);

        assert_eq!(parsed.sections.len(), 1);
        assert_eq!(parsed.sections[0].title, "Introduction");
        assert_eq!(parsed.sections[0].content, "");
        assert!(parsed.questions.is_empty());
        assert_eq!(analysis.compliance_readiness_score, 50);
        assert!(analysis.applicable_domains.is_empty());
        assert!(analysis.recommendations.is_empty());
        assert_eq!(analysis.win_themes.len(), 3);
    }

    #[test]
    fn test_adjacent_prompt_and_weighting_are_paired() {
        let registry = DomainRegistry::standard();
        let analysis = analyze(
            &doc("Risk Management (1000 words)\n25% Social Value"),
            &ProjectMetadata::default(),
            &registry,
        );

        assert_eq!(analysis.questions.len(), 1);
        assert_eq!(analysis.questions[0].word_limit, Some(1000));
        assert_eq!(analysis.scoring_criteria.len(), 1);
        assert_eq!(analysis.scoring_criteria[0].weighting, 25);
        assert_eq!(analysis.scored_questions.len(), 1);
        assert_eq!(analysis.scored_questions[0].score_weight, Some(25));
        assert_eq!(analysis.scored_questions[0].question.word_limit, Some(1000));
        // one answered question, "social value" flag hit: 50 + 5 + round(0.2 × 17)
        assert_eq!(analysis.compliance_readiness_score, 58);
        assert_eq!(
            analysis.recommendations,
            vec!["Enforce word limits; maximum detected limit: 1000 words.".to_string()]
        );
    }

    #[test]
    fn test_missing_flags_recommended_once_each() {
        let registry = DomainRegistry::standard();
        let analysis = analyze(&doc("Works in Camden."), &meta("", "", "London"), &registry);
        assert_eq!(
            analysis.recommendations,
            vec![
                "Add a Construction Logistics Plan aligned to TfL guidance.".to_string(),
                "Reference Section 106 obligations and local borough commitments.".to_string(),
                "Confirm NRMM and ULEZ-compliant plant and fleet.".to_string(),
            ]
        );
    }

    #[test]
    fn test_flag_recommendations_need_applicable_domain() {
        let registry = DomainRegistry::standard();
        let analysis = analyze(&doc("Works in Leeds."), &meta("", "", "Leeds"), &registry);
        assert!(analysis.recommendations.is_empty());
    }

    #[test]
    fn test_fully_covered_london_tender() {
        let registry = DomainRegistry::standard();
        let text = "Submit a construction logistics plan, Section 106 schedule, NRMM register, \
                    ULEZ fleet list, social value TOMs and net zero carbon plan.";
        let analysis = analyze(&doc(text), &meta("", "", "London"), &registry);
        assert_eq!(analysis.domain_coverage.coverage_score, 100);
        assert!(analysis.recommendations.is_empty());
        assert_eq!(analysis.compliance_readiness_score, 70);
    }

    #[test]
    fn test_readiness_score_stays_in_range() {
        for answered in [0, 1, 6, 7, 1000, u32::MAX] {
            for coverage in [0, 17, 50, 100] {
                let score = readiness_score(answered, coverage);
                assert!((50..=100).contains(&score), "{answered}/{coverage} -> {score}");
            }
        }
        assert_eq!(readiness_score(6, 100), 100);
        assert_eq!(readiness_score(100, 100), 100);
    }

    #[test]
    fn test_zero_weight_questions_are_not_answered() {
        let registry = DomainRegistry::standard();
        let analysis = analyze(&doc("Q1: Approach?\n0% quality"), &ProjectMetadata::default(), &registry);
        assert_eq!(analysis.scored_questions[0].score_weight, Some(0));
        assert_eq!(analysis.compliance_readiness_score, 50);
    }

    #[test]
    fn test_analysis_does_not_touch_document() {
        let registry = DomainRegistry::standard();
        let parsed = doc("Q1: Programme?\n40% technical");
        let before = parsed.clone();
        let _ = analyze(&parsed, &meta("Construction", "", ""), &registry);
        let _ = analyze(&parsed, &meta("Construction", "", ""), &registry);
        assert_eq!(parsed, before);
    }
}
