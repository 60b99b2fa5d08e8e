//! Compliance Validator: re-scores an assembled proposal against the
//! weighted checklist of every domain the analysis activated.
//!
//! Pure and total over well-formed inputs: no I/O, no clock, no randomness.
//! The same proposal and analysis always produce the same report.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::models::TenderAnalysis;
use crate::analysis::signals::percentage;
use crate::errors::ValidationInputError;
use crate::knowledge::{mentions_any, DomainRegistry, ElementCheck, KnowledgeDomain, RequiredElement};
use crate::proposal::models::{AiAssistance, Proposal};

const COMPLIANT_THRESHOLD: u32 = 90;
const MOSTLY_COMPLIANT_THRESHOLD: u32 = 70;
const STRENGTHEN_THRESHOLD: u32 = 80;
/// Key phrases needed for full marks on a density element.
const PHRASES_FOR_FULL_DENSITY: f64 = 3.0;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[A-Z][A-Z0-9 ,&/'-]+\]").unwrap());

// ────────────────────────────────────────────────────────────────────────────
// Report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceTier {
    Compliant,
    MostlyCompliant,
    NonCompliant,
}

impl ComplianceTier {
    /// Decided on the exact ratio; the rounded percentage is for display only.
    pub fn from_scores(score: u32, max_score: u32) -> Self {
        if reaches(score, max_score, COMPLIANT_THRESHOLD) {
            ComplianceTier::Compliant
        } else if reaches(score, max_score, MOSTLY_COMPLIANT_THRESHOLD) {
            ComplianceTier::MostlyCompliant
        } else {
            ComplianceTier::NonCompliant
        }
    }
}

/// `score / max_score >= threshold%` without rounding. An empty checklist
/// reaches nothing.
fn reaches(score: u32, max_score: u32, threshold: u32) -> bool {
    max_score > 0 && u64::from(score) * 100 >= u64::from(threshold) * u64::from(max_score)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementResult {
    pub id: String,
    pub description: String,
    pub score: f64,
    pub max_score: u32,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainReport {
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub issues: Vec<String>,
    pub elements: Vec<ElementResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub overall: ComplianceTier,
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub per_domain: BTreeMap<String, DomainReport>,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

pub fn validate(
    proposal: &Proposal,
    analysis: &TenderAnalysis,
    registry: &DomainRegistry,
) -> Result<ComplianceReport, ValidationInputError> {
    if proposal.sections.is_empty() {
        return Err(ValidationInputError::EmptyProposal);
    }
    let domains = registry
        .resolve(&analysis.applicable_domains)
        .map_err(|id| ValidationInputError::UnknownDomain(id.to_string()))?;

    let full_text = proposal.full_text();
    let text_lower = full_text.to_lowercase();

    let mut per_domain = BTreeMap::new();
    let mut issues = Vec::new();
    let mut under_strength = Vec::new();
    let (mut score, mut max_score) = (0u32, 0u32);

    for domain in &domains {
        let report = score_domain(domain, &text_lower);
        score += report.score;
        max_score += report.max_score;
        issues.extend(report.issues.iter().cloned());
        if !reaches(report.score, report.max_score, STRENGTHEN_THRESHOLD) {
            under_strength.push(domain.strengthen_recommendation.to_string());
        }
        per_domain.insert(domain.id.to_string(), report);
    }

    let percentage = percentage(score as usize, max_score as usize);
    let overall = ComplianceTier::from_scores(score, max_score);

    let mut recommendations = Vec::new();
    if overall == ComplianceTier::NonCompliant {
        recommendations.push("CRITICAL: Address all compliance issues before submission".to_string());
    }
    if !issues.is_empty() {
        recommendations.push(format!("Address {} compliance issue(s)", issues.len()));
    }
    recommendations.extend(under_strength);

    let report = ComplianceReport {
        overall,
        score,
        max_score,
        percentage,
        per_domain,
        issues,
        warnings: warnings(proposal, &full_text),
        recommendations,
    };

    tracing::info!(
        "Proposal validated: {}/{} ({}%), {:?}, {} issues",
        report.score,
        report.max_score,
        report.percentage,
        report.overall,
        report.issues.len()
    );
    Ok(report)
}

fn score_domain(domain: &KnowledgeDomain, text_lower: &str) -> DomainReport {
    let elements: Vec<ElementResult> = domain
        .required_elements
        .iter()
        .map(|element| score_element(element, domain, text_lower))
        .collect();

    let issues = elements
        .iter()
        .filter(|e| e.score == 0.0)
        .map(|e| format!("Missing or insufficient: {}", e.description))
        .collect();

    let score = elements.iter().map(|e| e.score).sum::<f64>().round() as u32;
    let max_score = domain.max_score();

    DomainReport {
        score,
        max_score,
        percentage: percentage(score as usize, max_score as usize),
        issues,
        elements,
    }
}

fn score_element(element: &RequiredElement, domain: &KnowledgeDomain, text_lower: &str) -> ElementResult {
    let weight = element.weight as f64;
    let score = match &element.check {
        ElementCheck::Keywords { any_of } => {
            if mentions_any(text_lower, any_of) {
                weight
            } else {
                0.0
            }
        }
        ElementCheck::KeyPhraseDensity => {
            let matched = domain
                .key_phrases
                .iter()
                .filter(|p| text_lower.contains(&p.to_lowercase()))
                .count() as f64;
            weight.min(matched / PHRASES_FOR_FULL_DENSITY * weight)
        }
    };

    ElementResult {
        id: element.id.to_string(),
        description: element.description.to_string(),
        score,
        max_score: element.weight,
        passed: score >= weight,
    }
}

fn warnings(proposal: &Proposal, full_text: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let placeholders = PLACEHOLDER_RE.find_iter(full_text).count();
    if placeholders > 0 {
        warnings.push(format!("{placeholders} placeholder(s) still require completion"));
    }
    if let AiAssistance::Skipped { reason } = &proposal.metadata.ai_assistance {
        warnings.push(format!("AI-assisted content was skipped: {reason}"));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::analysis::{analyze, ProjectMetadata};
    use crate::content::{SectionBuilder, SectionId};
    use crate::knowledge::{Applicability, DomainId, DomainKind};
    use crate::parser::{self, DocumentFormat};
    use crate::proposal::generate;
    use crate::proposal::models::{GenerationRequest, ProposalCompliance, ProposalMetadata};

    fn analysis(project_type: &str, client_type: &str, location: &str) -> TenderAnalysis {
        let text = "Q1: Describe your approach (500 words)\n70% quality\n30% price";
        let doc = parser::structure_text(text.to_string(), DocumentFormat::Text, text.len());
        let meta = ProjectMetadata {
            project_type: project_type.to_string(),
            client_type: client_type.to_string(),
            location: location.to_string(),
            ..Default::default()
        };
        analyze(&doc, &meta, &DomainRegistry::standard())
    }

    fn proposal_with_text(paragraphs: &[&str], domains: Vec<DomainId>) -> Proposal {
        let mut builder = SectionBuilder::new(SectionId::TechnicalResponse);
        for p in paragraphs {
            builder.paragraph(*p);
        }
        Proposal {
            metadata: ProposalMetadata {
                project_name: "Ward Block".to_string(),
                client_name: "Trust".to_string(),
                generated_at: Utc::now(),
                version: "1.0".to_string(),
                applicable_domains: domains,
                ai_assistance: AiAssistance::NotRequested,
            },
            sections: vec![builder.build()],
            compliance: ProposalCompliance::default(),
            recommendations: vec![],
        }
    }

    #[test]
    fn test_missing_everything_is_non_compliant_with_one_issue_per_element() {
        let registry = DomainRegistry::standard();
        let analysis = analysis("Construction", "", "");
        let proposal = proposal_with_text(
            &["We will deliver the scheme on programme.", "Our team is experienced."],
            analysis.applicable_domains.clone(),
        );

        let report = validate(&proposal, &analysis, &registry).unwrap();
        assert_eq!(report.overall, ComplianceTier::NonCompliant);
        assert_eq!(report.score, 0);
        assert_eq!(report.max_score, 100);
        assert_eq!(report.issues.len(), 6);
        assert!(report
            .issues
            .contains(&"Missing or insufficient: Construction phase plan".to_string()));
        assert_eq!(
            report.recommendations,
            vec![
                "CRITICAL: Address all compliance issues before submission".to_string(),
                "Address 6 compliance issue(s)".to_string(),
                "Enhance CDM 2015 compliance content".to_string(),
            ]
        );
    }

    #[test]
    fn test_key_phrase_density_is_proportional() {
        let registry = DomainRegistry::standard();
        let analysis = analysis("Construction", "", "");
        let proposal = proposal_with_text(&["We are CDM 2015 compliant."], analysis.applicable_domains.clone());

        let report = validate(&proposal, &analysis, &registry).unwrap();
        let cdm = &report.per_domain["cdm2015"];
        let density = cdm.elements.iter().find(|e| e.id == "keyPhrases").unwrap();
        assert!((density.score - 10.0 / 3.0).abs() < 1e-9);
        assert!(!density.passed);
        assert!(!cdm.issues.contains(&"Missing or insufficient: CDM 2015 key phrases".to_string()));
    }

    #[test]
    fn test_generated_template_passes_its_own_domains() {
        let registry = DomainRegistry::standard();
        let analysis = analysis("Construction", "NHS Trust", "London");
        let proposal = generate(&analysis, &GenerationRequest::default(), &registry).unwrap();

        let report = validate(&proposal, &analysis, &registry).unwrap();
        assert_eq!(report.overall, ComplianceTier::Compliant);
        assert_eq!(report.max_score, 300);
        assert_eq!(report.per_domain.len(), 3);
        assert!(report.warnings[0].ends_with("placeholder(s) still require completion"));
    }

    #[test]
    fn test_generate_then_validate_is_repeatable() {
        let registry = DomainRegistry::standard();
        let analysis = analysis("Construction", "NHS Trust", "London");

        let first = validate(
            &generate(&analysis, &GenerationRequest::default(), &registry).unwrap(),
            &analysis,
            &registry,
        )
        .unwrap();
        let second = validate(
            &generate(&analysis, &GenerationRequest::default(), &registry).unwrap(),
            &analysis,
            &registry,
        )
        .unwrap();
        assert_eq!(first.score, second.score);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_domains_scores_zero_and_non_compliant() {
        let registry = DomainRegistry::standard();
        let analysis = analysis("", "", "");
        let proposal = proposal_with_text(&["Anything."], vec![]);

        let report = validate(&proposal, &analysis, &registry).unwrap();
        assert_eq!(report.max_score, 0);
        assert_eq!(report.percentage, 0);
        assert_eq!(report.overall, ComplianceTier::NonCompliant);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_skipped_ai_and_placeholders_are_warned() {
        let registry = DomainRegistry::standard();
        let analysis = analysis("", "", "");
        let mut proposal = proposal_with_text(&["[PRICING TBC] and [COMPANY NAME]"], vec![]);
        proposal.metadata.ai_assistance = AiAssistance::Skipped {
            reason: "no key".to_string(),
        };

        let report = validate(&proposal, &analysis, &registry).unwrap();
        assert_eq!(
            report.warnings,
            vec![
                "2 placeholder(s) still require completion".to_string(),
                "AI-assisted content was skipped: no key".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_proposal_is_rejected() {
        let registry = DomainRegistry::standard();
        let analysis = analysis("", "", "");
        let mut proposal = proposal_with_text(&[], vec![]);
        proposal.sections.clear();
        assert_eq!(
            validate(&proposal, &analysis, &registry).unwrap_err(),
            ValidationInputError::EmptyProposal
        );
    }

    fn single_domain_registry(elements: Vec<RequiredElement>) -> DomainRegistry {
        DomainRegistry::new(vec![KnowledgeDomain {
            id: DomainId::new("mini"),
            kind: DomainKind::Regional,
            name: "Mini",
            regulatory_label: "Mini Rules",
            applicability: Applicability {
                location: vec!["testville"],
                ..Default::default()
            },
            required_elements: elements,
            key_phrases: vec![],
            coverage_flags: vec![],
            win_themes: vec![],
            fragments: vec![],
            narrative: None,
            strengthen_recommendation: "More mini content",
        }])
    }

    fn fencing_and_parking(fencing: u32, parking: u32) -> DomainRegistry {
        single_domain_registry(vec![
            RequiredElement {
                id: "fencing",
                description: "Site fencing",
                weight: fencing,
                check: ElementCheck::Keywords { any_of: vec!["hoarding"] },
            },
            RequiredElement {
                id: "parking",
                description: "Parking plan",
                weight: parking,
                check: ElementCheck::Keywords { any_of: vec!["parking"] },
            },
        ])
    }

    fn validate_fencing_only(registry: &DomainRegistry) -> ComplianceReport {
        let mut analysis = analysis("", "", "");
        analysis.applicable_domains = vec![DomainId::new("mini")];
        let proposal = proposal_with_text(&["Timber HOARDING throughout."], analysis.applicable_domains.clone());
        validate(&proposal, &analysis, registry).unwrap()
    }

    #[test]
    fn test_minimal_registry_weights_are_normalised() {
        let report = validate_fencing_only(&fencing_and_parking(3, 1));
        assert_eq!((report.score, report.max_score, report.percentage), (3, 4, 75));
        assert_eq!(report.overall, ComplianceTier::MostlyCompliant);
        assert_eq!(report.issues, vec!["Missing or insufficient: Parking plan".to_string()]);
        assert_eq!(report.recommendations.last().unwrap(), "More mini content");
    }

    #[test]
    fn test_tier_uses_exact_ratio_not_rounded_percentage() {
        let report = validate_fencing_only(&fencing_and_parking(179, 21));
        assert_eq!((report.score, report.max_score), (179, 200));
        assert_eq!(report.percentage, 90);
        assert_eq!(report.overall, ComplianceTier::MostlyCompliant);

        let report = validate_fencing_only(&fencing_and_parking(180, 20));
        assert_eq!(report.overall, ComplianceTier::Compliant);
    }

    #[test]
    fn test_strengthen_uses_exact_ratio() {
        let report = validate_fencing_only(&fencing_and_parking(159, 41));
        assert_eq!(report.per_domain["mini"].percentage, 80);
        assert_eq!(report.recommendations.last().unwrap(), "More mini content");

        let report = validate_fencing_only(&fencing_and_parking(160, 40));
        assert!(!report.recommendations.contains(&"More mini content".to_string()));
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ComplianceTier::from_scores(9, 10), ComplianceTier::Compliant);
        assert_eq!(ComplianceTier::from_scores(7, 10), ComplianceTier::MostlyCompliant);
        assert_eq!(ComplianceTier::from_scores(69, 100), ComplianceTier::NonCompliant);
        assert_eq!(ComplianceTier::from_scores(0, 0), ComplianceTier::NonCompliant);
    }

    #[test]
    fn test_unknown_domain_is_rejected() {
        let registry = DomainRegistry::standard();
        let mut analysis = analysis("", "", "");
        analysis.applicable_domains = vec![DomainId::new("atlantis")];
        let proposal = proposal_with_text(&["x"], vec![]);
        assert_eq!(
            validate(&proposal, &analysis, &registry).unwrap_err(),
            ValidationInputError::UnknownDomain("atlantis".to_string())
        );
    }
}
