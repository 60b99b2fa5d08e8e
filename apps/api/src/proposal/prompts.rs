// Prompt templates for proposal prose. Placeholders in `{braces}` are
// substituted by the builders below before sending.

use crate::analysis::models::{ScoredQuestion, TenderAnalysis};
use crate::knowledge::{strategies, KnowledgeDomain};
use crate::llm_client::prompts::{bullet_list, MARKDOWN_ONLY_INSTRUCTION, NO_INVENTION_INSTRUCTION};
use crate::proposal::models::CompanyProfile;

pub const PROPOSAL_SYSTEM: &str = "You are an experienced UK public sector bid writer. \
    You write clear, evidence-led tender responses that score highly against published \
    evaluation criteria.";

pub const PROPOSAL_PROMPT_TEMPLATE: &str = r#"Draft the tailored technical narrative for a tender response.

PROJECT TYPE: {project_type}
CLIENT TYPE: {client_type}
LOCATION: {location}

SCORING CRITERIA:
{criteria}

QUESTIONS TO ANSWER (respect every word limit):
{questions}

BIDDER PROFILE:
Name: {company_name}
Strengths:
{strengths}
Accreditations:
{accreditations}
Experience: {experience}

REGULATORY KEY PHRASES TO WORK IN NATURALLY:
{key_phrases}

WRITING PRINCIPLES:
{principles}

Structure the answer with one ## heading per question, then finish with a
## SUSTAINABILITY section and a ## CONCLUSION section, in that order.

{markdown_rule}

{no_invention_rule}"#;

pub const QUESTION_PROMPT_TEMPLATE: &str = r#"Answer one tender question.

QUESTION: {question}
WORD LIMIT: {word_limit}
SCORE WEIGHTING: {weighting}

BIDDER PROFILE:
Name: {company_name}
Strengths:
{strengths}

REGULATORY KEY PHRASES TO WORK IN NATURALLY:
{key_phrases}

Write the answer body only, without repeating the question.

{markdown_rule}

{no_invention_rule}"#;

fn key_phrases(domains: &[&KnowledgeDomain]) -> String {
    let phrases: Vec<&str> = domains
        .iter()
        .flat_map(|d| d.key_phrases.iter().copied())
        .collect();
    bullet_list(phrases.as_slice(), "(none)")
}

fn limit_text(limit: Option<u32>) -> String {
    limit
        .map(|w| format!("{w} words"))
        .unwrap_or_else(|| "not stated".to_string())
}

pub fn build_proposal_prompt(
    analysis: &TenderAnalysis,
    company: &CompanyProfile,
    domains: &[&KnowledgeDomain],
) -> String {
    let criteria: Vec<String> = analysis
        .scoring_criteria
        .iter()
        .map(|c| c.criterion.clone())
        .collect();
    let questions: Vec<String> = analysis
        .questions
        .iter()
        .map(|q| format!("{} ({})", q.text, limit_text(q.word_limit)))
        .collect();

    PROPOSAL_PROMPT_TEMPLATE
        .replace("{project_type}", or_unknown(&analysis.metadata.project_type))
        .replace("{client_type}", or_unknown(&analysis.metadata.client_type))
        .replace("{location}", or_unknown(&analysis.metadata.location))
        .replace("{criteria}", &bullet_list(criteria.as_slice(), "(none published)"))
        .replace("{questions}", &bullet_list(questions.as_slice(), "(none detected)"))
        .replace("{company_name}", company.name.as_deref().unwrap_or("[COMPANY NAME]"))
        .replace("{strengths}", &bullet_list(company.strengths.as_slice(), "(none provided)"))
        .replace(
            "{accreditations}",
            &bullet_list(company.accreditations.as_slice(), "(none provided)"),
        )
        .replace("{experience}", company.experience.as_deref().unwrap_or("(not provided)"))
        .replace("{key_phrases}", &key_phrases(domains))
        .replace("{principles}", &bullet_list(strategies::WRITING_PRINCIPLES, ""))
        .replace("{markdown_rule}", MARKDOWN_ONLY_INSTRUCTION)
        .replace("{no_invention_rule}", NO_INVENTION_INSTRUCTION)
}

pub fn build_question_prompt(
    question: &ScoredQuestion,
    company: &CompanyProfile,
    domains: &[&KnowledgeDomain],
) -> String {
    QUESTION_PROMPT_TEMPLATE
        .replace("{question}", &question.question.text)
        .replace("{word_limit}", &limit_text(question.question.word_limit))
        .replace(
            "{weighting}",
            &question
                .score_weight
                .map(|w| format!("{w}%"))
                .unwrap_or_else(|| "not stated".to_string()),
        )
        .replace("{company_name}", company.name.as_deref().unwrap_or("[COMPANY NAME]"))
        .replace("{strengths}", &bullet_list(company.strengths.as_slice(), "(none provided)"))
        .replace("{key_phrases}", &key_phrases(domains))
        .replace("{markdown_rule}", MARKDOWN_ONLY_INSTRUCTION)
        .replace("{no_invention_rule}", NO_INVENTION_INSTRUCTION)
}

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        "(not specified)"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, ProjectMetadata};
    use crate::knowledge::DomainRegistry;
    use crate::parser::{self, DocumentFormat};

    #[test]
    fn test_proposal_prompt_has_no_unfilled_placeholders() {
        let registry = DomainRegistry::standard();
        let text = "Q1: Describe your programme? (500 words)\n60% quality";
        let doc = parser::structure_text(text.to_string(), DocumentFormat::Text, text.len());
        let meta = ProjectMetadata {
            project_type: "Construction".to_string(),
            ..Default::default()
        };
        let analysis = analyze(&doc, &meta, &registry);
        let domains = registry.resolve(&analysis.applicable_domains).unwrap();

        let prompt = build_proposal_prompt(&analysis, &CompanyProfile::default(), &domains);
        assert!(prompt.contains("Construction"));
        assert!(prompt.contains("(500 words)"));
        assert!(prompt.contains("- 60% quality"));
        assert!(prompt.contains("CDM 2015 compliant"));
        assert!(prompt.contains("[COMPANY NAME]"));
        for placeholder in ["{criteria}", "{questions}", "{key_phrases}", "{markdown_rule}"] {
            assert!(!prompt.contains(placeholder), "{placeholder} left in prompt");
        }
    }
}
