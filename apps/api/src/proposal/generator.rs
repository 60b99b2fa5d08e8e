//! Proposal Generator: assembles the four canonical sections from an analysis.
//!
//! Flow: resolve applicable domains → baseline blocks per section → domain
//! fragments in registry order → optional tailored prose from the text
//! generator → metadata.
//!
//! Template mode never fails on missing company or project data; every gap
//! becomes a bracketed placeholder the validator later counts as a warning.

use chrono::Utc;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analysis::models::{ScoredQuestion, TenderAnalysis};
use crate::content::{ContentBlock, ProposalSection, SectionBuilder, SectionId};
use crate::errors::ValidationInputError;
use crate::knowledge::{strategies, DomainRegistry, KnowledgeDomain};
use crate::llm_client::{collect_stream, strip_code_fences, GenerationOptions, TextGenerator};
use crate::proposal::models::{
    AiAssistance, CompanyProfile, GenerationRequest, Proposal, ProposalCompliance,
    ProposalMetadata, Signatory, PROPOSAL_VERSION,
};
use crate::proposal::narrative::{insert_compliance_blocks, markdown_to_blocks};
use crate::proposal::prompts::{build_proposal_prompt, build_question_prompt, PROPOSAL_SYSTEM};

pub const ADAPTER_NOT_CONFIGURED: &str = "text generation adapter is not configured";

const TAILORED_HEADING: &str = "Tailored Response";

// ────────────────────────────────────────────────────────────────────────────
// Entry points
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic template-mode proposal.
///
/// When `request.use_ai` is set the gap is still recorded as skipped, since no
/// adapter is reachable from here.
pub fn generate(
    analysis: &TenderAnalysis,
    request: &GenerationRequest,
    registry: &DomainRegistry,
) -> Result<Proposal, ValidationInputError> {
    let domains = resolve_domains(analysis, registry)?;
    let ai_assistance = if request.use_ai {
        AiAssistance::Skipped {
            reason: ADAPTER_NOT_CONFIGURED.to_string(),
        }
    } else {
        AiAssistance::NotRequested
    };
    Ok(assemble(analysis, request, &domains, None, ai_assistance))
}

/// Template proposal plus tailored prose from `generator` when the request
/// asks for it. Adapter failures degrade to template mode and are recorded in
/// `metadata.ai_assistance`, never returned as errors.
pub async fn generate_with_assistance(
    analysis: &TenderAnalysis,
    request: &GenerationRequest,
    registry: &DomainRegistry,
    generator: Option<&dyn TextGenerator>,
) -> Result<Proposal, ValidationInputError> {
    let domains = resolve_domains(analysis, registry)?;

    if !request.use_ai {
        return Ok(assemble(analysis, request, &domains, None, AiAssistance::NotRequested));
    }

    let Some(generator) = generator else {
        warn!("AI assistance requested but no text generator is configured, using templates");
        let skipped = AiAssistance::Skipped {
            reason: ADAPTER_NOT_CONFIGURED.to_string(),
        };
        return Ok(assemble(analysis, request, &domains, None, skipped));
    };

    let prompt = build_proposal_prompt(analysis, &request.company, &domains);
    match generator
        .complete(PROPOSAL_SYSTEM, &prompt, GenerationOptions::default())
        .await
    {
        Ok(text) => {
            let markdown = insert_compliance_blocks(strip_code_fences(&text), &domains);
            let tailored = markdown_to_blocks(&markdown);
            info!(
                "Tailored response drafted by {}: {} blocks",
                generator.model(),
                tailored.len()
            );
            let applied = AiAssistance::Applied {
                model: generator.model().to_string(),
            };
            Ok(assemble(analysis, request, &domains, Some(tailored), applied))
        }
        Err(e) => {
            warn!("Text generation failed, falling back to templates: {e}");
            let skipped = AiAssistance::Skipped {
                reason: e.to_string(),
            };
            Ok(assemble(analysis, request, &domains, None, skipped))
        }
    }
}

/// A single question's answer section, with how its prose was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub section: ProposalSection,
    pub ai_assistance: AiAssistance,
}

/// Drafts the response to one question of the analysis.
///
/// The generator's output is streamed and abandoned when `cancel` fires; a
/// cancelled or failed stream falls back to the template answer.
pub async fn generate_question_response(
    analysis: &TenderAnalysis,
    question_id: &str,
    company: &CompanyProfile,
    registry: &DomainRegistry,
    generator: Option<&dyn TextGenerator>,
    cancel: &CancellationToken,
) -> Result<QuestionDraft, ValidationInputError> {
    let domains = resolve_domains(analysis, registry)?;
    let question = analysis
        .scored_question(question_id)
        .cloned()
        .or_else(|| {
            analysis.question(question_id).map(|q| ScoredQuestion {
                question: q.clone(),
                score_weight: None,
            })
        })
        .ok_or_else(|| ValidationInputError::UnknownQuestion(question_id.to_string()))?;

    let mut builder = SectionBuilder::new(SectionId::TechnicalResponse);
    builder.heading(2, question.question.text.as_str());
    builder.emphasis(question_terms(&question));

    let Some(generator) = generator else {
        template_answer(&mut builder, company, &domains);
        return Ok(QuestionDraft {
            section: builder.build(),
            ai_assistance: AiAssistance::Skipped {
                reason: ADAPTER_NOT_CONFIGURED.to_string(),
            },
        });
    };

    let prompt = build_question_prompt(&question, company, &domains);
    let drafted = match generator
        .stream(PROPOSAL_SYSTEM, &prompt, GenerationOptions::default())
        .await
    {
        Ok(tokens) => {
            let mut chunks = 0usize;
            collect_stream(tokens, cancel, |_| chunks += 1)
                .await
                .inspect(|_| debug!("Question {question_id} streamed in {chunks} chunks"))
        }
        Err(e) => Err(e),
    };

    let ai_assistance = match drafted {
        Ok(text) => {
            let text = strip_code_fences(&text);
            if let Some(limit) = question.question.word_limit {
                let words = text.split_whitespace().count();
                if words > limit as usize {
                    warn!("Answer to {question_id} runs to {words} words, limit is {limit}");
                }
            }
            builder.extend(markdown_to_blocks(&insert_compliance_blocks(text, &domains)));
            AiAssistance::Applied {
                model: generator.model().to_string(),
            }
        }
        Err(e) => {
            warn!("Question {question_id} drafting failed, using template: {e}");
            template_answer(&mut builder, company, &domains);
            AiAssistance::Skipped {
                reason: e.to_string(),
            }
        }
    };

    Ok(QuestionDraft {
        section: builder.build(),
        ai_assistance,
    })
}

fn resolve_domains<'r>(
    analysis: &TenderAnalysis,
    registry: &'r DomainRegistry,
) -> Result<Vec<&'r KnowledgeDomain>, ValidationInputError> {
    registry
        .resolve(&analysis.applicable_domains)
        .map_err(|id| ValidationInputError::UnknownDomain(id.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Assembly
// ────────────────────────────────────────────────────────────────────────────

struct Names<'a> {
    company: &'a str,
    project: &'a str,
    client: &'a str,
}

fn assemble(
    analysis: &TenderAnalysis,
    request: &GenerationRequest,
    domains: &[&KnowledgeDomain],
    tailored: Option<Vec<ContentBlock>>,
    ai_assistance: AiAssistance,
) -> Proposal {
    let names = Names {
        company: request.company.name.as_deref().unwrap_or("[COMPANY NAME]"),
        project: request.project.name.as_deref().unwrap_or("[PROJECT NAME]"),
        client: request.project.client.as_deref().unwrap_or("[CLIENT NAME]"),
    };

    let mut sections = Vec::with_capacity(SectionId::CANONICAL_ORDER.len());
    for id in SectionId::CANONICAL_ORDER {
        let mut builder = SectionBuilder::new(id);
        match id {
            SectionId::ExecutiveSummary => executive_summary(&mut builder, analysis, request, &names, domains),
            SectionId::TechnicalResponse => technical_response(&mut builder, analysis, &request.company),
            SectionId::CommercialResponse => commercial_response(&mut builder, analysis),
            SectionId::SupportingInformation => supporting_information(&mut builder, &request.company),
        }

        for domain in domains {
            for fragment in domain.fragments_for(id) {
                builder.subheading(fragment.heading);
                builder.extend(fragment.blocks.iter().cloned());
            }
            if id == SectionId::TechnicalResponse && !domain.key_phrases.is_empty() {
                builder.subheading(format!("{} Key Commitments", domain.regulatory_label));
                builder.list(domain.key_phrases.iter().copied());
            }
        }

        match id {
            SectionId::TechnicalResponse => {
                if let Some(blocks) = &tailored {
                    builder.heading(2, TAILORED_HEADING);
                    builder.extend(blocks.iter().cloned());
                }
            }
            SectionId::SupportingInformation => {
                if let Some(signatory) = &request.signatory {
                    signature_block(&mut builder, signatory, names.company);
                }
            }
            _ => {}
        }

        sections.push(builder.build());
    }

    let proposal = Proposal {
        metadata: ProposalMetadata {
            project_name: names.project.to_string(),
            client_name: names.client.to_string(),
            generated_at: Utc::now(),
            version: PROPOSAL_VERSION.to_string(),
            applicable_domains: domains.iter().map(|d| d.id.clone()).collect(),
            ai_assistance,
        },
        sections,
        compliance: ProposalCompliance {
            regulatory_elements: domains
                .iter()
                .flat_map(|d| {
                    d.required_elements
                        .iter()
                        .map(move |e| format!("{}: {}", d.regulatory_label, e.description))
                })
                .collect(),
            key_phrases: domains
                .iter()
                .flat_map(|d| d.key_phrases.iter().map(|p| p.to_string()))
                .collect(),
        },
        recommendations: strategies::REVIEW_RECOMMENDATIONS
            .iter()
            .map(|r| r.to_string())
            .collect(),
    };

    info!(
        "Proposal assembled: {} sections, {} domains, ai={:?}",
        proposal.sections.len(),
        proposal.metadata.applicable_domains.len(),
        proposal.metadata.ai_assistance
    );
    proposal
}

fn executive_summary(
    builder: &mut SectionBuilder,
    analysis: &TenderAnalysis,
    request: &GenerationRequest,
    names: &Names<'_>,
    domains: &[&KnowledgeDomain],
) {
    builder.paragraph(format!(
        "{} is pleased to submit this proposal to {} for {}.",
        names.company, names.client, names.project
    ));

    builder.heading(2, "Our Understanding");
    builder.paragraph(
        request
            .project
            .description
            .as_deref()
            .unwrap_or("[UNDERSTANDING FROM TENDER ANALYSIS]"),
    );

    builder.heading(2, "Key Differentiators");
    if analysis.win_themes.is_empty() {
        builder.list(strategies::BASELINE_WIN_THEMES.iter().copied());
    } else {
        builder.list(analysis.win_themes.iter().cloned());
    }

    if !domains.is_empty() {
        let labels: Vec<&str> = domains.iter().map(|d| d.regulatory_label).collect();
        builder.heading(2, "Regulatory Compliance");
        builder.paragraph(format!(
            "Our approach is fully compliant with {}.",
            join_labels(&labels)
        ));
    }

    builder.heading(2, "Our Commitment");
    builder.paragraph(format!(
        "We are committed to delivering {} safely, on programme and to the highest quality standards.",
        names.project
    ));
}

fn technical_response(
    builder: &mut SectionBuilder,
    analysis: &TenderAnalysis,
    company: &CompanyProfile,
) {
    builder.heading(2, "Methodology and Approach");
    builder.paragraph("[DETAILED METHODOLOGY TO BE ADDED]");

    builder.heading(2, "Project Management and Organization");
    builder.paragraph(
        "A dedicated project manager will lead delivery, supported by site management, \
         commercial and design coordination teams with clear lines of reporting to the client.",
    );

    builder.heading(2, "Quality Management");
    if company.accreditations.is_empty() {
        builder.paragraph("[QUALITY MANAGEMENT SYSTEM TO BE DESCRIBED]");
    } else {
        builder.paragraph("Quality is managed under our certified management systems:");
        builder.list(company.accreditations.iter().cloned());
    }

    builder.heading(2, "Risk Management");
    builder.paragraph(
        "Risks are identified at tender stage, recorded in a live risk register with owners \
         and mitigations, and reviewed at every progress meeting.",
    );

    builder.heading(2, "Program and Phasing");
    builder.paragraph("[PROGRAMME TO BE ADDED]");

    if !analysis.scored_questions.is_empty() {
        builder.heading(2, "Scored Question Responses");
        for question in &analysis.scored_questions {
            builder.subheading(question.question.text.as_str());
            builder.emphasis(question_terms(question));
            builder.paragraph("[RESPONSE TO BE DRAFTED]");
        }
    }
}

fn commercial_response(builder: &mut SectionBuilder, analysis: &TenderAnalysis) {
    builder.heading(2, "Pricing Overview");
    builder.paragraph("[PRICING TO BE COMPLETED BASED ON TENDER REQUIREMENTS]");

    builder.heading(2, "Value for Money");
    builder.paragraph(
        "Our pricing reflects efficient delivery, competitive supply chain rates and \
         whole-life value rather than lowest initial cost.",
    );
    if let Some(value) = analysis.metadata.value {
        builder.paragraph(format!(
            "Pricing has been prepared against an estimated contract value of £{value:.0}."
        ));
    }

    builder.heading(2, "Payment Terms");
    builder.paragraph("[PAYMENT TERMS TO BE SPECIFIED]");
}

fn supporting_information(builder: &mut SectionBuilder, company: &CompanyProfile) {
    builder.heading(2, "Supporting Documents");
    builder.paragraph("The following documents are provided in support of this proposal:");
    builder.list(strategies::SUPPORTING_DOCUMENTS.iter().copied());

    builder.heading(2, "Relevant Experience");
    builder.paragraph(
        company
            .experience
            .as_deref()
            .unwrap_or("[CASE STUDIES TO BE ADDED]"),
    );

    if !company.strengths.is_empty() {
        builder.heading(2, "Company Strengths");
        builder.list(company.strengths.iter().cloned());
    }
}

fn signature_block(builder: &mut SectionBuilder, signatory: &Signatory, company: &str) {
    builder.heading(2, "Authorised Signatory");
    builder.paragraph(format!("Signed for and on behalf of {company}:"));

    let mut details = vec![
        format!("Name: {}", signatory.name),
        format!("Role: {}", signatory.role),
    ];
    if let Some(email) = &signatory.email {
        details.push(format!("Email: {email}"));
    }
    if let Some(phone) = &signatory.phone {
        details.push(format!("Phone: {phone}"));
    }
    builder.list(details);
}

fn template_answer(builder: &mut SectionBuilder, company: &CompanyProfile, domains: &[&KnowledgeDomain]) {
    builder.paragraph("[RESPONSE TO BE DRAFTED]");
    if !company.strengths.is_empty() {
        builder.paragraph("Evidence to draw on:");
        builder.list(company.strengths.iter().cloned());
    }
    let phrases: Vec<&str> = domains
        .iter()
        .flat_map(|d| d.key_phrases.iter().copied())
        .collect();
    if !phrases.is_empty() {
        builder.paragraph("Reference where relevant:");
        builder.list(phrases);
    }
}

fn question_terms(question: &ScoredQuestion) -> String {
    let limit = question
        .question
        .word_limit
        .map(|w| format!("{w} words"))
        .unwrap_or_else(|| "not stated".to_string());
    let weighting = question
        .score_weight
        .map(|w| format!("{w}%"))
        .unwrap_or_else(|| "not stated".to_string());
    format!("Word limit: {limit}. Weighting: {weighting}.")
}

/// "A", "A and B", "A, B and C".
fn join_labels(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}
